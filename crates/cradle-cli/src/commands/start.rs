//! `cradle start` — Start a created container.

use clap::Args;
use cradle_common::config::ConnectionConfig;
use cradle_common::constants;
use cradle_common::types::ContainerId;
use cradle_runtime::client::RuntimeClient;
use cradle_runtime::provision;

/// Arguments for the `start` command.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Container ID to start.
    #[arg(short = 'c', long)]
    pub container_id: String,

    /// Containerd namespace.
    #[arg(short, long, default_value = constants::CRI_NAMESPACE)]
    pub namespace: String,
}

/// Executes the `start` command.
///
/// # Errors
///
/// Returns an error if connecting or the start RPC fails.
pub async fn execute(address: &str, args: StartArgs) -> anyhow::Result<()> {
    let client =
        RuntimeClient::connect(&ConnectionConfig::new(address, args.namespace)).await?;
    let id = ContainerId::new(args.container_id);
    provision::start(&client, &id).await?;
    println!("started {id}");
    Ok(())
}
