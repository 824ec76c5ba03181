//! `cradle commit` — Commit a container's filesystem to a named snapshot.

use clap::Args;
use cradle_common::config::ConnectionConfig;
use cradle_common::constants;
use cradle_common::types::ContainerId;
use cradle_runtime::client::RuntimeClient;
use cradle_runtime::commit;

/// Arguments for the `commit` command.
#[derive(Args, Debug)]
pub struct CommitArgs {
    /// Container ID to commit.
    #[arg(short = 'c', long)]
    pub container_id: String,

    /// Name the committed snapshot is stored under.
    #[arg(short = 'i', long)]
    pub image_name: String,

    /// Containerd namespace.
    #[arg(short, long, default_value = constants::DEFAULT_NAMESPACE)]
    pub namespace: String,
}

/// Executes the `commit` command.
///
/// # Errors
///
/// Returns an error if connecting or the commit fails.
pub async fn execute(address: &str, args: CommitArgs) -> anyhow::Result<()> {
    let client =
        RuntimeClient::connect(&ConnectionConfig::new(address, args.namespace)).await?;
    let id = ContainerId::new(args.container_id);
    commit::commit(&client, &id, &args.image_name).await?;
    println!("committed {} as {}", id, args.image_name);
    Ok(())
}
