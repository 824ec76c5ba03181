//! `cradle inspect` — Show container labels and details.

use clap::Args;
use cradle_common::config::ConnectionConfig;
use cradle_common::constants;
use cradle_common::types::ContainerId;
use cradle_runtime::client::RuntimeClient;
use cradle_runtime::inspect;

use crate::output;

/// Arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Container ID to inspect.
    #[arg(short = 'c', long)]
    pub container_id: String,

    /// Containerd namespace.
    #[arg(short, long, default_value = constants::DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Print only the container's labels, one per line.
    #[arg(short = 'l', long)]
    pub labels_only: bool,
}

/// Executes the `inspect` command.
///
/// # Errors
///
/// Returns an error if connecting fails or the container record cannot be
/// read.
pub async fn execute(address: &str, args: InspectArgs) -> anyhow::Result<()> {
    let client =
        RuntimeClient::connect(&ConnectionConfig::new(address, args.namespace)).await?;
    let id = ContainerId::new(args.container_id);

    if args.labels_only {
        let labels = inspect::labels(&client, &id).await?;
        let mut keys: Vec<_> = labels.keys().collect();
        keys.sort();
        for key in keys {
            println!("{key}: {}", labels[key]);
        }
        return Ok(());
    }

    let report = inspect::report(&client, &id).await?;
    println!("{}", output::to_json_pretty(&report)?);
    Ok(())
}
