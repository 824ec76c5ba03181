//! `cradle list` — List containers in a namespace.

use clap::Args;
use cradle_common::config::ConnectionConfig;
use cradle_common::constants;
use cradle_runtime::client::RuntimeClient;
use cradle_runtime::inspect;

/// Arguments for the `list` command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Containerd namespace.
    #[arg(short, long, default_value = constants::DEFAULT_NAMESPACE)]
    pub namespace: String,
}

/// Executes the `list` command.
///
/// # Errors
///
/// Returns an error if connecting or enumeration fails.
pub async fn execute(address: &str, args: ListArgs) -> anyhow::Result<()> {
    let namespace = args.namespace.clone();
    let client =
        RuntimeClient::connect(&ConnectionConfig::new(address, args.namespace)).await?;
    let containers = inspect::summaries(&client).await?;

    if containers.is_empty() {
        println!("No containers in namespace {namespace}.");
        return Ok(());
    }

    println!("{:<66} {:<40} {:<8}", "CONTAINER ID", "IMAGE", "MANAGED");
    for c in &containers {
        println!(
            "{:<66} {:<40} {:<8}",
            c.id,
            c.image,
            if c.managed { "yes" } else { "no" }
        );
    }

    Ok(())
}
