//! `cradle gc` — Garbage-collect orphaned and stopped managed containers.

use std::sync::Arc;

use clap::Args;
use cradle_common::config::ConnectionConfig;
use cradle_common::constants;
use cradle_runtime::client::RuntimeClient;
use cradle_runtime::directory::ContainerdDirectory;
use cradle_runtime::reclaim::Reclaimer;
use cradle_runtime::supervisor::ContainerdSupervisor;

/// Arguments for the `gc` command.
#[derive(Args, Debug)]
pub struct GcArgs {
    /// Containerd namespace to collect in.
    #[arg(short, long, default_value = constants::DEFAULT_NAMESPACE)]
    pub namespace: String,
}

/// Executes the `gc` command.
///
/// Deletes containers carrying the content-id label whose task is gone or
/// no longer running. Per-container failures are logged and skipped; only
/// enumeration failure aborts.
///
/// # Errors
///
/// Returns an error if connecting or container enumeration fails.
pub async fn execute(address: &str, args: GcArgs) -> anyhow::Result<()> {
    let namespace = args.namespace.clone();
    let client =
        RuntimeClient::connect(&ConnectionConfig::new(address, args.namespace)).await?;

    let reclaimer = Reclaimer::new(
        Arc::new(ContainerdDirectory::new(client.clone())),
        Arc::new(ContainerdSupervisor::new(client)),
        namespace,
    );
    let deleted = reclaimer.reclaim().await?;

    println!("deleted {deleted} container(s)");
    Ok(())
}
