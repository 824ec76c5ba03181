//! `cradle delete` — Delete a container.

use clap::Args;
use cradle_common::config::ConnectionConfig;
use cradle_common::types::ContainerId;
use cradle_runtime::client::RuntimeClient;
use cradle_runtime::provision;

use crate::commands::create::{PathArg, resolve_namespace};

/// Arguments for the `delete` command.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Container ID to delete.
    #[arg(short = 'c', long)]
    pub container_id: String,

    /// Containerd namespace (defaults per path: k8s.io for cri, test.io
    /// for native).
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Which daemon surface removes the container; must match the one
    /// that created it.
    #[arg(long, value_enum, default_value_t = PathArg::Cri)]
    pub path: PathArg,
}

/// Executes the `delete` command.
///
/// # Errors
///
/// Returns an error if connecting or removal fails.
pub async fn execute(address: &str, args: DeleteArgs) -> anyhow::Result<()> {
    let namespace = resolve_namespace(args.namespace, args.path);
    let client = RuntimeClient::connect(&ConnectionConfig::new(address, namespace)).await?;

    let provisioner = provision::provisioner_for(args.path.into(), client);
    let id = ContainerId::new(args.container_id);
    provisioner.delete(&id).await?;

    println!("deleted {id}");
    Ok(())
}
