//! `cradle create` — Pull an image and create a started container.

use clap::{Args, ValueEnum};
use cradle_common::config::ConnectionConfig;
use cradle_common::constants;
use cradle_runtime::client::RuntimeClient;
use cradle_runtime::provision::{self, ProvisionPath};

/// Provisioning path selector.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PathArg {
    /// CRI pod sandbox plus container (kubelet-visible).
    #[default]
    Cri,
    /// Containerd native API (kubelet-invisible).
    Native,
}

impl From<PathArg> for ProvisionPath {
    fn from(path: PathArg) -> Self {
        match path {
            PathArg::Cri => Self::Cri,
            PathArg::Native => Self::Native,
        }
    }
}

/// Picks the per-path default namespace when no flag is given.
pub fn resolve_namespace(namespace: Option<String>, path: PathArg) -> String {
    namespace.unwrap_or_else(|| {
        match path {
            PathArg::Cri => constants::CRI_NAMESPACE,
            PathArg::Native => constants::DEFAULT_NAMESPACE,
        }
        .to_string()
    })
}

/// Arguments for the `create` command.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Container name.
    #[arg(short = 'c', long)]
    pub container_name: String,

    /// Image reference to create the container from.
    #[arg(short = 'i', long)]
    pub image_name: String,

    /// Containerd namespace (defaults per path: k8s.io for cri, test.io
    /// for native).
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Which daemon surface provisions the container.
    #[arg(long, value_enum, default_value_t = PathArg::Cri)]
    pub path: PathArg,
}

/// Executes the `create` command.
///
/// # Errors
///
/// Returns an error if connecting or any provisioning step fails.
pub async fn execute(address: &str, args: CreateArgs) -> anyhow::Result<()> {
    let namespace = resolve_namespace(args.namespace, args.path);
    let client = RuntimeClient::connect(&ConnectionConfig::new(address, namespace)).await?;

    let provisioner = provision::provisioner_for(args.path.into(), client);
    let id = provisioner
        .create(&args.container_name, &args.image_name)
        .await?;

    println!("{id}");
    Ok(())
}
