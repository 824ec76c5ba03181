//! # cradle — containerd lifecycle CLI
//!
//! Creates, starts, commits, deletes, lists, inspects, and
//! garbage-collects containers on a containerd daemon, over both the CRI
//! and the native API surface.

mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;

/// Builds the log filter from an optional `RUST_LOG`-style directive.
///
/// Recoverable per-container failures are logged at warn level, so the
/// fallback keeps warnings visible when nothing is configured.
fn log_filter(env_spec: Option<String>) -> EnvFilter {
    env_spec.map_or_else(|| EnvFilter::new("warn"), EnvFilter::new)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .init();

    let cli = Cli::parse();
    commands::execute(cli).await
}
