//! CLI command definitions and dispatch.

pub mod commit;
pub mod create;
pub mod delete;
pub mod gc;
pub mod inspect;
pub mod list;
pub mod start;

use clap::{Parser, Subcommand};

/// cradle — containerd container lifecycle management.
#[derive(Parser, Debug)]
#[command(name = cradle_common::constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the containerd socket.
    #[arg(long, global = true, default_value = cradle_common::constants::DEFAULT_ADDRESS)]
    pub address: String,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pull an image and create a started container.
    Create(create::CreateArgs),
    /// Start a created container.
    Start(start::StartArgs),
    /// Commit a container's filesystem to a named snapshot.
    Commit(commit::CommitArgs),
    /// Delete a container.
    Delete(delete::DeleteArgs),
    /// List containers in a namespace.
    List(list::ListArgs),
    /// Garbage-collect orphaned and stopped managed containers.
    Gc(gc::GcArgs),
    /// Inspect container labels and details.
    Inspect(inspect::InspectArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    tracing::debug!(address = %cli.address, "dispatching command");
    match cli.command {
        Command::Create(args) => create::execute(&cli.address, args).await,
        Command::Start(args) => start::execute(&cli.address, args).await,
        Command::Commit(args) => commit::execute(&cli.address, args).await,
        Command::Delete(args) => delete::execute(&cli.address, args).await,
        Command::List(args) => list::execute(&cli.address, args).await,
        Command::Gc(args) => gc::execute(&cli.address, args).await,
        Command::Inspect(args) => inspect::execute(&cli.address, args).await,
    }
}
