use clap::{Args, Subcommand};

mod consume;
mod failed;

#[derive(Debug, Args)]
pub(crate) struct MessengerCommand {
    #[command(subcommand)]
    command: MessengerSubcommand,
}

#[derive(Debug, Subcommand)]
enum MessengerSubcommand {
    /// Run a worker that processes queued messages
    Consume(consume::ConsumeArgs),

    /// Inspect and requeue messages that exhausted their retries
    Failed(failed::FailedCommand),
}

pub(crate) async fn run(command: MessengerCommand) -> Result<(), String> {
    match command.command {
        MessengerSubcommand::Consume(args) => consume::run(args).await,
        MessengerSubcommand::Failed(command) => failed::run(command).await,
    }
}
