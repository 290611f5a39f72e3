use clap::{Parser, Subcommand};

mod db;
mod messenger;

#[derive(Debug, Parser)]
#[command(name = "orderly-app", about = "Orderly CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Messenger(messenger::MessengerCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Messenger(command) => messenger::run(command).await,
        }
    }
}
