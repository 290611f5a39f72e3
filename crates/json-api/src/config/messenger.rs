//! Messenger Config

use clap::Args;

use orderly_app::messaging::MessengerSettings;

/// Queue settings plus the embedded worker toggle.
#[derive(Debug, Args)]
pub struct MessengerConfig {
    /// Run a queue worker inside the API process
    #[arg(
        long,
        env = "MESSENGER_EMBEDDED_WORKER",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub embedded_worker: bool,

    /// Queue, retry and polling settings.
    #[command(flatten)]
    pub settings: MessengerSettings,
}
