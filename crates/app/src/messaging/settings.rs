//! Messenger command-line and environment settings.

use std::time::Duration;

use clap::Args;

use crate::messaging::{retry::RetryStrategy, transport::DEFAULT_QUEUE, worker::WorkerOptions};

/// Queue, retry, and polling settings shared by the API server and the CLI worker.
#[derive(Debug, Clone, Args)]
pub struct MessengerSettings {
    /// Queue name orders are published to and consumed from
    #[arg(long, env = "MESSENGER_QUEUE", default_value = DEFAULT_QUEUE)]
    pub queue: String,

    /// Retries after the first failed delivery before a message is marked failed
    #[arg(long, env = "MESSENGER_MAX_RETRIES", default_value_t = 3_u32)]
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds
    #[arg(long, env = "MESSENGER_RETRY_DELAY_MS", default_value_t = 1_000_u64)]
    pub retry_delay_ms: u64,

    /// Factor applied to the delay after each retry
    #[arg(long, env = "MESSENGER_RETRY_MULTIPLIER", default_value_t = 2.0_f64)]
    pub retry_multiplier: f64,

    /// Upper bound for the retry delay, in milliseconds
    #[arg(long, env = "MESSENGER_RETRY_MAX_DELAY_MS", default_value_t = 60_000_u64)]
    pub retry_max_delay_ms: u64,

    /// Idle wait between queue polls, in milliseconds
    #[arg(long, env = "MESSENGER_POLL_INTERVAL_MS", default_value_t = 1_000_u64)]
    pub poll_interval_ms: u64,

    /// Age after which an unacknowledged delivery is handed out again, in seconds
    #[arg(
        long,
        env = "MESSENGER_REDELIVER_TIMEOUT_SECONDS",
        default_value_t = 3_600_u64
    )]
    pub redeliver_timeout_seconds: u64,
}

impl MessengerSettings {
    #[must_use]
    pub fn retry_strategy(&self) -> RetryStrategy {
        RetryStrategy {
            max_retries: self.max_retries,
            delay: Duration::from_millis(self.retry_delay_ms),
            multiplier: self.retry_multiplier,
            max_delay: Duration::from_millis(self.retry_max_delay_ms),
        }
    }

    #[must_use]
    pub fn worker_options(&self) -> WorkerOptions {
        WorkerOptions {
            queue: self.queue.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            redeliver_timeout: Duration::from_secs(self.redeliver_timeout_seconds),
            limit: None,
            time_limit: None,
        }
    }
}
