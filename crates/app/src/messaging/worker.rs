//! Queue consumer.
//!
//! A [`Worker`] claims one message at a time, hands it to a
//! [`MessageHandler`] and settles it: acknowledged on success, released with
//! a backoff delay while the retry budget lasts, otherwise moved to the
//! failed state.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::watch;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::messaging::{
    errors::MessengerError,
    handler::MessageHandler,
    message::Message,
    records::Envelope,
    retry::RetryStrategy,
    transport::{DEFAULT_QUEUE, PgTransport},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerOptions {
    pub queue: String,
    pub poll_interval: Duration,
    pub redeliver_timeout: Duration,

    /// Stop after this many messages were settled.
    pub limit: Option<u64>,

    /// Stop once the worker has been running this long.
    pub time_limit: Option<Duration>,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            queue: DEFAULT_QUEUE.to_string(),
            poll_interval: Duration::from_secs(1),
            redeliver_timeout: Duration::from_secs(3600),
            limit: None,
            time_limit: None,
        }
    }
}

/// How a claimed message was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Handled,
    Retried { delay: Duration },
    Failed,

    /// The body could not be decoded into a [`Message`].
    Rejected,
}

impl Outcome {
    /// Lowercase name used in logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Handled => "handled",
            Self::Retried { .. } => "retried",
            Self::Failed => "failed",
            Self::Rejected => "rejected",
        }
    }
}

/// Called with the queue name and outcome of every settled message.
pub type OutcomeObserver = Arc<dyn Fn(&str, Outcome) + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub handled: u64,
    pub retried: u64,
    pub failed: u64,
    pub rejected: u64,
}

impl WorkerStats {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Handled => self.handled += 1,
            Outcome::Retried { .. } => self.retried += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Rejected => self.rejected += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.handled + self.retried + self.failed + self.rejected
    }
}

pub struct Worker {
    transport: PgTransport,
    handler: Arc<dyn MessageHandler>,
    retry: RetryStrategy,
    options: WorkerOptions,
    observer: Option<OutcomeObserver>,
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("retry", &self.retry)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Worker {
    #[must_use]
    pub fn new(
        transport: PgTransport,
        handler: Arc<dyn MessageHandler>,
        retry: RetryStrategy,
        options: WorkerOptions,
    ) -> Self {
        Self {
            transport,
            handler,
            retry,
            options,
            observer: None,
        }
    }

    /// Report every settled message to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: OutcomeObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Consume messages until `shutdown` flips to `true`, its sender is
    /// dropped, or one of the configured limits is reached.
    ///
    /// Transport errors are logged and followed by one poll interval of
    /// back-off; they never stop the loop.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> WorkerStats {
        let started = Instant::now();
        let mut stats = WorkerStats::default();

        info!(queue = %self.options.queue, "messenger worker started");

        loop {
            let stopping = *shutdown.borrow();

            if stopping {
                break;
            }

            if self.options.limit.is_some_and(|limit| stats.total() >= limit) {
                info!(limit = ?self.options.limit, "message limit reached");
                break;
            }

            if self
                .options
                .time_limit
                .is_some_and(|limit| started.elapsed() >= limit)
            {
                info!(time_limit = ?self.options.time_limit, "time limit reached");
                break;
            }

            match self.run_once().await {
                Ok(Some(outcome)) => {
                    stats.record(outcome);
                    continue;
                }
                Ok(None) => {}
                Err(source) => {
                    error!(error = %source, "failed to poll queue");
                }
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                () = tokio::time::sleep(self.options.poll_interval) => {}
            }
        }

        info!(
            handled = stats.handled,
            retried = stats.retried,
            failed = stats.failed,
            rejected = stats.rejected,
            "messenger worker stopped"
        );

        stats
    }

    /// Claim and settle at most one message.
    ///
    /// Returns `Ok(None)` when the queue has nothing available.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails to claim or settle.
    pub async fn run_once(&self) -> Result<Option<Outcome>, MessengerError> {
        let Some(envelope) = self
            .transport
            .claim(&self.options.queue, self.options.redeliver_timeout)
            .await?
        else {
            return Ok(None);
        };

        let span = info_span!(
            "messenger.handle",
            message_id = %envelope.id,
            attempts = envelope.attempts,
            queue = %self.options.queue,
        );

        let outcome = self.settle(envelope).instrument(span).await?;

        if let Some(observer) = &self.observer {
            observer(&self.options.queue, outcome);
        }

        Ok(Some(outcome))
    }

    async fn settle(&self, envelope: Envelope) -> Result<Outcome, MessengerError> {
        let message = match serde_json::from_value::<Message>(envelope.body) {
            Ok(message) => message,
            Err(source) => {
                warn!(error = %source, "rejecting undecodable message");

                self.transport
                    .reject(envelope.id, &format!("undecodable message: {source}"))
                    .await?;

                return Ok(Outcome::Rejected);
            }
        };

        let kind = message.kind();

        let Err(source) = self.handler.handle(message).await else {
            self.transport.ack(envelope.id).await?;

            debug!(kind, "message handled");

            return Ok(Outcome::Handled);
        };

        let reason = source.to_string();

        if self.retry.should_retry(envelope.attempts) {
            let delay = self.retry.delay_for(envelope.attempts);

            warn!(kind, error = %reason, delay_ms = delay.as_millis(), "message failed, will retry");

            self.transport.retry(envelope.id, delay, &reason).await?;

            return Ok(Outcome::Retried { delay });
        }

        error!(kind, error = %reason, "message failed, retries exhausted");

        self.transport.reject(envelope.id, &reason).await?;

        Ok(Outcome::Failed)
    }
}
