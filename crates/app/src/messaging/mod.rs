//! Asynchronous messaging over a `PostgreSQL`-backed queue.

pub mod bus;
pub mod errors;
pub mod handler;
pub mod message;
pub mod records;
pub mod retry;
pub mod settings;
pub mod transport;
pub mod worker;

pub use bus::{MessageBus, MockMessageBus, PgMessageBus};
pub use errors::{HandlerError, MessengerError};
pub use handler::{MessageHandler, OrderMessageHandler};
pub use message::{Message, OrderMessage};
pub use retry::RetryStrategy;
pub use settings::MessengerSettings;
pub use transport::PgTransport;
pub use worker::{Outcome, OutcomeObserver, Worker, WorkerOptions, WorkerStats};
