//! Messenger errors.

use thiserror::Error;

use crate::domain::orders::{OrdersServiceError, records::OrderId};

#[derive(Debug, Error)]
pub enum MessengerError {
    #[error("message not found")]
    NotFound,

    #[error("failed to encode message")]
    Encode(#[source] serde_json::Error),

    #[error("transport storage error")]
    Sql(#[source] sqlx::Error),
}

impl From<sqlx::Error> for MessengerError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::Sql(other),
        }
    }
}

/// A handler could not process a delivered message.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error("orders service failed")]
    Orders(#[source] OrdersServiceError),
}
