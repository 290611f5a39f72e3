//! `PostgreSQL` message transport.
//!
//! Messages live in `messenger_messages` until they are acknowledged or
//! moved to the failed state. A claim leases one row to one worker using
//! `FOR UPDATE SKIP LOCKED`; a lease older than the redelivery timeout is
//! claimable again, which makes delivery at-least-once.

use std::time::Duration;

use jiff_sqlx::Timestamp as SqlxTimestamp;
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as, query_scalar};

use crate::messaging::{
    errors::MessengerError,
    records::{Envelope, MessageId, QueuedMessage},
};

const SEND_MESSAGE_SQL: &str = include_str!("sql/send_message.sql");
const CLAIM_MESSAGE_SQL: &str = include_str!("sql/claim_message.sql");
const ACK_MESSAGE_SQL: &str = include_str!("sql/ack_message.sql");
const RETRY_MESSAGE_SQL: &str = include_str!("sql/retry_message.sql");
const REJECT_MESSAGE_SQL: &str = include_str!("sql/reject_message.sql");
const GET_MESSAGE_SQL: &str = include_str!("sql/get_message.sql");
const LIST_FAILED_MESSAGES_SQL: &str = include_str!("sql/list_failed_messages.sql");
const REQUEUE_FAILED_MESSAGE_SQL: &str = include_str!("sql/requeue_failed_message.sql");

/// Queue used when none is configured.
pub const DEFAULT_QUEUE: &str = "orders";

#[derive(Debug, Clone)]
pub struct PgTransport {
    pool: PgPool,
}

impl PgTransport {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enqueue a message body, immediately available.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn send(&self, queue: &str, body: &Value) -> Result<MessageId, MessengerError> {
        let id = query_scalar::<Postgres, i64>(SEND_MESSAGE_SQL)
            .bind(queue)
            .bind(body)
            .fetch_one(&self.pool)
            .await?;

        Ok(MessageId::from_i64(id))
    }

    /// Lease the oldest available message on `queue`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the claim query fails.
    pub async fn claim(
        &self,
        queue: &str,
        redeliver_timeout: Duration,
    ) -> Result<Option<Envelope>, MessengerError> {
        let row = query(CLAIM_MESSAGE_SQL)
            .bind(queue)
            .bind(redeliver_timeout.as_secs_f64())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let attempts: i32 = row.try_get("attempts")?;

        Ok(Some(Envelope {
            id: MessageId::from_i64(row.try_get("id")?),
            body: row.try_get("body")?,
            attempts: u32::try_from(attempts).unwrap_or_default(),
        }))
    }

    /// Mark a message as handled.
    ///
    /// # Errors
    ///
    /// Returns [`MessengerError::NotFound`] if the message does not exist.
    pub async fn ack(&self, id: MessageId) -> Result<(), MessengerError> {
        let result = query(ACK_MESSAGE_SQL)
            .bind(id.into_i64())
            .execute(&self.pool)
            .await?;

        ensure_affected(result.rows_affected())
    }

    /// Release a message so it becomes available again after `delay`.
    ///
    /// # Errors
    ///
    /// Returns [`MessengerError::NotFound`] if the message does not exist.
    pub async fn retry(
        &self,
        id: MessageId,
        delay: Duration,
        error: &str,
    ) -> Result<(), MessengerError> {
        let result = query(RETRY_MESSAGE_SQL)
            .bind(id.into_i64())
            .bind(delay.as_secs_f64())
            .bind(error)
            .execute(&self.pool)
            .await?;

        ensure_affected(result.rows_affected())
    }

    /// Move a message to the failed state; it will not be delivered again.
    ///
    /// # Errors
    ///
    /// Returns [`MessengerError::NotFound`] if the message does not exist.
    pub async fn reject(&self, id: MessageId, error: &str) -> Result<(), MessengerError> {
        let result = query(REJECT_MESSAGE_SQL)
            .bind(id.into_i64())
            .bind(error)
            .execute(&self.pool)
            .await?;

        ensure_affected(result.rows_affected())
    }

    /// Fetch a single message row.
    ///
    /// # Errors
    ///
    /// Returns [`MessengerError::NotFound`] if the message does not exist.
    pub async fn get(&self, id: MessageId) -> Result<QueuedMessage, MessengerError> {
        query_as::<Postgres, QueuedMessage>(GET_MESSAGE_SQL)
            .bind(id.into_i64())
            .fetch_one(&self.pool)
            .await
            .map_err(Into::into)
    }

    /// List messages on `queue` that exhausted their retries.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_failed(&self, queue: &str) -> Result<Vec<QueuedMessage>, MessengerError> {
        query_as::<Postgres, QueuedMessage>(LIST_FAILED_MESSAGES_SQL)
            .bind(queue)
            .fetch_all(&self.pool)
            .await
            .map_err(Into::into)
    }

    /// Put a failed message back on its queue with a fresh attempt budget.
    ///
    /// # Errors
    ///
    /// Returns [`MessengerError::NotFound`] if no failed message has this id.
    pub async fn requeue_failed(&self, id: MessageId) -> Result<(), MessengerError> {
        let result = query(REQUEUE_FAILED_MESSAGE_SQL)
            .bind(id.into_i64())
            .execute(&self.pool)
            .await?;

        ensure_affected(result.rows_affected())
    }
}

fn ensure_affected(rows_affected: u64) -> Result<(), MessengerError> {
    if rows_affected == 0 {
        return Err(MessengerError::NotFound);
    }

    Ok(())
}

impl<'r> FromRow<'r, PgRow> for QueuedMessage {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let attempts: i32 = row.try_get("attempts")?;

        let attempts = u32::try_from(attempts).map_err(|e| sqlx::Error::ColumnDecode {
            index: "attempts".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            id: MessageId::from_i64(row.try_get("id")?),
            queue_name: row.try_get("queue_name")?,
            body: row.try_get("body")?,
            attempts,
            last_error: row.try_get("last_error")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            available_at: row.try_get::<SqlxTimestamp, _>("available_at")?.to_jiff(),
            processed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("processed_at")?
                .map(SqlxTimestamp::to_jiff),
            failed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("failed_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
