use crate::adapters::database::records::{MessageDetailRecord, MessageRecord, ReadReceiptRecord};
use crate::adapters::database::{DbPool, FOREIGN_KEY_VIOLATION, is_violation};
use crate::domain::message::{Message, MessageDetail, MessageId, ReadReceipt};
use crate::domain::store::MessageStore;
use crate::error::{AppError, Result};
use async_trait::async_trait;

#[derive(Clone, Debug)]
pub struct MessageRepository {
    pool: DbPool,
}

impl MessageRepository {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get(&self, id: MessageId) -> Result<MessageDetail> {
        let record = sqlx::query_as::<_, MessageDetailRecord>(
            r#"
            SELECT m.id, m.body, m.sent_at, m.read_at,
                   f.username AS from_username, f.first_name AS from_first_name,
                   f.last_name AS from_last_name, f.phone AS from_phone,
                   t.username AS to_username, t.first_name AS to_first_name,
                   t.last_name AS to_last_name, t.phone AS to_phone
            FROM messages AS m
            JOIN users AS f ON m.from_username = f.username
            JOIN users AS t ON m.to_username = t.username
            WHERE m.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(Into::into).ok_or(AppError::NotFound)
    }

    #[tracing::instrument(level = "debug", skip(self, body))]
    async fn create(&self, from_username: &str, to_username: &str, body: &str) -> Result<Message> {
        let result = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (from_username, to_username, body, sent_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, from_username, to_username, body, sent_at, read_at
            "#,
        )
        .bind(from_username)
        .bind(to_username)
        .bind(body)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(record) => Ok(record.into()),
            // Either participant does not exist
            Err(e) if is_violation(&e, FOREIGN_KEY_VIOLATION) => Err(AppError::NotFound),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn mark_read(&self, id: MessageId) -> Result<ReadReceipt> {
        // COALESCE keeps the first timestamp; the single statement makes concurrent calls safe.
        let record = sqlx::query_as::<_, ReadReceiptRecord>(
            r#"
            UPDATE messages
            SET read_at = COALESCE(read_at, NOW())
            WHERE id = $1
            RETURNING id, read_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(Into::into).ok_or(AppError::NotFound)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
