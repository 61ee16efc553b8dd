use async_trait::async_trait;

use super::backend_impl::PostgresBackend;
use crate::backend::database::common::{map_database_error, new_id, timestamp};
use crate::backend::database::rows::{MessageRow, MESSAGE_COLUMNS};
use crate::backend::MessageBackend;
use crate::error::{AppError, AppResult};
use crate::models::{Message, MessageInput};
use crate::parser::PageRequest;

impl PostgresBackend {
    /// Messages where `column` equals `user_id`, newest first
    async fn fetch_messages_for(
        &self,
        column: &str,
        user_id: &str,
        page: &PageRequest,
    ) -> AppResult<(Vec<Message>, i64)> {
        let count_sql = format!("SELECT COUNT(*) FROM messages WHERE {} = $1", column);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count messages: {}", e)))?;

        let sql = format!(
            "SELECT {} FROM messages WHERE {} = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
            MESSAGE_COLUMNS, column
        );
        let rows = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(user_id)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to list messages: {}", e)))?;

        Ok((rows.into_iter().map(Message::from).collect(), total))
    }
}

#[async_trait]
impl MessageBackend for PostgresBackend {
    async fn create_message(&self, sender_id: &str, input: &MessageInput) -> AppResult<Message> {
        let id = new_id();

        sqlx::query(
            "INSERT INTO messages (id, sender_id, recipient_id, property_id, body, is_read, created_at) \
             VALUES ($1, $2, $3, $4, $5, FALSE, $6)",
        )
        .bind(&id)
        .bind(sender_id)
        .bind(&input.recipient_id)
        .bind(input.property_id.as_deref())
        .bind(&input.body)
        .bind(timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| map_database_error(e, "Message"))?;

        self.find_message_by_id(&id)
            .await?
            .ok_or_else(|| AppError::Internal("Created message could not be read back".to_string()))
    }

    async fn find_message_by_id(&self, id: &str) -> AppResult<Option<Message>> {
        let sql = format!("SELECT {} FROM messages WHERE id = $1", MESSAGE_COLUMNS);

        let row = sqlx::query_as::<_, MessageRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find message: {}", e)))?;

        Ok(row.map(Message::from))
    }

    async fn find_inbox(
        &self,
        recipient_id: &str,
        page: &PageRequest,
    ) -> AppResult<(Vec<Message>, i64)> {
        self.fetch_messages_for("recipient_id", recipient_id, page)
            .await
    }

    async fn find_sent(
        &self,
        sender_id: &str,
        page: &PageRequest,
    ) -> AppResult<(Vec<Message>, i64)> {
        self.fetch_messages_for("sender_id", sender_id, page).await
    }

    async fn mark_message_read(&self, id: &str) -> AppResult<Option<Message>> {
        let result = sqlx::query("UPDATE messages SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_database_error(e, "Message"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_message_by_id(id).await
    }
}
