use async_trait::async_trait;

use super::backend_impl::PostgresBackend;
use crate::backend::database::common::{map_database_error, new_id, timestamp};
use crate::backend::database::rows::{convert_rows, ContactRow, CONTACT_COLUMNS};
use crate::backend::ContactBackend;
use crate::error::{AppError, AppResult};
use crate::models::{ContactMessage, ContactStatus, NewContact};
use crate::parser::PageRequest;

#[async_trait]
impl ContactBackend for PostgresBackend {
    async fn create_contact(&self, contact: &NewContact) -> AppResult<ContactMessage> {
        let id = new_id();
        let now = timestamp();
        let input = &contact.input;

        sqlx::query(
            "INSERT INTO contact_messages (id, user_id, name, email, phone, subject, message, \
             property_id, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&id)
        .bind(contact.user_id.as_deref())
        .bind(&input.name)
        .bind(&input.email)
        .bind(input.phone.as_deref())
        .bind(input.subject.as_deref())
        .bind(&input.message)
        .bind(input.property_id.as_deref())
        .bind(ContactStatus::New.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_database_error(e, "Contact message"))?;

        self.find_contact_by_id(&id).await?.ok_or_else(|| {
            AppError::Internal("Created contact message could not be read back".to_string())
        })
    }

    async fn find_contact_by_id(&self, id: &str) -> AppResult<Option<ContactMessage>> {
        let sql = format!(
            "SELECT {} FROM contact_messages WHERE id = $1",
            CONTACT_COLUMNS
        );

        let row = sqlx::query_as::<_, ContactRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find contact message: {}", e)))?;

        row.map(ContactMessage::try_from).transpose()
    }

    async fn find_contacts(
        &self,
        status: Option<ContactStatus>,
        page: &PageRequest,
    ) -> AppResult<(Vec<ContactMessage>, i64)> {
        // NULL status means "any"
        let status = status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM contact_messages WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to count contact messages: {}", e)))?;

        let sql = format!(
            "SELECT {} FROM contact_messages WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
            CONTACT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ContactRow>(&sql)
            .bind(status)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to list contact messages: {}", e)))?;

        Ok((convert_rows(rows)?, total))
    }

    async fn mark_contact_read(&self, id: &str) -> AppResult<Option<ContactMessage>> {
        sqlx::query(
            "UPDATE contact_messages SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4",
        )
        .bind(ContactStatus::Read.as_str())
        .bind(timestamp())
        .bind(id)
        .bind(ContactStatus::New.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_database_error(e, "Contact message"))?;

        self.find_contact_by_id(id).await
    }

    async fn reply_to_contact(
        &self,
        id: &str,
        reply: &str,
        replied_by: &str,
    ) -> AppResult<Option<ContactMessage>> {
        let now = timestamp();

        let result = sqlx::query(
            "UPDATE contact_messages SET reply = $1, status = $2, replied_at = $3, replied_by = $4, \
             updated_at = $5 WHERE id = $6",
        )
        .bind(reply)
        .bind(ContactStatus::Replied.as_str())
        .bind(now)
        .bind(replied_by)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_database_error(e, "Contact message"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_contact_by_id(id).await
    }

    async fn update_contact_status(
        &self,
        id: &str,
        status: ContactStatus,
    ) -> AppResult<Option<ContactMessage>> {
        let result =
            sqlx::query("UPDATE contact_messages SET status = $1, updated_at = $2 WHERE id = $3")
                .bind(status.as_str())
                .bind(timestamp())
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| map_database_error(e, "Contact message"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_contact_by_id(id).await
    }
}
