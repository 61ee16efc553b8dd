use async_trait::async_trait;

use super::backend_impl::PostgresBackend;
use crate::backend::database::common::{map_database_error, new_id, timestamp};
use crate::backend::database::rows::{convert_rows, UserRow, USER_COLUMNS};
use crate::backend::UserBackend;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User};
use crate::parser::PageRequest;

impl PostgresBackend {
    async fn fetch_user_where(&self, column: &str, value: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find user: {}", e)))?;

        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl UserBackend for PostgresBackend {
    async fn create_user(&self, user: &NewUser) -> AppResult<User> {
        let id = new_id();
        let now = timestamp();

        sqlx::query(
            "INSERT INTO users (id, name, email, phone, password_hash, role, is_verified, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, FALSE, TRUE, $7, $8)",
        )
        .bind(&id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_database_error(e, "User"))?;

        self.find_user_by_id(&id)
            .await?
            .ok_or_else(|| AppError::Internal("Created user could not be read back".to_string()))
    }

    async fn find_user_by_id(&self, id: &str) -> AppResult<Option<User>> {
        self.fetch_user_where("id", id).await
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.fetch_user_where("email", email).await
    }

    async fn find_user_by_phone(&self, phone: &str) -> AppResult<Option<User>> {
        self.fetch_user_where("phone", phone).await
    }

    async fn find_all_users(&self, page: &PageRequest) -> AppResult<(Vec<User>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count users: {}", e)))?;

        let sql = format!(
            "SELECT {} FROM users ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            USER_COLUMNS
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to list users: {}", e)))?;

        Ok((convert_rows(rows)?, total))
    }

    async fn update_user_profile(
        &self,
        id: &str,
        name: &str,
        phone: &str,
    ) -> AppResult<Option<User>> {
        let result = sqlx::query("UPDATE users SET name = $1, phone = $2, updated_at = $3 WHERE id = $4")
            .bind(name)
            .bind(phone)
            .bind(timestamp())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_database_error(e, "User"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_user_by_id(id).await
    }

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3")
                .bind(password_hash)
                .bind(timestamp())
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| map_database_error(e, "User"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_user_active(&self, id: &str, is_active: bool) -> AppResult<Option<User>> {
        let result = sqlx::query("UPDATE users SET is_active = $1, updated_at = $2 WHERE id = $3")
            .bind(is_active)
            .bind(timestamp())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_database_error(e, "User"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_user_by_id(id).await
    }

    async fn set_user_verified(&self, id: &str, is_verified: bool) -> AppResult<Option<User>> {
        let result =
            sqlx::query("UPDATE users SET is_verified = $1, updated_at = $2 WHERE id = $3")
                .bind(is_verified)
                .bind(timestamp())
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| map_database_error(e, "User"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_user_by_id(id).await
    }
}
