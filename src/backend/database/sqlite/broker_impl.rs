use async_trait::async_trait;

use super::backend_impl::SqliteBackend;
use crate::backend::database::common::{map_database_error, new_id, timestamp};
use crate::backend::database::rows::{convert_rows, encode_list, BrokerRow, BROKER_COLUMNS};
use crate::backend::BrokerBackend;
use crate::error::{AppError, AppResult};
use crate::models::{BrokerProfile, BrokerProfileInput, VerificationStatus};
use crate::parser::PageRequest;

impl SqliteBackend {
    async fn fetch_broker_where(
        &self,
        column: &str,
        value: &str,
    ) -> AppResult<Option<BrokerProfile>> {
        let sql = format!(
            "SELECT {} FROM broker_profiles WHERE {} = ?1",
            BROKER_COLUMNS, column
        );

        let row = sqlx::query_as::<_, BrokerRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find broker profile: {}", e)))?;

        row.map(BrokerProfile::try_from).transpose()
    }
}

#[async_trait]
impl BrokerBackend for SqliteBackend {
    async fn create_broker_profile(
        &self,
        user_id: &str,
        input: &BrokerProfileInput,
    ) -> AppResult<BrokerProfile> {
        let id = new_id();
        let now = timestamp();

        sqlx::query(
            "INSERT INTO broker_profiles (id, user_id, company, license_number, experience_years, \
             serving_areas, specializations, verification_status, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(&input.company)
        .bind(&input.license_number)
        .bind(input.experience_years)
        .bind(encode_list(&input.serving_areas)?)
        .bind(encode_list(&input.specializations)?)
        .bind(VerificationStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_database_error(e, "Broker profile"))?;

        self.fetch_broker_where("id", &id).await?.ok_or_else(|| {
            AppError::Internal("Created broker profile could not be read back".to_string())
        })
    }

    async fn find_broker_profile_by_id(&self, id: &str) -> AppResult<Option<BrokerProfile>> {
        self.fetch_broker_where("id", id).await
    }

    async fn find_broker_profile_by_user(
        &self,
        user_id: &str,
    ) -> AppResult<Option<BrokerProfile>> {
        self.fetch_broker_where("user_id", user_id).await
    }

    async fn find_broker_profiles(
        &self,
        status: Option<VerificationStatus>,
        page: &PageRequest,
    ) -> AppResult<(Vec<BrokerProfile>, i64)> {
        let (total, rows) = match status {
            Some(status) => {
                let total: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM broker_profiles WHERE verification_status = ?1",
                )
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::Database(format!("Failed to count broker profiles: {}", e))
                })?;

                let sql = format!(
                    "SELECT {} FROM broker_profiles WHERE verification_status = ?1 \
                     ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
                    BROKER_COLUMNS
                );
                let rows = sqlx::query_as::<_, BrokerRow>(&sql)
                    .bind(status.as_str())
                    .bind(page.limit)
                    .bind(page.offset())
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| {
                        AppError::Database(format!("Failed to list broker profiles: {}", e))
                    })?;
                (total, rows)
            }
            None => {
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM broker_profiles")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| {
                        AppError::Database(format!("Failed to count broker profiles: {}", e))
                    })?;

                let sql = format!(
                    "SELECT {} FROM broker_profiles ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
                    BROKER_COLUMNS
                );
                let rows = sqlx::query_as::<_, BrokerRow>(&sql)
                    .bind(page.limit)
                    .bind(page.offset())
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| {
                        AppError::Database(format!("Failed to list broker profiles: {}", e))
                    })?;
                (total, rows)
            }
        };

        Ok((convert_rows(rows)?, total))
    }

    async fn update_broker_profile(
        &self,
        user_id: &str,
        input: &BrokerProfileInput,
    ) -> AppResult<Option<BrokerProfile>> {
        let result = sqlx::query(
            "UPDATE broker_profiles SET company = ?1, license_number = ?2, experience_years = ?3, \
             serving_areas = ?4, specializations = ?5, updated_at = ?6 WHERE user_id = ?7",
        )
        .bind(&input.company)
        .bind(&input.license_number)
        .bind(input.experience_years)
        .bind(encode_list(&input.serving_areas)?)
        .bind(encode_list(&input.specializations)?)
        .bind(timestamp())
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_database_error(e, "Broker profile"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_broker_where("user_id", user_id).await
    }

    async fn review_broker_profile(
        &self,
        id: &str,
        status: VerificationStatus,
        reason: Option<&str>,
        reviewer_id: &str,
    ) -> AppResult<Option<BrokerProfile>> {
        let now = timestamp();

        let result = sqlx::query(
            "UPDATE broker_profiles SET verification_status = ?1, rejection_reason = ?2, \
             reviewed_by = ?3, reviewed_at = ?4, updated_at = ?5 \
             WHERE id = ?6 AND verification_status = 'pending'",
        )
        .bind(status.as_str())
        .bind(reason)
        .bind(reviewer_id)
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_database_error(e, "Broker profile"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_broker_where("id", id).await
    }
}
