use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

use crate::error::{AppError, IdentityField};

/// Server-generated primary key
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time at microsecond precision, the finest both databases keep
pub fn timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Map a failed write onto the error taxonomy
///
/// Unique violations on the identity columns become `DuplicateIdentity`, other
/// unique violations `Conflict`. Both SQLite ("UNIQUE constraint failed:
/// users.email") and PostgreSQL ("users_email_key") name the column.
pub fn map_database_error(error: sqlx::Error, resource_type: &str) -> AppError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            let detail = format!(
                "{} {}",
                db_error.constraint().unwrap_or_default(),
                db_error.message()
            )
            .to_lowercase();

            return if detail.contains("license_number") {
                AppError::Conflict(
                    "A broker profile with this license number already exists".to_string(),
                )
            } else if detail.contains("broker_profiles") && detail.contains("user_id") {
                AppError::Conflict("Broker profile already exists for this user".to_string())
            } else if detail.contains("email") {
                AppError::DuplicateIdentity {
                    field: IdentityField::Email,
                }
            } else if detail.contains("phone") {
                AppError::DuplicateIdentity {
                    field: IdentityField::Phone,
                }
            } else {
                AppError::Conflict(format!("{} already exists", resource_type))
            };
        }

        if db_error.is_foreign_key_violation() {
            return AppError::Validation(format!(
                "{} references a record that does not exist",
                resource_type
            ));
        }
    }

    AppError::Database(format!("Failed to write {}: {}", resource_type, error))
}
