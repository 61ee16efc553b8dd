use crate::error::{AppError, AppResult};
use sqlx::SqlitePool;

const TABLES: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'customer'
                CHECK (role IN ('customer', 'broker', 'admin')),
            is_verified BOOLEAN NOT NULL DEFAULT 0,
            is_active BOOLEAN NOT NULL DEFAULT 1,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL
        )
        "#,
    ),
    (
        "properties",
        r#"
        CREATE TABLE IF NOT EXISTS properties (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            property_type TEXT NOT NULL,
            listing_type TEXT NOT NULL,
            price REAL NOT NULL CHECK (price >= 0),
            address TEXT NOT NULL,
            city TEXT NOT NULL,
            city_folded TEXT NOT NULL,
            state TEXT NOT NULL,
            zipcode TEXT NOT NULL DEFAULT '',
            bedrooms INTEGER NOT NULL DEFAULT 0,
            bathrooms INTEGER NOT NULL DEFAULT 0,
            area REAL NOT NULL DEFAULT 0,
            year_built INTEGER,
            property_condition TEXT NOT NULL DEFAULT 'good',
            features TEXT NOT NULL DEFAULT '[]',
            images TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'available',
            views INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL,
            FOREIGN KEY (owner_id) REFERENCES users (id) ON DELETE CASCADE
        )
        "#,
    ),
    (
        "broker_profiles",
        r#"
        CREATE TABLE IF NOT EXISTS broker_profiles (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE,
            company TEXT NOT NULL,
            license_number TEXT NOT NULL UNIQUE,
            experience_years INTEGER NOT NULL DEFAULT 0,
            serving_areas TEXT NOT NULL DEFAULT '[]',
            specializations TEXT NOT NULL DEFAULT '[]',
            verification_status TEXT NOT NULL DEFAULT 'pending',
            rejection_reason TEXT,
            reviewed_by TEXT,
            reviewed_at DATETIME,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
        )
        "#,
    ),
    (
        "contact_messages",
        r#"
        CREATE TABLE IF NOT EXISTS contact_messages (
            id TEXT PRIMARY KEY,
            user_id TEXT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            subject TEXT,
            message TEXT NOT NULL,
            property_id TEXT,
            status TEXT NOT NULL DEFAULT 'new',
            reply TEXT,
            replied_at DATETIME,
            replied_by TEXT,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE SET NULL,
            FOREIGN KEY (property_id) REFERENCES properties (id) ON DELETE SET NULL
        )
        "#,
    ),
    (
        "messages",
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            sender_id TEXT NOT NULL,
            recipient_id TEXT NOT NULL,
            property_id TEXT,
            body TEXT NOT NULL,
            is_read BOOLEAN NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL,
            FOREIGN KEY (sender_id) REFERENCES users (id) ON DELETE CASCADE,
            FOREIGN KEY (recipient_id) REFERENCES users (id) ON DELETE CASCADE,
            FOREIGN KEY (property_id) REFERENCES properties (id) ON DELETE SET NULL
        )
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_properties_listing ON properties (status, created_at DESC, id DESC)",
    "CREATE INDEX IF NOT EXISTS idx_properties_owner ON properties (owner_id)",
    "CREATE INDEX IF NOT EXISTS idx_properties_type ON properties (property_type, listing_type)",
    "CREATE INDEX IF NOT EXISTS idx_properties_price ON properties (price)",
    "CREATE INDEX IF NOT EXISTS idx_broker_profiles_status ON broker_profiles (verification_status)",
    "CREATE INDEX IF NOT EXISTS idx_contact_messages_status ON contact_messages (status, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_messages_recipient ON messages (recipient_id, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_messages_sender ON messages (sender_id, created_at)",
];

/// Create all marketplace tables and indexes for SQLite
pub async fn init_schema(pool: &SqlitePool) -> AppResult<()> {
    for (table, sql) in TABLES {
        sqlx::query(sql).execute(pool).await.map_err(|e| {
            AppError::Database(format!("Failed to create {} table: {}", table, e))
        })?;
    }

    for sql in INDEXES {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create index: {}", e)))?;
    }

    Ok(())
}

/// Drop every table (for cleanup/testing)
#[cfg(test)]
pub async fn drop_schema(pool: &SqlitePool) -> AppResult<()> {
    for (table, _) in TABLES.iter().rev() {
        let sql = format!("DROP TABLE IF EXISTS {}", table);
        sqlx::query(&sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to drop table {}: {}", table, e)))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_schema_creation_is_idempotent() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        init_schema(&pool).await.unwrap();
        init_schema(&pool).await.unwrap();

        for (table, _) in TABLES {
            let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(count.0, 0);
        }

        drop_schema(&pool).await.unwrap();
    }
}
