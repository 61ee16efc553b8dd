use crate::error::{AppError, AppResult};
use sqlx::PgPool;

const TABLES: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'customer'
                CHECK (role IN ('customer', 'broker', 'admin')),
            is_verified BOOLEAN NOT NULL DEFAULT FALSE,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT users_email_key UNIQUE (email),
            CONSTRAINT users_phone_key UNIQUE (phone)
        )
        "#,
    ),
    (
        "properties",
        r#"
        CREATE TABLE IF NOT EXISTS properties (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            property_type TEXT NOT NULL,
            listing_type TEXT NOT NULL,
            price DOUBLE PRECISION NOT NULL CHECK (price >= 0),
            address TEXT NOT NULL,
            city TEXT NOT NULL,
            city_folded TEXT NOT NULL,
            state TEXT NOT NULL,
            zipcode TEXT NOT NULL DEFAULT '',
            bedrooms INTEGER NOT NULL DEFAULT 0,
            bathrooms INTEGER NOT NULL DEFAULT 0,
            area DOUBLE PRECISION NOT NULL DEFAULT 0,
            year_built INTEGER,
            property_condition TEXT NOT NULL DEFAULT 'good',
            features TEXT NOT NULL DEFAULT '[]',
            images TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'available',
            views BIGINT NOT NULL DEFAULT 0,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "broker_profiles",
        r#"
        CREATE TABLE IF NOT EXISTS broker_profiles (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            company TEXT NOT NULL,
            license_number TEXT NOT NULL,
            experience_years INTEGER NOT NULL DEFAULT 0,
            serving_areas TEXT NOT NULL DEFAULT '[]',
            specializations TEXT NOT NULL DEFAULT '[]',
            verification_status TEXT NOT NULL DEFAULT 'pending',
            rejection_reason TEXT,
            reviewed_by TEXT,
            reviewed_at TIMESTAMP WITH TIME ZONE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT broker_profiles_user_id_key UNIQUE (user_id),
            CONSTRAINT broker_profiles_license_number_key UNIQUE (license_number)
        )
        "#,
    ),
    (
        "contact_messages",
        r#"
        CREATE TABLE IF NOT EXISTS contact_messages (
            id TEXT PRIMARY KEY,
            user_id TEXT REFERENCES users (id) ON DELETE SET NULL,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            subject TEXT,
            message TEXT NOT NULL,
            property_id TEXT REFERENCES properties (id) ON DELETE SET NULL,
            status TEXT NOT NULL DEFAULT 'new',
            reply TEXT,
            replied_at TIMESTAMP WITH TIME ZONE,
            replied_by TEXT,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "messages",
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            sender_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            recipient_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            property_id TEXT REFERENCES properties (id) ON DELETE SET NULL,
            body TEXT NOT NULL,
            is_read BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
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

/// Create all marketplace tables and indexes for PostgreSQL
pub async fn init_schema(pool: &PgPool) -> AppResult<()> {
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
