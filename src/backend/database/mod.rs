//! Database abstraction layer
//!
//! Shared row shapes, error mapping and the listing filter live here; each
//! dialect implements the backend traits on its own pool.
//!
//! # Architecture
//!
//! ```text
//! Common logic (rows.rs, filter.rs, common.rs)
//!     ↓
//! Database-specific implementations
//!     ├── postgres/ (PostgreSQL-specific code)
//!     └── sqlite/   (SQLite-specific code)
//! ```

/// Bind every [`filter::BindValue`] onto a sqlx query, in placeholder order
macro_rules! bind_params {
    ($query:expr, $params:expr) => {{
        let mut query = $query;
        for value in $params {
            query = match value {
                $crate::backend::database::filter::BindValue::Text(text) => {
                    query.bind(text.as_str())
                }
                $crate::backend::database::filter::BindValue::Integer(number) => {
                    query.bind(*number)
                }
                $crate::backend::database::filter::BindValue::Real(number) => query.bind(*number),
            };
        }
        query
    }};
}

pub(crate) use bind_params;

pub mod common;
pub mod config;
pub mod filter;
pub mod postgres;
pub mod rows;
pub mod sqlite;


// Re-export key types for convenience
pub use common::map_database_error;
pub use config::DatabaseBackendConfig;
pub use filter::{BindValue, FilterConverter, WhereClause};
pub use postgres::PostgresBackend;
pub use sqlite::SqliteBackend;
