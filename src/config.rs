use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use rand::RngCore;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::backend::database::DatabaseBackendConfig;
use crate::backend::DatabaseType;
use crate::error::{AppError, AppResult};
use crate::password::PasswordAlgorithm;

pub const MIN_JWT_SECRET_LENGTH: usize = 16;
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

lazy_static! {
    static ref ENV_VAR_REGEX: Regex =
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").unwrap();
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    #[serde(rename = "type")]
    pub db_type: String,
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_connection_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
    #[serde(default)]
    pub password_algorithm: PasswordAlgorithm,
}

fn default_token_ttl_days() -> i64 {
    30
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ListingConfig {
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: i64,
}

fn default_page_size() -> i64 {
    12
}

fn default_max_page_size() -> i64 {
    100
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

/// Admin account created at startup when no user with this email exists
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BootstrapAdminConfig {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl AppConfig {
    /// Load configuration from YAML file
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> AppResult<Self> {
        let path = config_path.as_ref();

        if !path.exists() {
            return Err(AppError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let expanded_content = Self::expand_env_vars(&content)?;

        let app_config: AppConfig = serde_yaml::from_str(&expanded_content).map_err(|e| {
            AppError::Configuration(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Development configuration: in-memory SQLite and a random signing key
    /// that lives only as long as the process.
    pub fn default_config() -> Self {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);

        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                log_level: default_log_level(),
            },
            database: DatabaseConfig {
                db_type: "sqlite".to_string(),
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
                connection_timeout: default_connection_timeout(),
            },
            auth: AuthConfig {
                jwt_secret: general_purpose::STANDARD.encode(secret),
                token_ttl_days: default_token_ttl_days(),
                password_algorithm: PasswordAlgorithm::default(),
            },
            listing: ListingConfig::default(),
            bootstrap_admin: None,
        }
    }

    /// Expand environment variables in format ${VAR_NAME} or ${VAR_NAME:-default}
    fn expand_env_vars(content: &str) -> AppResult<String> {
        let mut missing: Option<String> = None;

        let expanded = ENV_VAR_REGEX.replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => match caps.get(2) {
                    Some(default) => default.as_str().to_string(),
                    None => {
                        missing.get_or_insert_with(|| var_name.to_string());
                        String::new()
                    }
                },
            }
        });

        if let Some(var_name) = missing {
            return Err(AppError::Configuration(format!(
                "Environment variable {} not found and no default provided",
                var_name
            )));
        }

        Ok(expanded.into_owned())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.auth.jwt_secret.chars().count() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::Configuration(format!(
                "auth.jwt_secret must be at least {} characters",
                MIN_JWT_SECRET_LENGTH
            )));
        }
        if self.auth.token_ttl_days <= 0 {
            return Err(AppError::Configuration(
                "auth.token_ttl_days must be positive".to_string(),
            ));
        }
        if self.auth.token_ttl_days > MAX_TOKEN_TTL_DAYS {
            return Err(AppError::Configuration(format!(
                "auth.token_ttl_days must be at most {}",
                MAX_TOKEN_TTL_DAYS
            )));
        }
        if self.listing.page_size <= 0 || self.listing.max_page_size <= 0 {
            return Err(AppError::Configuration(
                "listing page sizes must be positive".to_string(),
            ));
        }
        if self.listing.page_size > self.listing.max_page_size {
            return Err(AppError::Configuration(
                "listing.page_size cannot exceed listing.max_page_size".to_string(),
            ));
        }
        self.database_backend_config()?;
        Ok(())
    }

    /// Translate the `database` section into a backend configuration
    pub fn database_backend_config(&self) -> AppResult<DatabaseBackendConfig> {
        let database_type = DatabaseType::from_name(&self.database.db_type).ok_or_else(|| {
            AppError::Configuration(format!(
                "Unsupported database type: {}",
                self.database.db_type
            ))
        })?;

        let config = DatabaseBackendConfig::new(database_type, self.database.url.as_str())
            .with_pool(self.database.max_connections, self.database.connection_timeout);

        config.validate().map_err(AppError::Configuration)?;
        Ok(config)
    }
}
