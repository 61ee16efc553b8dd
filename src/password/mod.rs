use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, AppResult};

pub mod argon2_hasher;
pub mod bcrypt_hasher;

pub use argon2_hasher::Argon2idHasher;
pub use bcrypt_hasher::BcryptHasher;

/// Algorithm used for new account passwords (`auth.password_algorithm`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordAlgorithm {
    Bcrypt,
    #[default]
    Argon2id,
}

impl PasswordAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            PasswordAlgorithm::Bcrypt => "bcrypt",
            PasswordAlgorithm::Argon2id => "argon2id",
        }
    }

    /// Identify the algorithm from a stored PHC / modular-crypt string
    pub fn detect(stored_hash: &str) -> Option<Self> {
        if Argon2idHasher::recognizes(stored_hash) {
            Some(PasswordAlgorithm::Argon2id)
        } else if BcryptHasher::recognizes(stored_hash) {
            Some(PasswordAlgorithm::Bcrypt)
        } else {
            None
        }
    }
}

impl std::fmt::Display for PasswordAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One salted one-way password hash scheme
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> AppResult<String>;

    /// `Ok(false)` for a mismatch; `Err` only when the stored hash is unusable
    fn verify(&self, password: &str, stored_hash: &str) -> AppResult<bool>;
}

const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

struct Hashers {
    algorithm: PasswordAlgorithm,
    argon2: Argon2idHasher,
    bcrypt: BcryptHasher,
    /// Verified against when no account matches, so both login failures cost
    /// one full verification
    decoy_hash: Option<String>,
}

/// Hashes account passwords with the configured algorithm and verifies
/// against whichever algorithm produced the stored hash.
///
/// The async methods run the hashing on the blocking pool. Cloning is cheap.
#[derive(Clone)]
pub struct PasswordManager {
    inner: Arc<Hashers>,
}

impl Default for PasswordManager {
    fn default() -> Self {
        Self::new(PasswordAlgorithm::default())
    }
}

impl PasswordManager {
    pub fn new(algorithm: PasswordAlgorithm) -> Self {
        let mut hashers = Hashers {
            algorithm,
            argon2: Argon2idHasher::new(),
            bcrypt: BcryptHasher::new(),
            decoy_hash: None,
        };
        hashers.decoy_hash = match hashers.hasher(algorithm).hash(DECOY_PASSWORD) {
            Ok(hash) => Some(hash),
            Err(e) => {
                tracing::warn!("failed to prepare decoy password hash: {}", e);
                None
            }
        };

        Self {
            inner: Arc::new(hashers),
        }
    }

    pub fn algorithm(&self) -> PasswordAlgorithm {
        self.inner.algorithm
    }

    /// Validate the password policy, then hash with a fresh salt
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        crate::validation::validate_password(password)?;
        self.inner.hasher(self.inner.algorithm).hash(password)
    }

    pub fn verify_password(&self, password: &str, stored_hash: &str) -> AppResult<bool> {
        let algorithm = PasswordAlgorithm::detect(stored_hash).ok_or_else(|| {
            AppError::Internal("Stored password hash has an unsupported format".to_string())
        })?;
        self.inner.hasher(algorithm).verify(password, stored_hash)
    }

    /// Spend one verification on the decoy hash. The outcome is discarded.
    pub fn verify_decoy(&self, password: &str) {
        if let Some(decoy) = &self.inner.decoy_hash {
            let _ = self.verify_password(password, decoy);
        }
    }

    /// True when the stored hash was produced by a different algorithm
    pub fn needs_rehash(&self, stored_hash: &str) -> bool {
        PasswordAlgorithm::detect(stored_hash) != Some(self.inner.algorithm)
    }

    /// [`hash_password`](Self::hash_password) on the blocking pool
    pub async fn hash(&self, password: &str) -> AppResult<String> {
        let password = password.to_string();
        self.run_blocking(move |manager| manager.hash_password(&password))
            .await
    }

    /// [`verify_password`](Self::verify_password) on the blocking pool
    pub async fn verify(&self, password: &str, stored_hash: &str) -> AppResult<bool> {
        let password = password.to_string();
        let stored_hash = stored_hash.to_string();
        self.run_blocking(move |manager| manager.verify_password(&password, &stored_hash))
            .await
    }

    /// [`verify_decoy`](Self::verify_decoy) on the blocking pool
    pub async fn burn_decoy(&self, password: &str) {
        let password = password.to_string();
        let outcome = self
            .run_blocking(move |manager| {
                manager.verify_decoy(&password);
                Ok(())
            })
            .await;
        if let Err(e) = outcome {
            tracing::warn!("decoy verification failed: {}", e);
        }
    }

    async fn run_blocking<T, F>(&self, work: F) -> AppResult<T>
    where
        F: FnOnce(&PasswordManager) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let manager = self.clone();
        tokio::task::spawn_blocking(move || work(&manager))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }
}

impl Hashers {
    fn hasher(&self, algorithm: PasswordAlgorithm) -> &dyn PasswordHasher {
        match algorithm {
            PasswordAlgorithm::Argon2id => &self.argon2,
            PasswordAlgorithm::Bcrypt => &self.bcrypt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_password_is_rejected_before_hashing() {
        let manager = PasswordManager::default();
        assert!(matches!(
            manager.hash_password("12345"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let manager = PasswordManager::default();
        let first = manager.hash_password("hunter22").unwrap();
        let second = manager.hash_password("hunter22").unwrap();

        assert_ne!(first, second);
        assert!(!first.contains("hunter22"));
        assert_eq!(PasswordAlgorithm::detect(&first), Some(PasswordAlgorithm::Argon2id));
        assert!(manager.verify_password("hunter22", &first).unwrap());
        assert!(manager.verify_password("hunter22", &second).unwrap());
        assert!(!manager.verify_password("hunter23", &first).unwrap());
        assert!(!manager.needs_rehash(&first));
    }

    #[test]
    fn test_bcrypt_hash_verifies_under_argon2_default() {
        let stored = bcrypt::hash("sea-view-flat", 4).unwrap();
        let manager = PasswordManager::default();

        assert!(manager.verify_password("sea-view-flat", &stored).unwrap());
        assert!(!manager.verify_password("sea-view-flats", &stored).unwrap());
        assert!(manager.needs_rehash(&stored));
    }

    #[test]
    fn test_bcrypt_configured() {
        let manager = PasswordManager::new(PasswordAlgorithm::Bcrypt);
        let stored = manager.hash_password("sea-view-flat").unwrap();
        assert!(stored.starts_with("$2b$"));
        assert!(!manager.needs_rehash(&stored));
    }

    #[test]
    fn test_plaintext_in_store_is_an_internal_error() {
        let manager = PasswordManager::default();
        assert!(matches!(
            manager.verify_password("whatever", "whatever"),
            Err(AppError::Internal(_))
        ));
        assert!(manager.needs_rehash("whatever"));
    }

    #[test]
    fn test_decoy_is_prepared_with_configured_algorithm() {
        let manager = PasswordManager::new(PasswordAlgorithm::Bcrypt);
        let decoy = manager.inner.decoy_hash.clone().unwrap();
        assert_eq!(PasswordAlgorithm::detect(&decoy), Some(PasswordAlgorithm::Bcrypt));

        let manager = PasswordManager::default();
        let decoy = manager.inner.decoy_hash.clone().unwrap();
        assert_eq!(PasswordAlgorithm::detect(&decoy), Some(PasswordAlgorithm::Argon2id));
        manager.verify_decoy("anything at all");
    }

    #[tokio::test]
    async fn test_async_hash_and_verify() {
        let manager = PasswordManager::default();
        let stored = manager.hash("open-plan-loft").await.unwrap();

        assert!(manager.verify("open-plan-loft", &stored).await.unwrap());
        assert!(!manager.verify("open-plan-lofts", &stored).await.unwrap());
        assert!(matches!(
            manager.hash("short").await,
            Err(AppError::Validation(_))
        ));
        manager.burn_decoy("open-plan-loft").await;
    }

    #[test]
    fn test_algorithm_names() {
        let algorithm: PasswordAlgorithm = serde_yaml::from_str("bcrypt").unwrap();
        assert_eq!(algorithm, PasswordAlgorithm::Bcrypt);
        let algorithm: PasswordAlgorithm = serde_yaml::from_str("argon2id").unwrap();
        assert_eq!(algorithm.to_string(), "argon2id");
    }
}
