use argon2::password_hash::{self, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version};

use super::PasswordHasher;
use crate::error::{AppError, AppResult};

/// Argon2id with the crate's default cost (m=19456 KiB, t=2, p=1)
pub struct Argon2idHasher {
    argon2: Argon2<'static>,
}

impl Argon2idHasher {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
        }
    }

    /// A parseable `$argon2id$` PHC string that carries both salt and hash
    pub fn recognizes(stored_hash: &str) -> bool {
        if !stored_hash.starts_with("$argon2id$") {
            return false;
        }
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => parsed.salt.is_some() && parsed.hash.is_some(),
            Err(_) => false,
        }
    }
}

impl Default for Argon2idHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2idHasher {
    fn hash(&self, password: &str) -> AppResult<String> {
        use argon2::PasswordHasher as _;

        let salt = SaltString::generate(&mut rand::thread_rng());
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("argon2id hashing failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, stored_hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| AppError::Internal(format!("Malformed argon2id hash: {}", e)))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::Internal(format!(
                "argon2id verification failed: {}",
                e
            ))),
        }
    }
}
