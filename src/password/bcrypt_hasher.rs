use super::PasswordHasher;
use crate::error::{AppError, AppResult};

const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];
const BCRYPT_HASH_LEN: usize = 60;

/// bcrypt at `bcrypt::DEFAULT_COST`; all four modular-crypt prefixes verify
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn recognizes(stored_hash: &str) -> bool {
        stored_hash.len() == BCRYPT_HASH_LEN
            && BCRYPT_PREFIXES
                .iter()
                .any(|prefix| stored_hash.starts_with(prefix))
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> AppResult<String> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("bcrypt hashing failed: {}", e)))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> AppResult<bool> {
        bcrypt::verify(password, stored_hash)
            .map_err(|e| AppError::Internal(format!("bcrypt verification failed: {}", e)))
    }
}
