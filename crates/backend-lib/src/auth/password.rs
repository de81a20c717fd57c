// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use zeroize::{Zeroize, Zeroizing};

use crate::error::AppError;

pub use bcrypt::DEFAULT_COST;

/// Prefix shared by every bcrypt hash variant (`$2a$`, `$2b$`, `$2y$`)
pub const BCRYPT_MARKER: &str = "$2";

/// A stored password value, classified by its format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredPassword<'a> {
    /// A bcrypt hash
    Hashed(&'a str),
    /// A legacy record stored as plaintext. Compared with `==`, not in
    /// constant time; migrate these records to hashes.
    Plaintext(&'a str),
}

impl<'a> StoredPassword<'a> {
    /// Classify a stored value by its bcrypt marker
    pub fn classify(stored: &'a str) -> Self {
        if stored.starts_with(BCRYPT_MARKER) {
            StoredPassword::Hashed(stored)
        } else {
            StoredPassword::Plaintext(stored)
        }
    }

    /// Check a candidate password against the stored value.
    ///
    /// bcrypt runs on the blocking pool. A malformed hash is an error, not a
    /// mismatch.
    pub async fn verify(&self, candidate: &str) -> Result<bool, AppError> {
        match *self {
            StoredPassword::Hashed(hash) => {
                let hash = hash.to_owned();
                let candidate = Zeroizing::new(candidate.to_owned());
                let matched = tokio::task::spawn_blocking(move || {
                    bcrypt::verify(candidate.as_bytes(), &hash)
                })
                .await??;
                Ok(matched)
            },
            StoredPassword::Plaintext(stored) => Ok(candidate == stored),
        }
    }

    pub fn is_hashed(&self) -> bool {
        matches!(self, StoredPassword::Hashed(_))
    }
}

/// Hash a password using bcrypt at the given cost
pub fn hash_password_with_cost(plain: &str, cost: u32) -> Result<String, AppError> {
    Ok(bcrypt::hash(plain, cost)?)
}

/// Securely hash a password and zeroize the original
pub fn hash_password_secure(plain: &mut String, cost: u32) -> Result<String, AppError> {
    let hash = hash_password_with_cost(plain, cost);
    plain.zeroize();
    hash
}
