// ============================
// crates/backend-lib/src/auth/service.rs
// ============================
use async_trait::async_trait;
use teamgate_common::{Credentials, Session};

use crate::error::AppError;

/// A verified session together with its freshly signed token
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub session: Session,
    pub token: String,
}

/// Result of a sign-in attempt
#[derive(Debug, Clone)]
pub enum SignInOutcome {
    SignedIn(ActiveSession),
    NoMatch,
    PendingReview,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials and, on success, mint a signed session token.
    async fn sign_in(&self, credentials: &Credentials) -> Result<SignInOutcome, AppError>;

    /// Decode a session token, refresh it from the directory and re-sign it.
    /// Invalid or expired tokens give `Ok(None)`.
    async fn current_session(&self, token: &str) -> Result<Option<ActiveSession>, AppError>;
}
