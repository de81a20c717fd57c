// ============================
// teamgate-backend/src/lib.rs
// ============================
//! Credential authentication and session service for the team member directory.

pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;

use std::sync::Arc;

use crate::auth::{AuthRateLimiter, AuthService, DefaultAuth, TokenCodec};
use crate::config::Settings;
use crate::directory::MemberDirectory;
use crate::error::AppError;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Settings
    pub settings: Arc<Settings>,
    /// Failed sign-in throttling
    pub auth_rate_limiter: Arc<AuthRateLimiter>,
}

impl AppState {
    /// Create a new application state
    pub fn new(directory: Arc<dyn MemberDirectory>, settings: Settings) -> Result<Self, AppError> {
        settings.validate()?;

        let secret = settings.signing_secret()?;
        let codec = TokenCodec::new(secret.as_bytes(), settings.session_max_age());
        let auth = Arc::new(DefaultAuth::new(directory, codec));
        let auth_rate_limiter = Arc::new(AuthRateLimiter::from_settings(&settings.rate_limit));

        Ok(Self {
            auth,
            settings: Arc::new(settings),
            auth_rate_limiter,
        })
    }
}
