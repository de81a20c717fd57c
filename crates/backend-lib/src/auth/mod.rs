// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.
mod authorize;
pub mod codec;
pub mod password;
pub mod rate_limit;
mod service;
mod service_impl;
pub mod session;
pub mod token;
pub mod token_generator;

pub use authorize::{AuthOutcome, CredentialAuthenticator};
pub use codec::TokenCodec;
pub use password::{hash_password_secure, hash_password_with_cost, StoredPassword};
pub use rate_limit::AuthRateLimiter;
pub use service::{ActiveSession, AuthService, SignInOutcome};
pub use service_impl::DefaultAuth;
pub use session::{project_session, session_template};
pub use token::enrich_token;
