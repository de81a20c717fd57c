// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the `teamgate` server.

pub mod session;

pub use session::require_session;
