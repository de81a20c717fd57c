// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const SIGNIN_SUCCESS: &str = "auth.signin.success";
pub const SIGNIN_NO_MATCH: &str = "auth.signin.no_match";
pub const SIGNIN_PENDING_REVIEW: &str = "auth.signin.pending_review";
pub const SIGNIN_LOCKED_OUT: &str = "auth.signin.locked_out";
pub const SESSION_REFRESH: &str = "auth.session.refresh";
