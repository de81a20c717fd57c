// ============================
// crates/backend-lib/src/auth/session.rs
// ============================
//! Session object handed to application code.
use chrono::{DateTime, SecondsFormat, Utc};
use teamgate_common::{Session, SessionUser, TokenClaims};

/// Default session built from the standard claims, before projection
pub fn session_template(claims: &TokenClaims, expires: DateTime<Utc>) -> Session {
    Session {
        user: Some(SessionUser {
            id: String::new(),
            name: claims.name.clone(),
            email: claims.email.clone(),
            image: claims.picture.clone(),
            role: String::new(),
        }),
        expires: expires.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Copy identity fields from the token onto the session user.
///
/// `id` and `role` default to empty strings. The image comes from the token
/// picture, falling back to whatever the session already had. Sessions
/// without a user are returned untouched.
pub fn project_session(mut session: Session, claims: &TokenClaims) -> Session {
    if let Some(user) = session.user.as_mut() {
        user.id = claims.id.clone().unwrap_or_default();
        user.role = claims.role.clone().unwrap_or_default();
        if claims.picture.is_some() {
            user.image = claims.picture.clone();
        }
    }
    session
}
