// ================
// common/src/lib.rs
// ================
//! Common types shared between the `teamgate` server and its clients.
//! This module defines the sign-in payloads, the signed token claims and the
//! session object handed to application code.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Error code returned when the credentials did not match any member.
pub const CREDENTIALS_SIGNIN: &str = "CredentialsSignin";

/// Error code returned when the member exists but is not approved yet.
/// Clients render an "account under review" message for this code.
pub const PENDING_REVIEW: &str = "PENDING_REVIEW";

/// Identifier of the only provider this server exposes.
pub const CREDENTIALS_PROVIDER_ID: &str = "credentials";

/// Email/password pair submitted by the sign-in form.
///
/// Missing fields deserialize as empty strings; the authenticator treats
/// both the same way. The password is wiped from memory on drop.
#[derive(Deserialize, Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Identity produced by a successful credential check.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedUser {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Taken from the member's position.
    pub role: String,
    /// Avatar URL, stored under the conventional `image` field.
    pub image: Option<String>,
}

/// Claims carried by the signed session token.
///
/// `name`, `email`, `picture`, `sub`, `iat`, `exp` and `jti` follow the usual
/// JWT session conventions; `id` and `role` are ours. Any other claim lands in
/// `extra` and is written back untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Avatar URL. Serialized as `null` when the member has none.
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub iat: i64,
    #[serde(default)]
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// User section of the session object.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub role: String,
}

/// Session object exposed to application code and returned by `/api/auth/session`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    /// RFC 3339 expiry timestamp.
    pub expires: String,
}

/// Entry of the `/api/auth/providers` listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub signin_url: String,
    pub callback_url: String,
}

/// Body returned by the sign-in endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SignInResponse {
    /// Where the client should navigate next.
    pub url: String,
    /// `None` on success, otherwise [`CREDENTIALS_SIGNIN`] or [`PENDING_REVIEW`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_missing_fields_default_to_empty() {
        let creds: Credentials = serde_json::from_str(r#"{"email":"a@b.c"}"#).unwrap();
        assert_eq!(creds.email, "a@b.c");
        assert!(creds.password.is_empty());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("a@b.c", "hunter2");
        let printed = format!("{creds:?}");
        assert!(printed.contains("a@b.c"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_claims_keep_unknown_fields() {
        let raw = r#"{"email":"a@b.c","picture":null,"iat":1,"exp":2,"aud":"web","custom":{"k":1}}"#;
        let claims: TokenClaims = serde_json::from_str(raw).unwrap();
        assert_eq!(claims.extra.get("aud"), Some(&Value::from("web")));

        let back = serde_json::to_value(&claims).unwrap();
        assert_eq!(back["custom"]["k"], 1);
        assert_eq!(back["aud"], "web");
        assert!(back["picture"].is_null());
    }

    #[test]
    fn test_session_without_user_serializes_expiry_only() {
        let session = Session {
            user: None,
            expires: "2030-01-01T00:00:00Z".to_string(),
        };
        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("user").is_none());
    }
}
