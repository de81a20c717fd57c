// ============================
// crates/backend-lib/src/auth/codec.rs
// ============================
//! Signing and verification of session tokens (HS256 JWT).
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use teamgate_common::{AuthorizedUser, TokenClaims};

use crate::error::AppError;

/// Mints, signs and verifies session tokens
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    max_age: Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], max_age: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Audience is a pass-through claim here
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            max_age,
        }
    }

    /// Base claims for a freshly signed-in user
    pub fn mint(&self, user: &AuthorizedUser) -> TokenClaims {
        let mut claims = TokenClaims {
            name: Some(user.name.clone()),
            email: Some(user.email.clone()),
            picture: user.image.clone(),
            sub: Some(user.id.clone()),
            jti: Some(uuid::Uuid::new_v4().to_string()),
            ..TokenClaims::default()
        };
        self.refresh_expiry(&mut claims);
        claims
    }

    /// Restart the token lifetime from now
    pub fn refresh_expiry(&self, claims: &mut TokenClaims) {
        let now = Utc::now().timestamp();
        claims.iat = now;
        let max_age = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        claims.exp = now.saturating_add(max_age);
    }

    pub fn encode(&self, claims: &TokenClaims) -> Result<String, AppError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    /// Verify signature and expiry and return the claims
    pub fn decode(&self, token: &str) -> Result<TokenClaims, AppError> {
        Ok(decode::<TokenClaims>(token, &self.decoding, &self.validation)?.claims)
    }
}
