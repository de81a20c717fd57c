// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
//! Token enrichment.
//!
//! Runs when a token is minted at sign-in and again every time a token is
//! decoded, so role and avatar changes in the directory reach live sessions
//! without a new sign-in.
use teamgate_common::{AuthorizedUser, TokenClaims};
use tracing::{debug, instrument};

use crate::directory::MemberDirectory;
use crate::error::AppError;

/// Attach identity fields to the token and refresh them from the directory.
///
/// `user` is only present on the sign-in path. A member missing from the
/// directory leaves the token as it was.
#[instrument(name = "enrich_token", skip_all, fields(sign_in = user.is_some()))]
pub async fn enrich_token(
    directory: &dyn MemberDirectory,
    mut claims: TokenClaims,
    user: Option<&AuthorizedUser>,
) -> Result<TokenClaims, AppError> {
    if let Some(user) = user {
        claims.id = Some(user.id.clone());
        claims.role = Some(user.role.clone());
        claims.picture = user.image.clone();
    }

    if let Some(email) = claims.email.as_deref().filter(|email| !email.is_empty()) {
        match directory.find_profile_by_email(email).await? {
            Some(profile) => {
                claims.id = Some(profile.id);
                claims.role = Some(profile.position);
                claims.picture = profile.avatar_url;
            },
            None => debug!("member not in directory, keeping token fields"),
        }
    }

    Ok(claims)
}
