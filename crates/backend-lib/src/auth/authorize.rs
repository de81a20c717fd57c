// ============================
// crates/backend-lib/src/auth/authorize.rs
// ============================
//! Credential check against the member directory.
use std::sync::Arc;

use teamgate_common::{AuthorizedUser, Credentials};
use tracing::{debug, instrument, warn};

use super::password::StoredPassword;
use crate::directory::{AccessStatus, MemberDirectory};
use crate::error::AppError;

/// Result of a credential check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The credentials belong to an approved member
    Authorized(AuthorizedUser),
    /// Unknown email, missing password or wrong password. The three cases
    /// are indistinguishable to the caller.
    NoMatch,
    /// The member exists but has not been approved
    PendingReview,
}

/// Checks email/password pairs against the member directory
#[derive(Clone)]
pub struct CredentialAuthenticator {
    directory: Arc<dyn MemberDirectory>,
}

impl CredentialAuthenticator {
    pub fn new(directory: Arc<dyn MemberDirectory>) -> Self {
        Self { directory }
    }

    /// Check the credentials.
    ///
    /// Empty inputs fail without touching the directory. Otherwise the
    /// directory is read exactly once; its errors propagate.
    #[instrument(name = "authorize", skip_all, fields(email = %credentials.email))]
    pub async fn authorize(&self, credentials: &Credentials) -> Result<AuthOutcome, AppError> {
        if credentials.email.is_empty() || credentials.password.is_empty() {
            return Ok(AuthOutcome::NoMatch);
        }

        let Some(member) = self.directory.find_by_email(&credentials.email).await? else {
            debug!("no member with this email");
            return Ok(AuthOutcome::NoMatch);
        };
        let Some(stored) = member.password.as_deref() else {
            debug!("member has no stored password");
            return Ok(AuthOutcome::NoMatch);
        };

        if member.access_status != AccessStatus::Approved {
            debug!(status = ?member.access_status, "member not approved");
            return Ok(AuthOutcome::PendingReview);
        }

        let stored = StoredPassword::classify(stored);
        if !stored.verify(&credentials.password).await? {
            return Ok(AuthOutcome::NoMatch);
        }

        if !stored.is_hashed() {
            warn!(member_id = %member.id, "signed in against a plaintext password record");
        }

        Ok(AuthOutcome::Authorized(AuthorizedUser {
            id: member.id,
            name: member.name,
            email: member.email,
            role: member.position,
            image: member.avatar_url,
        }))
    }
}
