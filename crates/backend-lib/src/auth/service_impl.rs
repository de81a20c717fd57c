use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use teamgate_common::{Credentials, TokenClaims};
use tracing::{debug, info};

use super::{
    enrich_token, project_session, session_template, ActiveSession, AuthOutcome, AuthService,
    CredentialAuthenticator, SignInOutcome, TokenCodec,
};
use crate::directory::MemberDirectory;
use crate::error::AppError;
use crate::metrics::SESSION_REFRESH;

pub struct DefaultAuth {
    authenticator: CredentialAuthenticator,
    directory: Arc<dyn MemberDirectory>,
    codec: TokenCodec,
}

impl DefaultAuth {
    pub fn new(directory: Arc<dyn MemberDirectory>, codec: TokenCodec) -> Self {
        Self {
            authenticator: CredentialAuthenticator::new(directory.clone()),
            directory,
            codec,
        }
    }

    fn activate(&self, claims: &TokenClaims) -> Result<ActiveSession, AppError> {
        let token = self.codec.encode(claims)?;
        let expires = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AppError::Internal(format!("invalid expiry {}", claims.exp)))?;
        let session = project_session(session_template(claims, expires), claims);
        Ok(ActiveSession { session, token })
    }
}

#[async_trait]
impl AuthService for DefaultAuth {
    async fn sign_in(&self, credentials: &Credentials) -> Result<SignInOutcome, AppError> {
        let user = match self.authenticator.authorize(credentials).await? {
            AuthOutcome::Authorized(user) => user,
            AuthOutcome::NoMatch => return Ok(SignInOutcome::NoMatch),
            AuthOutcome::PendingReview => return Ok(SignInOutcome::PendingReview),
        };

        let claims = self.codec.mint(&user);
        let claims = enrich_token(self.directory.as_ref(), claims, Some(&user)).await?;
        info!(member_id = %user.id, "member signed in");

        Ok(SignInOutcome::SignedIn(self.activate(&claims)?))
    }

    async fn current_session(&self, token: &str) -> Result<Option<ActiveSession>, AppError> {
        let claims = match self.codec.decode(token) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(error = %err, "rejected session token");
                return Ok(None);
            },
        };

        let mut claims = enrich_token(self.directory.as_ref(), claims, None).await?;
        self.codec.refresh_expiry(&mut claims);
        counter!(SESSION_REFRESH).increment(1);

        Ok(Some(self.activate(&claims)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{AccessStatus, InMemoryDirectory, Member};
    use std::time::Duration;

    fn setup() -> (DefaultAuth, InMemoryDirectory) {
        let directory = InMemoryDirectory::with_members([
            Member {
                id: "42".to_string(),
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                password: Some("plain1".to_string()),
                access_status: AccessStatus::Approved,
                position: "editor".to_string(),
                avatar_url: Some("http://x/a.png".to_string()),
            },
            Member {
                id: "43".to_string(),
                name: "Bea".to_string(),
                email: "bea@example.com".to_string(),
                password: Some("plain2".to_string()),
                access_status: AccessStatus::Pending,
                position: "writer".to_string(),
                avatar_url: None,
            },
        ]);
        let codec = TokenCodec::new(b"service-test-secret", Duration::from_secs(3600));
        (DefaultAuth::new(Arc::new(directory.clone()), codec), directory)
    }

    async fn sign_in(auth: &DefaultAuth, email: &str, password: &str) -> ActiveSession {
        match auth
            .sign_in(&Credentials::new(email, password))
            .await
            .unwrap()
        {
            SignInOutcome::SignedIn(active) => active,
            other => panic!("expected sign-in, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sign_in_builds_session() {
        let (auth, _) = setup();
        let active = sign_in(&auth, "ana@example.com", "plain1").await;

        let user = active.session.user.unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.role, "editor");
        assert_eq!(user.image.as_deref(), Some("http://x/a.png"));
        assert_eq!(user.email.as_deref(), Some("ana@example.com"));
        assert!(!active.token.is_empty());
    }

    #[tokio::test]
    async fn test_sign_in_rejections() {
        let (auth, _) = setup();
        assert!(matches!(
            auth.sign_in(&Credentials::new("ana@example.com", "nope")).await.unwrap(),
            SignInOutcome::NoMatch
        ));
        assert!(matches!(
            auth.sign_in(&Credentials::new("bea@example.com", "plain2")).await.unwrap(),
            SignInOutcome::PendingReview
        ));
    }

    #[tokio::test]
    async fn test_current_session_reflects_directory_changes() {
        let (auth, directory) = setup();
        let active = sign_in(&auth, "ana@example.com", "plain1").await;

        let mut member = directory.remove("ana@example.com").unwrap();
        member.position = "admin".to_string();
        member.avatar_url = Some("http://x/new.png".to_string());
        directory.insert(member);

        let refreshed = auth.current_session(&active.token).await.unwrap().unwrap();
        let user = refreshed.session.user.unwrap();
        assert_eq!(user.role, "admin");
        assert_eq!(user.image.as_deref(), Some("http://x/new.png"));

        // The re-signed token carries the new values too
        let again = auth.current_session(&refreshed.token).await.unwrap().unwrap();
        assert_eq!(again.session.user.unwrap().role, "admin");
    }

    #[tokio::test]
    async fn test_deleted_member_keeps_token_values() {
        let (auth, directory) = setup();
        let active = sign_in(&auth, "ana@example.com", "plain1").await;
        directory.remove("ana@example.com");

        let refreshed = auth.current_session(&active.token).await.unwrap().unwrap();
        assert_eq!(refreshed.session.user.unwrap().role, "editor");
    }

    #[tokio::test]
    async fn test_garbage_token_is_no_session() {
        let (auth, directory) = setup();
        assert!(auth.current_session("garbage").await.unwrap().is_none());
        assert_eq!(directory.lookups(), 0);
    }
}
