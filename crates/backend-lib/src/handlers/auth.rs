// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! Sign-in, session and sign-out endpoints.
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, FromRequest, Request, State},
    http::{
        header::{CONTENT_TYPE, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    Extension, Form, Json,
};
use metrics::counter;
use teamgate_common::{
    Credentials, ProviderInfo, Session, SignInResponse, CREDENTIALS_PROVIDER_ID,
    CREDENTIALS_SIGNIN, PENDING_REVIEW,
};
use tracing::warn;

use super::client_ip;
use super::cookie::{clear_session_cookie, read_cookie, session_cookie};
use crate::auth::SignInOutcome;
use crate::error::AppError;
use crate::metrics::{SIGNIN_LOCKED_OUT, SIGNIN_NO_MATCH, SIGNIN_PENDING_REVIEW, SIGNIN_SUCCESS};
use crate::AppState;

/// Credentials from either a JSON or a URL-encoded form body
pub struct CredentialsBody(pub Credentials);

impl<S: Send + Sync> FromRequest<S> for CredentialsBody {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(credentials) = Json::<Credentials>::from_request(req, state)
                .await
                .map_err(|e| AppError::InvalidInput(e.body_text()))?;
            Ok(Self(credentials))
        } else {
            let Form(credentials) = Form::<Credentials>::from_request(req, state)
                .await
                .map_err(|e| AppError::InvalidInput(e.body_text()))?;
            Ok(Self(credentials))
        }
    }
}

/// `GET /api/auth/providers`
pub async fn providers(State(state): State<Arc<AppState>>) -> Json<HashMap<String, ProviderInfo>> {
    let provider = ProviderInfo {
        id: CREDENTIALS_PROVIDER_ID.to_string(),
        name: "Credentials".to_string(),
        kind: "credentials".to_string(),
        signin_url: state.settings.sign_in_page.clone(),
        callback_url: format!("/api/auth/callback/{CREDENTIALS_PROVIDER_ID}"),
    };
    Json(HashMap::from([(CREDENTIALS_PROVIDER_ID.to_string(), provider)]))
}

/// `POST /api/auth/callback/credentials`
pub async fn callback_credentials(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    CredentialsBody(credentials): CredentialsBody,
) -> Result<Response, AppError> {
    let ip = client_ip(&headers, peer, state.settings.trusted_proxy);
    if !state.auth_rate_limiter.check_rate_limit(ip) {
        counter!(SIGNIN_LOCKED_OUT).increment(1);
        warn!(%ip, "sign-in refused for locked out address");
        return Err(AppError::AuthRateLimited);
    }

    let settings = &state.settings;
    match state.auth.sign_in(&credentials).await? {
        SignInOutcome::SignedIn(active) => {
            state.auth_rate_limiter.record_success(ip);
            counter!(SIGNIN_SUCCESS).increment(1);

            let body = SignInResponse {
                url: settings.callback_url.clone(),
                error: None,
            };
            Ok((
                [(SET_COOKIE, session_cookie(settings, &active.token))],
                Json(body),
            )
                .into_response())
        },
        SignInOutcome::NoMatch => {
            state.auth_rate_limiter.record_failed_attempt(ip);
            counter!(SIGNIN_NO_MATCH).increment(1);
            Ok(sign_in_error(settings, StatusCode::UNAUTHORIZED, CREDENTIALS_SIGNIN))
        },
        // Password is never checked here, so it is not a failed guess
        SignInOutcome::PendingReview => {
            counter!(SIGNIN_PENDING_REVIEW).increment(1);
            Ok(sign_in_error(settings, StatusCode::FORBIDDEN, PENDING_REVIEW))
        },
    }
}

fn sign_in_error(settings: &crate::config::Settings, status: StatusCode, code: &str) -> Response {
    let body = SignInResponse {
        url: settings.sign_in_error_url(code),
        error: Some(code.to_string()),
    };
    (status, Json(body)).into_response()
}

/// `GET /api/auth/session`
///
/// Returns `{}` when there is no valid session. A valid session comes back
/// with a re-signed cookie.
pub async fn session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let settings = &state.settings;
    let Some(token) = read_cookie(&headers, &settings.cookie_name) else {
        return Ok(Json(serde_json::json!({})).into_response());
    };

    match state.auth.current_session(token).await? {
        Some(active) => Ok((
            [(SET_COOKIE, session_cookie(settings, &active.token))],
            Json(active.session),
        )
            .into_response()),
        None => Ok((
            [(SET_COOKIE, clear_session_cookie(settings))],
            Json(serde_json::json!({})),
        )
            .into_response()),
    }
}

/// `POST /api/auth/signout`
pub async fn signout(State(state): State<Arc<AppState>>) -> Response {
    let body = SignInResponse {
        url: state.settings.sign_in_page.clone(),
        error: None,
    };
    (
        [(SET_COOKIE, clear_session_cookie(&state.settings))],
        Json(body),
    )
        .into_response()
}

/// `GET /api/me`, behind the session guard
pub async fn me(Extension(session): Extension<Session>) -> Json<Session> {
    Json(session)
}
