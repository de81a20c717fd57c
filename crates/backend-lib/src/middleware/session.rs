//! Session guard for protected routes.
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::SET_COOKIE, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::handlers::cookie::{read_cookie, session_cookie};
use crate::{error::AppError, AppState};

/// Require a valid session cookie.
///
/// The projected [`teamgate_common::Session`] is inserted into the request
/// extensions and the response carries the re-signed cookie. Requests
/// without a session are redirected to the sign-in page with a
/// `callbackUrl` pointing back at the requested path.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let settings = &state.settings;
    let token = read_cookie(request.headers(), &settings.cookie_name).map(str::to_owned);

    let active = match token {
        Some(token) => state.auth.current_session(&token).await?,
        None => None,
    };

    let Some(active) = active else {
        let path = request
            .uri()
            .path_and_query()
            .map_or("/", |pq| pq.as_str());
        let location = format!(
            "{}?callbackUrl={}",
            settings.sign_in_page,
            urlencoding::encode(path)
        );
        return Ok(Redirect::to(&location).into_response());
    };

    let cookie = HeaderValue::from_str(&session_cookie(settings, &active.token))
        .map_err(|e| AppError::Internal(format!("invalid cookie header: {e}")))?;
    request.extensions_mut().insert(active.session);

    let mut response = next.run(request).await;
    response.headers_mut().append(SET_COOKIE, cookie);
    Ok(response)
}
