//! Session cookie helpers.
use axum::http::{header::COOKIE, HeaderMap};

use crate::config::Settings;

/// Value of the named cookie from the request's `Cookie` headers
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(settings: &Settings, token: &str) -> String {
    build_cookie(settings, token, settings.session_max_age_secs)
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(settings: &Settings) -> String {
    build_cookie(settings, "", 0)
}

fn build_cookie(settings: &Settings, value: &str, max_age: u64) -> String {
    let mut cookie = format!(
        "{}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
        settings.cookie_name
    );
    if settings.secure_cookies {
        cookie.push_str("; Secure");
    }
    cookie
}
