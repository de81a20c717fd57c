//! HTTP handlers.
pub mod auth;
pub mod cookie;

use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;

/// Address the sign-in throttle keys on.
///
/// The TCP peer, unless `trusted_proxy` is set, in which case `x-real-ip`
/// and then the first `x-forwarded-for` entry win over it.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, trusted_proxy: bool) -> IpAddr {
    if !trusted_proxy {
        return peer.ip();
    }

    headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .and_then(|ip| ip.trim().parse().ok())
        .or_else(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|list| list.split(',').next())
                .and_then(|ip| ip.trim().parse().ok())
        })
        .unwrap_or_else(|| peer.ip())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        SocketAddr::from(([172, 16, 0, 1], 40000))
    }

    #[test]
    fn test_headers_ignored_without_trusted_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("192.168.0.9"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.1.1.1"));
        assert_eq!(client_ip(&headers, peer(), false), peer().ip());
    }

    #[test]
    fn test_client_ip_sources_behind_proxy() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, peer(), true), peer().ip());

        headers.insert("x-forwarded-for", HeaderValue::from_static("10.1.1.1, 10.2.2.2"));
        assert_eq!(client_ip(&headers, peer(), true).to_string(), "10.1.1.1");

        headers.insert("x-real-ip", HeaderValue::from_static("192.168.0.9"));
        assert_eq!(client_ip(&headers, peer(), true).to_string(), "192.168.0.9");

        headers.insert("x-real-ip", HeaderValue::from_static("unknown"));
        assert_eq!(client_ip(&headers, peer(), true).to_string(), "10.1.1.1");
    }
}
