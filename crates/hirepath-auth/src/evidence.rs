//! Session evidence extraction from request headers.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;

/// Default name of the session cookie set at sign-in.
pub const DEFAULT_SESSION_COOKIE: &str = "hp-access-token";

/// Pull the session token out of a request.
///
/// `Authorization: Bearer` wins over the cookie so API clients can
/// override a stale browser session.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    let jar = CookieJar::from_headers(headers);
    jar.get(cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("hp-access-token=def"),
        );
        assert_eq!(
            extract_token(&headers, DEFAULT_SESSION_COOKIE).as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn cookie_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("other=x; hp-access-token=def"),
        );
        assert_eq!(
            extract_token(&headers, DEFAULT_SESSION_COOKIE).as_deref(),
            Some("def")
        );
    }

    #[test]
    fn no_evidence_is_none() {
        let headers = HeaderMap::new();
        assert_eq!(extract_token(&headers, DEFAULT_SESSION_COOKIE), None);
    }

    #[test]
    fn malformed_authorization_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_token(&headers, DEFAULT_SESSION_COOKIE), None);
    }
}
