//! Session cookie reading and writing on raw headers

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use chrono::Duration;

use crate::auth::{SessionToken, SESSION_COOKIE};

/// Value of the first cookie called `name` in the request headers.
pub fn read_cookie<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"'))
}

/// Session token carried by the request, if it has the right shape.
pub fn session_token(headers: &HeaderMap) -> Option<SessionToken> {
    read_cookie(headers, SESSION_COOKIE).and_then(SessionToken::from_cookie)
}

fn cookie_header(value: &str, max_age: i64, secure: bool) -> HeaderValue {
    let secure = if secure { "; Secure" } else { "" };
    let raw = format!(
        "{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}{secure}"
    );
    // Tokens are URL-safe base64, so the header is always visible ASCII
    HeaderValue::from_str(&raw).unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// `Set-Cookie` header that stores a fresh session.
pub fn set_session(token: &SessionToken, ttl: Duration, secure: bool) -> (HeaderName, HeaderValue) {
    (
        SET_COOKIE,
        cookie_header(token.as_str(), ttl.num_seconds(), secure),
    )
}

/// `Set-Cookie` header that removes the session cookie.
pub fn clear_session(secure: bool) -> (HeaderName, HeaderValue) {
    (SET_COOKIE, cookie_header("", 0, secure))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; mentallap_session=abc; other=1"),
        );
        assert_eq!(read_cookie(&headers, SESSION_COOKIE), Some("abc"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn malformed_token_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("mentallap_session=short"));
        assert!(session_token(&headers).is_none());
    }

    #[test]
    fn set_and_clear_attributes() {
        let token = SessionToken::generate();
        let (name, value) = set_session(&token, Duration::days(30), true);
        assert_eq!(name, SET_COOKIE);
        let value = value.to_str().unwrap();
        assert!(value.starts_with(&format!("mentallap_session={}", token.as_str())));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Max-Age=2592000"));
        assert!(value.ends_with("; Secure"));

        let (_, cleared) = clear_session(false);
        let cleared = cleared.to_str().unwrap();
        assert!(cleared.starts_with("mentallap_session=;"));
        assert!(cleared.contains("Max-Age=0"));
        assert!(!cleared.contains("Secure"));
    }
}
