//! Session token middleware.
//!
//! Every request gets an opaque session token: either the one presented in
//! the `ssid` cookie, or a freshly issued uuid set on the response. The
//! token is a correlation key only, not an authenticated identity.

use axum::extract::Request;
use axum::http::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "ssid";

/// The caller's session token, inserted into request extensions by
/// [`issue_session_cookie`].
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

pub async fn issue_session_cookie(mut request: Request, next: Next) -> Response {
    let (token, issued) = match cookie_value(request.headers(), SESSION_COOKIE) {
        Some(token) => (token, false),
        None => (Uuid::new_v4().to_string(), true),
    };

    request.extensions_mut().insert(SessionToken(token.clone()));
    let mut response = next.run(request).await;

    if issued {
        debug!("issued new session token");
        let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    response
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_cookie_value_found() {
        let headers = headers_with_cookie("theme=dark; ssid=abc-123; lang=en");
        assert_eq!(
            cookie_value(&headers, SESSION_COOKIE),
            Some("abc-123".to_string())
        );
    }

    #[test]
    fn test_cookie_value_absent() {
        let headers = headers_with_cookie("theme=dark");
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), None);

        assert_eq!(cookie_value(&HeaderMap::new(), SESSION_COOKIE), None);
    }

    #[test]
    fn test_cookie_name_must_match_exactly() {
        let headers = headers_with_cookie("xssid=nope");
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), None);
    }
}
