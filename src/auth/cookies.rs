use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{DateTime, Utc};
use cookie::time::Duration;
use cookie::{Cookie, SameSite};

use super::{AccessToken, Session, TokenClaims};
use crate::config::SessionConfig;

/// Access token from the session cookie, if one is present and non-empty
pub fn session_token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<AccessToken> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw.to_string()))
        .filter_map(Result::ok)
        .find(|c| c.name() == cookie_name && !c.value().trim().is_empty())
        .map(|c| AccessToken::new(c.value()))
}

/// Lifetime of the cookie for `session`: token expiry first, then the
/// reported `expires_in`, then the configured default.
pub fn session_max_age(session: &Session, config: &SessionConfig, now: DateTime<Utc>) -> i64 {
    TokenClaims::peek(&session.access_token)
        .and_then(|claims| claims.remaining_secs(now))
        .or(session.expires_in.filter(|secs| *secs > 0))
        .unwrap_or(config.default_max_age_secs)
}

pub fn session_cookie(config: &SessionConfig, token: &AccessToken, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token.as_str().to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookie)
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

pub fn expired_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), String::new()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookie)
        .max_age(Duration::ZERO)
        .build()
}

pub fn set_cookie_value(cookie: &Cookie<'_>) -> Option<HeaderValue> {
    HeaderValue::from_str(&cookie.to_string()).ok()
}
