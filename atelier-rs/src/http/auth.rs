use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use tracing::{debug, warn};

use crate::db::Role;

use super::error::ApiError;
use super::state::{AppState, Session};

pub const SESSION_COOKIE: &str = "atelier_session";

/// Token from a `Bearer` authorization header, falling back to the session
/// cookie.
pub fn session_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    bearer_token(headers).or_else(|| {
        jar.get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
    })
}

/// The session presented by this request, if any. Identity is resolved per
/// call; nothing is shared between requests beyond the token store itself.
pub fn current_session(state: &AppState, headers: &HeaderMap, jar: &CookieJar) -> Option<Session> {
    let token = session_token(headers, jar)?;
    state.sessions.get(&token)
}

/// Gate for admin-only routes.
pub fn ensure_admin(
    state: &AppState,
    headers: &HeaderMap,
    jar: &CookieJar,
) -> Result<Session, ApiError> {
    match current_session(state, headers, jar) {
        Some(session) if session.role == Role::Admin => {
            debug!(username = %session.username, "authorized admin request");
            Ok(session)
        }
        Some(session) => {
            warn!(username = %session.username, "non-admin request to admin route");
            Err(ApiError::Forbidden)
        }
        None => {
            warn!("unauthenticated request to admin route");
            Err(ApiError::Forbidden)
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?;
    let mut parts = raw.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if !scheme.eq_ignore_ascii_case("bearer") || parts.next().is_some() {
        return None;
    }
    Some(token.to_string())
}
