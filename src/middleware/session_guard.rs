use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::app::AppState;
use crate::auth::cookies::session_token_from_headers;
use crate::types::Route;

/// What the guard does with one page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Assets and API calls are not gated
    PassThrough,
    Allow,
    RedirectToLogin,
    RedirectToHome,
}

pub fn is_unguarded_path(path: &str) -> bool {
    path.starts_with("/static/")
        || path.starts_with("/api/")
        || path == "/api"
        || path.starts_with("/_next/")
        || is_asset_name(path)
}

// Only the final segment counts, so `/vaccines/a.b/toggle` stays gated
fn is_asset_name(path: &str) -> bool {
    path.rsplit('/').next().is_some_and(|last| last.contains('.'))
}

pub fn is_login_path(path: &str) -> bool {
    let login = Route::Login.path();
    path == login || path.strip_prefix(login).is_some_and(|rest| rest.starts_with('/'))
}

pub fn decide(path: &str, authenticated: bool) -> GuardDecision {
    if is_unguarded_path(path) {
        return GuardDecision::PassThrough;
    }
    match (authenticated, is_login_path(path)) {
        (false, false) => GuardDecision::RedirectToLogin,
        (true, true) => GuardDecision::RedirectToHome,
        _ => GuardDecision::Allow,
    }
}

/// Gate every page on a session the auth API vouches for. On success the
/// identity is attached to the request as [`crate::auth::Authenticated`].
pub async fn session_guard_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let method = request.method().clone();
    if is_unguarded_path(&path) {
        return next.run(request).await;
    }

    let token = session_token_from_headers(request.headers(), &state.config.session.cookie_name);
    let session = match token {
        Some(token) => state.backend.auth.authenticate(token).await,
        None => None,
    };

    match decide(&path, session.is_some()) {
        GuardDecision::RedirectToLogin => {
            debug!(%path, "No session, redirecting to login");
            guard_redirect(&method, Route::Login)
        }
        GuardDecision::RedirectToHome => {
            debug!(%path, "Session present, redirecting home");
            guard_redirect(&method, Route::Home)
        }
        GuardDecision::PassThrough | GuardDecision::Allow => {
            if let Some(session) = session {
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
    }
}

/// 307 for reads, 303 for anything else so the browser follows with a GET
fn guard_redirect(method: &Method, route: Route) -> Response {
    let redirect = if method == Method::GET || method == Method::HEAD {
        Redirect::temporary(route.path())
    } else {
        Redirect::to(route.path())
    };
    let mut response = redirect.into_response();
    // Guard outcomes depend on the cookie, never cache them
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, header::HeaderValue::from_static("no-store"));
    response
}
