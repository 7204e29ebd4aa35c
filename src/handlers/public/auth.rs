use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::app::AppState;
use crate::auth::cookies::{session_cookie, session_max_age, session_token_from_headers, set_cookie_value};
use crate::auth::{AuthError, Session, SignUpOutcome};
use crate::error::ApiError;
use crate::services::{AuthMode, AuthView};
use crate::types::Route;
use crate::views::AuthPage;

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RecoverForm {
    pub email: String,
}

/// GET /auth - Sign-in form
pub async fn auth_get(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    show_form(&state, &headers, AuthMode::SignIn).await
}

/// GET /auth/sign-up - Sign-up form
pub async fn sign_up_get(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    show_form(&state, &headers, AuthMode::SignUp).await
}

/// GET /auth/recover - Password recovery form
pub async fn recover_get(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    show_form(&state, &headers, AuthMode::Recover).await
}

/// POST /auth/sign-in - Password sign-in; stores the session cookie
pub async fn sign_in_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, ApiError> {
    let mut view = mount(&state, &headers).await;
    if view.destination().is_some() {
        view.teardown();
        return Ok(Redirect::to(Route::Home.path()).into_response());
    }

    let result = view.sign_in(&form.email, &form.password).await;
    let response = match result {
        Ok(session) if view.destination().is_some() => signed_in(&state, &session),
        Ok(_) => Ok(Redirect::to(Route::Login.path()).into_response()),
        Err(e) => rejected(&state, AuthMode::SignIn, &form.email, e),
    };
    view.teardown();
    response
}

/// POST /auth/sign-up - Create an account. Signs in directly unless the
/// address has to be confirmed first.
pub async fn sign_up_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, ApiError> {
    let mut view = mount(&state, &headers).await;
    if view.destination().is_some() {
        view.teardown();
        return Ok(Redirect::to(Route::Home.path()).into_response());
    }

    let response = match view.sign_up(&form.email, &form.password).await {
        Ok(SignUpOutcome::SignedIn(session)) => signed_in(&state, &session),
        Ok(SignUpOutcome::ConfirmationRequired) => {
            info!("Sign-up awaiting email confirmation");
            let page = AuthPage::new(&state.catalog.auth, AuthMode::SignUp)
                .with_email(&form.email)
                .confirmed();
            Ok(Html(state.views.render_auth(&page)?).into_response())
        }
        Err(e) => rejected(&state, AuthMode::SignUp, &form.email, e),
    };
    view.teardown();
    response
}

/// POST /auth/recover - Send password recovery instructions
pub async fn recover_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RecoverForm>,
) -> Result<Response, ApiError> {
    let mut view = mount(&state, &headers).await;
    let response = match view.recover(&form.email).await {
        Ok(()) => {
            let page = AuthPage::new(&state.catalog.auth, AuthMode::Recover)
                .with_email(&form.email)
                .confirmed();
            Ok(Html(state.views.render_auth(&page)?).into_response())
        }
        Err(e) => rejected(&state, AuthMode::Recover, &form.email, e),
    };
    view.teardown();
    response
}

async fn mount(state: &AppState, headers: &HeaderMap) -> AuthView {
    let existing = session_token_from_headers(headers, &state.config.session.cookie_name);
    AuthView::mount(state.backend.auth.scoped(), existing.as_ref()).await
}

async fn show_form(state: &AppState, headers: &HeaderMap, mode: AuthMode) -> Result<Response, ApiError> {
    let mut view = mount(state, headers).await;
    let response = match view.destination() {
        Some(route) => Redirect::to(route.path()).into_response(),
        None => {
            let page = AuthPage::new(&state.catalog.auth, mode);
            Html(state.views.render_auth(&page)?).into_response()
        }
    };
    view.teardown();
    Ok(response)
}

fn signed_in(state: &AppState, session: &Session) -> Result<Response, ApiError> {
    let max_age = session_max_age(session, &state.config.session, state.backend.clock.now());
    let cookie = session_cookie(&state.config.session, &session.access_token, max_age);
    let value = set_cookie_value(&cookie).ok_or_else(|| {
        error!("Access token is not a valid cookie value");
        ApiError::internal_server_error("Could not store session")
    })?;
    Ok((
        AppendHeaders([(header::SET_COOKIE, value)]),
        Redirect::to(Route::Home.path()),
    )
        .into_response())
}

/// Re-render the form with the auth service's message
fn rejected(state: &AppState, mode: AuthMode, email: &str, err: AuthError) -> Result<Response, ApiError> {
    if !err.is_rejected() {
        warn!("Auth request failed: {}", err);
    }
    let page = AuthPage::new(&state.catalog.auth, mode)
        .with_email(email)
        .with_error(err.to_string());
    Ok(Html(state.views.render_auth(&page)?).into_response())
}
