use axum::{
    extract::{Query, State},
    http::header,
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::app::AppState;
use crate::auth::cookies::{expired_cookie, set_cookie_value};
use crate::auth::Authenticated;
use crate::database::models::ProfileUpdate;
use crate::error::ApiError;
use crate::handlers::back_to;
use crate::services::Activation;
use crate::types::{Route, Tab};
use crate::views::HomePage;

#[derive(Debug, Default, Deserialize)]
pub struct TabQuery {
    pub tab: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub baby_name: String,
    #[serde(default)]
    pub baby_birth_date: String,
}

impl ProfileForm {
    /// Blank inputs leave the stored value untouched
    fn into_update(self) -> Result<ProfileUpdate, String> {
        let text = |v: String| {
            let v = v.trim().to_string();
            (!v.is_empty()).then_some(v)
        };
        let baby_birth_date = match self.baby_birth_date.trim() {
            "" => None,
            raw => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| format!("Invalid birth date: {}", raw))?,
            ),
        };
        Ok(ProfileUpdate {
            full_name: text(self.full_name),
            baby_name: text(self.baby_name),
            baby_birth_date,
            updated_at: None,
        })
    }
}

/// GET / - Main view: bootstraps the session's data and renders the
/// selected tab (`?tab=routine|activities|sleep|vaccines`)
pub async fn home_get(
    State(state): State<AppState>,
    session: Option<Extension<Authenticated>>,
    Query(query): Query<TabQuery>,
) -> Result<Response, ApiError> {
    let session = session.map(|Extension(session)| session);
    let controller = match state.activate(session).await {
        Activation::Login => return Ok(Redirect::to(Route::Login.path()).into_response()),
        Activation::Ready(controller) => controller,
    };

    let page = HomePage::build(&controller, Tab::parse(query.tab.as_deref()));
    Ok(Html(state.views.render_home(&page)?).into_response())
}

/// POST /profile - Edit the caregiver and baby details
pub async fn profile_post(
    State(state): State<AppState>,
    Extension(session): Extension<Authenticated>,
    Form(form): Form<ProfileForm>,
) -> Redirect {
    let update = match form.into_update() {
        Ok(update) => update,
        Err(message) => {
            warn!("Rejected profile edit: {}", message);
            return back_to(Tab::Dashboard);
        }
    };

    let mut controller = state.attach(session);
    if let Err(e) = controller.update_profile(update).await {
        warn!("Profile update failed: {}", e);
    }
    back_to(Tab::Dashboard)
}

/// POST /logout - End the session and clear the cookie
pub async fn logout_post(
    State(state): State<AppState>,
    Extension(session): Extension<Authenticated>,
) -> Result<Response, ApiError> {
    state.backend.auth.sign_out(&session.token).await;
    info!("User {} signed out", session.user.id);

    let cleared = expired_cookie(&state.config.session);
    let value = set_cookie_value(&cleared)
        .ok_or_else(|| ApiError::internal_server_error("Could not clear session"))?;
    Ok((
        AppendHeaders([(header::SET_COOKIE, value)]),
        Redirect::to(Route::Login.path()),
    )
        .into_response())
}
