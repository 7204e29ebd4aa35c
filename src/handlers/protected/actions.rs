// handlers/protected/actions.rs - Form posts from the main view
//
// Each action writes through a controller attached to the caller's
// session and answers with a 303 back to the tab that issued it. Failures
// are logged by the controller; the page simply shows unchanged data.

use axum::{
    extract::{Path, State},
    response::Redirect,
    Extension,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::Authenticated;
use crate::handlers::back_to;
use crate::types::Tab;

/// POST /naps - Record a 90 minute nap ending now
pub async fn nap_post(State(state): State<AppState>, Extension(session): Extension<Authenticated>) -> Redirect {
    let mut controller = state.attach(session);
    let _ = controller.add_nap().await;
    back_to(Tab::Sleep)
}

/// POST /vaccines/:id/toggle
pub async fn vaccine_toggle_post(
    State(state): State<AppState>,
    Extension(session): Extension<Authenticated>,
    Path(id): Path<Uuid>,
) -> Redirect {
    let mut controller = state.attach(session);
    let _ = controller.toggle_vaccine(id).await;
    back_to(Tab::Vaccines)
}

/// POST /routines/:id/toggle
pub async fn routine_toggle_post(
    State(state): State<AppState>,
    Extension(session): Extension<Authenticated>,
    Path(id): Path<Uuid>,
) -> Redirect {
    let mut controller = state.attach(session);
    let _ = controller.toggle_routine(id).await;
    back_to(Tab::Routine)
}
