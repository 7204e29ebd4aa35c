use axum::{
    extract::{Path, State},
    Extension,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::Authenticated;
use crate::database::models::{Nap, Routine, Vaccine};
use crate::middleware::{ApiResponse, ApiResult};

/// POST /api/naps - Record a 90 minute nap ending now
///
/// Returns the created row with status 201.
pub async fn nap_post(State(state): State<AppState>, Extension(session): Extension<Authenticated>) -> ApiResult<Nap> {
    let nap = state.attach(session).add_nap().await?;
    Ok(ApiResponse::created(nap))
}

/// POST /api/vaccines/:id/toggle - Flip completion; sets or clears the
/// completion date
pub async fn vaccine_toggle_post(
    State(state): State<AppState>,
    Extension(session): Extension<Authenticated>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vaccine> {
    let vaccine = state.attach(session).toggle_vaccine(id).await?;
    Ok(ApiResponse::success(vaccine))
}

/// POST /api/routines/:id/toggle
pub async fn routine_toggle_post(
    State(state): State<AppState>,
    Extension(session): Extension<Authenticated>,
    Path(id): Path<Uuid>,
) -> ApiResult<Routine> {
    let routine = state.attach(session).toggle_routine(id).await?;
    Ok(ApiResponse::success(routine))
}
