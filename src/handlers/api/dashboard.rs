use axum::{extract::State, Extension};
use serde::Serialize;

use crate::app::AppState;
use crate::auth::{AuthUser, Authenticated};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{Activation, DashboardSummary, HomeState, SeedReport};

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub user: AuthUser,
    #[serde(flatten)]
    pub state: HomeState,
    pub summary: DashboardSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seeded: Option<SeedReport>,
}

/// GET /api/dashboard - Bootstrap the caller's data and return it
///
/// Seeds the default profile, vaccine schedule and today's routines when
/// they are missing, exactly like opening the main view.
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "data": {
///     "user": { "id": "...", "email": "ana@example.com" },
///     "profile": { "baby_name": "Meu Bebê", ... },
///     "naps": [], "vaccines": [...], "routines": [...],
///     "summary": { "vaccine_percent_display": 0, "sleep_today_label": "0.0h", ... },
///     "seeded": { "profile": { "status": "seeded", "detail": 1 }, ... }
///   }
/// }
/// ```
pub async fn dashboard_get(
    State(state): State<AppState>,
    Extension(session): Extension<Authenticated>,
) -> ApiResult<Dashboard> {
    let controller = match state.activate(Some(session)).await {
        Activation::Ready(controller) => controller,
        Activation::Login => return Err(ApiError::unauthorized("Session required")),
    };

    Ok(ApiResponse::success(Dashboard {
        user: controller.user().clone(),
        state: controller.state().clone(),
        summary: controller.summary(),
        seeded: controller.seed_report().cloned(),
    }))
}
