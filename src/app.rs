//! Application state and router assembly.

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use thiserror::Error;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::auth::Authenticated;
use crate::backend::Backend;
use crate::config::AppConfig;
use crate::handlers::{api, protected, public};
use crate::middleware::{bearer_auth_middleware, session_guard_middleware};
use crate::services::{Activation, Catalog, CatalogError, HomeController};
use crate::views::{ViewError, Views};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Template error: {0}")]
    Views(#[from] ViewError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Shared, read-only state handed to every handler. Per-session data never
/// lives here; handlers build a `HomeController` per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: Backend,
    pub catalog: Arc<Catalog>,
    pub views: Arc<Views>,
}

impl AppState {
    pub fn new(config: AppConfig, backend: Backend, catalog: Catalog) -> Result<Self, StartupError> {
        Ok(Self {
            config: Arc::new(config),
            backend,
            catalog: Arc::new(catalog),
            views: Arc::new(Views::new()?),
        })
    }

    /// Wire the hosted backend and load the catalog named by `config`
    pub fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        let backend = Backend::connect(&config.backend)?;
        let catalog = Catalog::load(config.dashboard.catalog_path.as_deref())?;
        Self::new(config, backend, catalog)
    }

    pub async fn activate(&self, session: Option<Authenticated>) -> Activation {
        HomeController::activate(
            &self.backend,
            self.catalog.clone(),
            self.config.dashboard.recent_naps_limit,
            session,
        )
        .await
    }

    pub fn attach(&self, session: Authenticated) -> HomeController {
        HomeController::attach(
            &self.backend,
            self.catalog.clone(),
            self.config.dashboard.recent_naps_limit,
            session,
        )
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/dashboard", get(api::dashboard_get))
        .route("/naps", post(api::nap_post))
        .route("/vaccines/:id/toggle", post(api::vaccine_toggle_post))
        .route("/routines/:id/toggle", post(api::routine_toggle_post))
        .route_layer(from_fn_with_state(state.clone(), bearer_auth_middleware))
        .route("/health", get(public::health_get));

    let pages = Router::new()
        // Login view
        .route("/auth", get(public::auth_get))
        .route("/auth/sign-in", get(public::auth_get).post(public::sign_in_post))
        .route("/auth/sign-up", get(public::sign_up_get).post(public::sign_up_post))
        .route("/auth/recover", get(public::recover_get).post(public::recover_post))
        // Main view and its form posts
        .route("/", get(protected::home_get))
        .route("/profile", post(protected::profile_post))
        .route("/logout", post(protected::logout_post))
        .route("/naps", post(protected::nap_post))
        .route("/vaccines/:id/toggle", post(protected::vaccine_toggle_post))
        .route("/routines/:id/toggle", post(protected::routine_toggle_post));

    let app = Router::new()
        .merge(pages)
        .nest("/api", api)
        .nest_service("/static", ServeDir::new(&state.config.server.static_dir))
        .layer(from_fn_with_state(state.clone(), session_guard_middleware));

    let app = if state.config.server.enable_request_logging {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    };

    app.with_state(state)
}
