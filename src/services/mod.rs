pub mod auth_view;
pub mod catalog;
pub mod home_controller;
pub mod metrics;
pub mod seed_service;

pub use auth_view::{AuthMode, AuthView};
pub use catalog::{Catalog, CatalogError};
pub use home_controller::{Activation, ControllerError, HomeController, HomeState};
pub use metrics::DashboardSummary;
pub use seed_service::{SeedOutcome, SeedReport, SeedService};
