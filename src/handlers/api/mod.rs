// handlers/api/mod.rs - JSON API (bearer token required)
//
// The same operations the pages offer, for scripted clients such as the
// command-line tool. Routes are wrapped in `bearer_auth_middleware`.

pub mod actions;
pub mod dashboard;

pub use actions::{nap_post, routine_toggle_post, vaccine_toggle_post};
pub use dashboard::dashboard_get;
