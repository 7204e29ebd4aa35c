// handlers/protected/mod.rs - Page handlers behind the session guard
//
// Every route here runs after `session_guard_middleware`, which injects the
// validated `Authenticated` session into the request extensions.

pub mod actions;
pub mod home;

pub use actions::{nap_post, routine_toggle_post, vaccine_toggle_post};
pub use home::{home_get, logout_post, profile_post};
