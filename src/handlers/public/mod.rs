// handlers/public/mod.rs - Public handlers (no session required)
//
// The auth page and its form posts, plus the liveness check.

pub mod auth;
pub mod health;

pub use auth::{auth_get, recover_get, recover_post, sign_in_post, sign_up_get, sign_up_post};
pub use health::health_get;
