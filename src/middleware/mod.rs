pub mod auth;
pub mod response;
pub mod session_guard;

pub use auth::bearer_auth_middleware;
pub use response::{ApiResponse, ApiResult};
pub use session_guard::{session_guard_middleware, GuardDecision};
