use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// GET /api/health - Liveness check
///
/// Expected Output:
/// ```json
/// { "success": true, "data": { "status": "ok", "version": "0.1.0", "timestamp": "..." } }
/// ```
pub async fn health_get() -> ApiResult<Health> {
    Ok(ApiResponse::success(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now(),
    }))
}
