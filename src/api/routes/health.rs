//! Health Routes
//!
//! - GET /health/live - Liveness probe (process is alive)

use axum::http::StatusCode;

/// GET /health/live
///
/// Returns 200 if the process is alive. The service holds no local state,
/// so there is nothing more to probe without calling the upstreams.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
