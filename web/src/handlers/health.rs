//! Health check endpoint.

use axum::Json;
use serde::{Deserialize, Serialize};

/// `Healtz` response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Empty on success.
    #[serde(default)]
    pub message: String,
}

/// `GET /healtz`
///
/// Liveness only: returns 200 without touching the backends.
#[allow(clippy::unused_async)]
pub async fn healtz() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: String::new(),
    })
}
