//! # Crudstore Web
//!
//! Axum request gateway for the crudstore service: argument validation,
//! identity allocation, and error-to-status mapping around the projection
//! engine. The gateway holds no state beyond the long-lived engine handle;
//! every request is independent.
//!
//! # Request Flow
//!
//! 1. HTTP request arrives at an Axum handler
//! 2. Required fields are checked; a missing originator on create is
//!    synthesized (fresh UUID v4 at version `"1"`)
//! 3. The projection engine appends or replays against the event store
//! 4. Domain errors map onto statuses in exactly one place
//!    ([`error::AppError`])

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use state::AppState;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;

/// Assemble the gateway router.
///
/// Declared-but-unserved type-registry routes are mounted as `501` stubs so
/// the wire surface matches the contract.
#[must_use]
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/healtz", get(handlers::health::healtz))
        .route("/v1/crud/create", post(handlers::crud::create))
        .route("/v1/crud/update", post(handlers::crud::update))
        .route("/v1/crud/get", post(handlers::crud::get))
        .route("/v1/crud/delete", post(handlers::crud::delete))
        .route("/v1/crud/list", post(handlers::types::unimplemented_rpc))
        .route("/v1/types/register", post(handlers::types::unimplemented_rpc))
        .route("/v1/types/get", post(handlers::types::unimplemented_rpc))
        .route("/v1/types/update", post(handlers::types::unimplemented_rpc))
        .route("/v1/types/list", post(handlers::types::unimplemented_rpc))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}
