//! Type-registry endpoints.
//!
//! Declared in the wire contract but not served by this gateway; every route
//! answers `501 UNIMPLEMENTED`.

use crate::error::AppError;

/// Stub handler for the declared-but-unserved type-registry RPCs.
#[allow(clippy::unused_async)]
pub async fn unimplemented_rpc() -> AppError {
    AppError::unimplemented("type registry is not served by this gateway")
}
