//! CRUD request gateway.
//!
//! A thin translation layer: validate arguments, allocate identity where the
//! caller left it out, delegate to the projection engine, and map domain
//! errors onto HTTP statuses (the mapping itself lives in
//! [`crate::error::AppError`]).

use crate::WebResult;
use crate::state::AppState;
use axum::{Json, extract::State};
use crudstore_core::error::CrudError;
use crudstore_core::originator::Originator;
use serde::{Deserialize, Serialize};

/// `Create` request body.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    /// Entity type the event stream is tagged with.
    #[serde(default)]
    pub entity_type: String,
    /// Optional identity; synthesized when absent or empty.
    #[serde(default)]
    pub originator: Option<Originator>,
    /// Initial state as JSON text.
    #[serde(default)]
    pub payload: String,
}

/// `Create` response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateResponse {
    /// Identity of the created revision (version `"1"`).
    pub originator: Originator,
}

/// `Update` request body.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    /// Entity type the event stream is tagged with.
    #[serde(default)]
    pub entity_type: String,
    /// Identity handle; id and version are both required.
    #[serde(default)]
    pub originator: Option<Originator>,
    /// Desired full state as JSON text; the gateway stores only the delta.
    #[serde(default)]
    pub payload: String,
}

/// `Update` response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateResponse {
    /// Identity of the new revision.
    pub originator: Originator,
}

/// `Get` request body.
#[derive(Debug, Deserialize)]
pub struct GetRequest {
    /// Entity type (accepted for API symmetry; not enforced).
    #[serde(default)]
    pub entity_type: String,
    /// Identity to read; version empty means latest.
    #[serde(default)]
    pub originator: Option<Originator>,
    /// When true, a tombstoned entity reads back its pre-deletion state.
    #[serde(default)]
    pub deleted: bool,
}

/// `Get` response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetResponse {
    /// Latest identity seen in the stream.
    pub originator: Originator,
    /// Reconstructed state as JSON text.
    pub payload: String,
}

/// `Delete` request body.
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    /// Entity type the tombstone is tagged with.
    #[serde(default)]
    pub entity_type: String,
    /// Identity to delete; version is resolved from the stream.
    #[serde(default)]
    pub originator: Option<Originator>,
}

/// `Delete` response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Identity of the tombstone revision.
    pub originator: Originator,
}

/// `POST /v1/crud/create`
///
/// # Errors
///
/// `INVALID_ARGUMENT` for missing fields or a bad originator;
/// `FAILED_PRECONDITION` when the identity already exists.
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateRequest>,
) -> WebResult<Json<CreateResponse>> {
    if request.entity_type.is_empty() {
        return Err(CrudError::InvalidArgument("missing entity_type param".to_string()).into());
    }
    if request.payload.is_empty() {
        return Err(CrudError::InvalidArgument("missing payload".to_string()).into());
    }

    let originator = match request.originator {
        Some(originator) if !(originator.id.is_empty() && originator.version.is_empty()) => {
            originator
        }
        _ => Originator::synthesize(),
    };
    originator.validate()?;

    let created = state
        .crud
        .create(&request.entity_type, originator, &request.payload)
        .await?;

    Ok(Json(CreateResponse {
        originator: created,
    }))
}

/// `POST /v1/crud/update`
///
/// # Errors
///
/// `INVALID_ARGUMENT` for missing fields or an empty diff; `NOT_FOUND` for
/// unknown or deleted entities; `FAILED_PRECONDITION` on a lost append race.
pub async fn update(
    State(state): State<AppState>,
    Json(request): Json<UpdateRequest>,
) -> WebResult<Json<UpdateResponse>> {
    if request.entity_type.is_empty() {
        return Err(CrudError::InvalidArgument("missing entity_type param".to_string()).into());
    }
    if request.payload.is_empty() {
        return Err(CrudError::InvalidArgument("missing payload".to_string()).into());
    }
    let Some(originator) = request.originator else {
        return Err(CrudError::InvalidArgument("missing originator".to_string()).into());
    };
    if originator.id.is_empty() || originator.version.is_empty() {
        return Err(CrudError::InvalidArgument(
            "originator has to have id and version on update".to_string(),
        )
        .into());
    }
    originator.validate()?;

    let updated = state
        .crud
        .update(&request.entity_type, &originator, &request.payload)
        .await?;

    Ok(Json(UpdateResponse {
        originator: updated,
    }))
}

/// `POST /v1/crud/get`
///
/// # Errors
///
/// `INVALID_ARGUMENT` for missing fields; `NOT_FOUND` for unknown entities or
/// tombstones read without `deleted`.
pub async fn get(
    State(state): State<AppState>,
    Json(request): Json<GetRequest>,
) -> WebResult<Json<GetResponse>> {
    let Some(originator) = request.originator.filter(|o| !o.id.is_empty()) else {
        return Err(CrudError::InvalidArgument("missing originator.id".to_string()).into());
    };
    originator.validate()?;
    if request.entity_type.is_empty() {
        return Err(CrudError::InvalidArgument("missing entity_type".to_string()).into());
    }

    let (state_value, latest) = state
        .crud
        .get(&request.entity_type, &originator, request.deleted)
        .await?;

    let payload = serde_json::to_string(&state_value)
        .map_err(|e| CrudError::Internal(anyhow::Error::new(e)))?;

    Ok(Json(GetResponse {
        originator: latest,
        payload,
    }))
}

/// `POST /v1/crud/delete`
///
/// # Errors
///
/// `INVALID_ARGUMENT` for missing fields; `NOT_FOUND` for unknown or
/// already-deleted entities.
pub async fn delete(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> WebResult<Json<DeleteResponse>> {
    let Some(originator) = request.originator.filter(|o| !o.id.is_empty()) else {
        return Err(CrudError::InvalidArgument("missing originator.id".to_string()).into());
    };
    originator.validate()?;
    if request.entity_type.is_empty() {
        return Err(CrudError::InvalidArgument("missing entity_type".to_string()).into());
    }

    let deleted = state
        .crud
        .delete(&request.entity_type, &originator)
        .await?;

    Ok(Json(DeleteResponse {
        originator: deleted,
    }))
}
