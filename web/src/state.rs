//! Application state shared across HTTP handlers.

use crudstore_engine::CrudStore;

/// State handed to every handler: the projection engine over the shared
/// event-store handle. Cheap to clone; no per-request state.
#[derive(Clone)]
pub struct AppState {
    /// The CRUD projection engine.
    pub crud: CrudStore,
}

impl AppState {
    /// Create the application state.
    #[must_use]
    pub const fn new(crud: CrudStore) -> Self {
        Self { crud }
    }
}
