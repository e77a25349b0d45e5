use std::sync::Arc;

use actix::Addr;

use crate::domain::content::ContentCatalog;
use crate::ws::SessionCoordinator;

/// Shared handles for HTTP handlers and websocket sessions.
#[derive(Clone)]
pub struct AppState {
    /// The single serialized owner of the game session.
    pub coordinator: Addr<SessionCoordinator>,
    /// Read-only location packs, also held by the engine.
    pub catalog: Arc<ContentCatalog>,
}

impl AppState {
    pub fn new(coordinator: Addr<SessionCoordinator>, catalog: Arc<ContentCatalog>) -> Self {
        Self {
            coordinator,
            catalog,
        }
    }
}
