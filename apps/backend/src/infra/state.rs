use std::path::PathBuf;
use std::sync::Arc;

use actix::Actor;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::info;

use crate::config::game::{EngineSettings, GameConfig};
use crate::config::server::ServerConfig;
use crate::domain::content::ContentCatalog;
use crate::error::AppError;
use crate::services::game_flow::GameFlow;
use crate::state::app_state::AppState;
use crate::ws::SessionCoordinator;

/// Builder for [`AppState`] (used in both tests and main).
///
/// `build` starts the coordinator actor, so it must run inside an actix
/// system.
#[derive(Default)]
pub struct StateBuilder {
    config: GameConfig,
    settings: EngineSettings,
    content_dir: Option<PathBuf>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_server_config(mut self, server: &ServerConfig) -> Self {
        self.settings = server.settings.clone();
        self.content_dir = server.content_dir.clone();
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_game_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_content_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.content_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> Result<AppState, AppError> {
        let mut catalog = ContentCatalog::builtin()?;
        if let Some(dir) = &self.content_dir {
            let loaded = catalog.load_dir(dir)?;
            info!(dir = %dir.display(), loaded, "Location packs loaded");
        }
        let catalog = Arc::new(catalog);

        // OS-seeded CSPRNG; holder selection must not be predictable.
        let rng = ChaCha20Rng::from_os_rng();
        let flow = GameFlow::new(self.config, self.settings, Arc::clone(&catalog), rng)?;
        let coordinator = SessionCoordinator::new(flow).start();
        Ok(AppState::new(coordinator, catalog))
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
