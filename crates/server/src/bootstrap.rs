use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use mymove_core::config::{AppConfig, ConfigError, LoadOptions};
use mymove_core::data::{DataServiceError, InMemoryMoveService, MoveDataService};
use mymove_core::errors::DomainError;
use mymove_core::flows::FlowTable;
use thiserror::Error;
use tracing::info;

use crate::health;
use crate::sessions::SessionStore;
use crate::wizard::{self, WizardState};

pub struct Application {
    pub config: AppConfig,
    pub flows: Arc<FlowTable>,
    pub data: Arc<dyn MoveDataService>,
    pub sessions: SessionStore,
    wizard: WizardState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("move fixtures could not be loaded: {0}")]
    Fixtures(#[source] DataServiceError),
    #[error("wizard flow table is invalid: {0}")]
    FlowTable(#[source] DomainError),
    #[error("wizard templates failed to compile: {0}")]
    Templates(#[source] tera::Error),
}

impl Application {
    /// Wizard pages, JSON APIs and `/health` on a single router.
    pub fn router(&self) -> Router {
        wizard::router(self.wizard.clone()).merge(health::router(self.data.clone()))
    }
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        move_id = "unknown",
        "starting application bootstrap"
    );

    let service = match &config.data.fixtures_path {
        Some(path) => {
            let service =
                InMemoryMoveService::from_fixture_file(path).map_err(BootstrapError::Fixtures)?;
            info!(
                event_name = "system.bootstrap.fixtures_loaded",
                correlation_id = "bootstrap",
                move_id = "unknown",
                fixtures_path = %path.display(),
                moves = service.len(),
                "move fixtures loaded"
            );
            service
        }
        None => InMemoryMoveService::default(),
    };
    let data: Arc<dyn MoveDataService> = Arc::new(service);

    let flows = Arc::new(FlowTable::standard().map_err(BootstrapError::FlowTable)?);
    let sessions = SessionStore::new(
        config.wizard.max_sessions,
        Duration::from_secs(config.wizard.session_idle_secs),
    );
    let wizard = WizardState::new(
        flows.clone(),
        data.clone(),
        sessions.clone(),
        config.wizard.session_header.clone(),
    )
    .map_err(BootstrapError::Templates)?;

    info!(
        event_name = "system.bootstrap.wizard_ready",
        correlation_id = "bootstrap",
        move_id = "unknown",
        pages = flows.pages().len(),
        "wizard flow table registered"
    );

    Ok(Application { config, flows, data, sessions, wizard })
}
