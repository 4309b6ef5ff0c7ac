pub mod config;
pub mod errors;
pub mod files;
pub mod models;
pub mod service;
pub mod store;
pub mod timestamp;

pub use crate::config::LedgerConfig;
pub use crate::errors::{AppError, AppResult};
pub use crate::files::{inspect_path, links_from_selection, Opener, SystemOpener};
pub use crate::models::{FileLink, Project, DEFAULT_STATUS, STATUSES};
pub use crate::service::{MoveTarget, ProjectService};
pub use crate::store::{Mutation, ProjectStore};
pub use crate::timestamp::Timestamp;

use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

/// Everything a host shell needs, built once at startup and passed around
/// by reference.
#[derive(Clone)]
pub struct Ledger {
    config: LedgerConfig,
    projects: ProjectService,
    opener: Arc<dyn Opener>,
}

impl Ledger {
    pub fn open(config: LedgerConfig) -> Self {
        Self::with_opener(config, Arc::new(SystemOpener))
    }

    pub fn with_opener(config: LedgerConfig, opener: Arc<dyn Opener>) -> Self {
        let store = Arc::new(ProjectStore::new(config.store_path()));
        tracing::info!(path = %store.path().display(), "project ledger opened");
        Self {
            config,
            projects: ProjectService::new(store),
            opener,
        }
    }

    /// Opens the ledger after installing the file logger. Keep the returned
    /// guard alive for as long as logs should be flushed.
    pub fn with_tracing(config: LedgerConfig) -> AppResult<(Self, WorkerGuard)> {
        let guard = init_tracing(&config.log_dir())?;
        Ok((Self::open(config), guard))
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn projects(&self) -> &ProjectService {
        &self.projects
    }

    pub fn open_path(&self, path: &Path) -> AppResult<()> {
        self.opener.open(path)
    }
}

pub fn init_tracing(log_dir: &Path) -> AppResult<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "case-ledger.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| AppError::Internal(error.to_string()))?;

    Ok(guard)
}
