//! Settings provider
//!
//! Holds the global and project orders in memory and hands out snapshots.
//! Project reloads keep the last-known-good order when the file is unreadable.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, PathContextExt};
use crate::config::{parse_project_settings, project_settings_json, project_settings_path};
use crate::domain::{OrderConfig, SortSettings};
use crate::infrastructure::traits::FileSystem;

/// Result of re-reading the project order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// Project file read and applied
    Loaded,
    /// No project file; the override was cleared
    Missing,
    /// Project file unusable; the previous order stays in effect
    KeptPrevious { reason: String },
}

/// Service owning the current ordering settings.
pub struct SettingsService {
    fs: Arc<dyn FileSystem>,
    project_dir: PathBuf,
    state: RwLock<SortSettings>,
}

impl SettingsService {
    /// Create the service with a global order and load the project order, if any.
    pub fn load(fs: Arc<dyn FileSystem>, global: OrderConfig, project_dir: &Path) -> Self {
        let service = Self {
            fs,
            project_dir: project_dir.to_path_buf(),
            state: RwLock::new(SortSettings::new(global, None)),
        };
        if let ReloadOutcome::KeptPrevious { reason } = service.reload_project() {
            warn!("ignoring project order: {}", reason);
        }
        service
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn project_settings_path(&self) -> PathBuf {
        project_settings_path(&self.project_dir)
    }

    /// Snapshot of both layers, taken once per rewrite run.
    pub fn current(&self) -> SortSettings {
        match self.state.read() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Re-read the project file.
    #[instrument(level = "debug", skip(self), fields(dir = %self.project_dir.display()))]
    pub fn reload_project(&self) -> ReloadOutcome {
        let path = self.project_settings_path();
        if !self.fs.exists(&path) {
            debug!("no project order at {}", path.display());
            self.set_project(None);
            return ReloadOutcome::Missing;
        }

        match self.read_project(&path) {
            Ok(order) => {
                info!(
                    "loaded project order from {} ({} patterns)",
                    path.display(),
                    order.annotation_order.len()
                );
                self.set_project(Some(order));
                ReloadOutcome::Loaded
            }
            Err(e) => {
                warn!("keeping previous project order: {}", e);
                ReloadOutcome::KeptPrevious {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Write the global order to the project file, returning its path.
    ///
    /// The written order takes effect as the project order immediately.
    #[instrument(level = "debug", skip(self))]
    pub fn export_to_project(&self) -> ApplicationResult<PathBuf> {
        let global = self.current().global;
        let path = self.project_settings_path();
        let json = project_settings_json(&global)?;

        self.fs
            .ensure_parent(&path)
            .with_path_context("create directory for", &path)?;
        self.fs
            .write(&path, &format!("{}\n", json))
            .with_path_context("write project order", &path)?;

        self.set_project(Some(global));
        info!("exported global order to {}", path.display());
        Ok(path)
    }

    fn read_project(&self, path: &Path) -> ApplicationResult<OrderConfig> {
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|e| ApplicationError::Config {
                message: format!("read {}: {}", path.display(), e),
            })?;
        parse_project_settings(&content)
    }

    fn set_project(&self, project: Option<OrderConfig>) {
        match self.state.write() {
            Ok(mut state) => state.project = project,
            Err(poisoned) => poisoned.into_inner().project = project,
        }
    }
}
