//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::Path;
use std::sync::Arc;

use crate::application::services::{SettingsService, SortService};
use crate::config::Settings;
use crate::infrastructure::traits::{ErrorReporter, FileSystem, RealFileSystem, TerminalReporter};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Global settings as loaded from defaults, config file and environment
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Sink for failures shown to the user
    pub reporter: Arc<dyn ErrorReporter>,

    /// Current global and project order
    pub sort_settings: Arc<SettingsService>,

    pub sort: SortService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings, project_dir: &Path) -> Self {
        Self::with_deps(
            settings,
            project_dir,
            Arc::new(RealFileSystem),
            Arc::new(TerminalReporter),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        project_dir: &Path,
        fs: Arc<dyn FileSystem>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let settings = Arc::new(settings);
        let sort_settings = Arc::new(SettingsService::load(
            Arc::clone(&fs),
            settings.order_config(),
            project_dir,
        ));
        let sort = SortService::new(
            Arc::clone(&fs),
            Arc::clone(&sort_settings),
            Arc::clone(&reporter),
        );

        Self {
            settings,
            fs,
            reporter,
            sort_settings,
            sort,
        }
    }
}
