//! Batch sorting service
//!
//! Resolves paths to Java units and rewrites them one at a time, with
//! cooperative cancellation between units and per-unit progress reporting.

use std::collections::HashSet;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::services::SettingsService;
use crate::application::{
    ApplicationError, ApplicationResult, CancellationToken, PathContextExt,
};
use crate::domain::{RewriteReport, SortSettings, TreeRewriter};
use crate::infrastructure::java::{JavaParseError, JavaSource, JAVA_EXTENSION};
use crate::infrastructure::traits::{ErrorReporter, FileSystem};

/// Whether changed units are written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Write,
    /// Compute changes without touching any file
    Check,
}

/// Position of the batch, emitted before each unit is processed.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    /// 1-based index of the unit about to be processed
    pub index: usize,
    pub total: usize,
    pub unit: &'a Path,
}

impl Progress<'_> {
    /// Completed share of the batch before this unit, in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.index - 1) as f64 / self.total as f64
        }
    }

    pub fn text(&self) -> String {
        format!("File {} of {}", self.index, self.total)
    }
}

/// Outcome of sorting one source text.
#[derive(Debug, Clone)]
pub struct SortedSource {
    pub text: String,
    pub changed: bool,
    pub report: RewriteReport,
}

/// Outcome of one processed unit.
#[derive(Debug, Clone)]
pub struct UnitResult {
    pub path: PathBuf,
    pub changed: bool,
    pub report: RewriteReport,
}

/// A unit that could not be processed at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub total: usize,
    pub units: Vec<UnitResult>,
    pub failures: Vec<UnitFailure>,
    /// Set when the batch stopped early on cancellation
    pub cancelled: bool,
}

impl BatchReport {
    pub fn changed(&self) -> impl Iterator<Item = &UnitResult> {
        self.units.iter().filter(|u| u.changed)
    }

    pub fn changed_count(&self) -> usize {
        self.changed().count()
    }

    /// Node failures across all processed units.
    pub fn rewrite_failure_count(&self) -> usize {
        self.units.iter().map(|u| u.report.failures.len()).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty() || self.rewrite_failure_count() > 0
    }
}

/// Sort every top-level declaration of one Java source text.
pub fn sort_java_source(text: &str, settings: &SortSettings) -> Result<SortedSource, JavaParseError> {
    let mut source = JavaSource::parse(text)?;
    let rewriter = TreeRewriter::new(settings);
    let mut report = RewriteReport::default();
    for root in source.roots_mut() {
        report.merge(rewriter.rewrite_declaration(root));
    }
    let rendered = source.render();
    let changed = rendered != text;
    Ok(SortedSource {
        text: rendered,
        changed,
        report,
    })
}

/// Service for sorting markers across Java units.
pub struct SortService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<SettingsService>,
    reporter: Arc<dyn ErrorReporter>,
}

impl SortService {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        settings: Arc<SettingsService>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            fs,
            settings,
            reporter,
        }
    }

    /// Resolve files and directories to a flat, ordered list of Java units.
    ///
    /// Directories are walked depth-first with siblings in file-name order.
    /// Named files that are not Java units are skipped with a warning.
    pub fn collect_units(&self, paths: &[PathBuf]) -> ApplicationResult<Vec<PathBuf>> {
        let mut units: Vec<PathBuf> = Vec::new();
        for path in paths {
            if self.fs.is_dir(path) {
                let files = self
                    .fs
                    .list_files(path)
                    .with_path_context("walk directory", path)?;
                units.extend(files.into_iter().filter(|f| is_java_unit(f)));
            } else if self.fs.is_file(path) {
                if is_java_unit(path) {
                    units.push(path.clone());
                } else {
                    warn!("skipping {}: not a Java source file", path.display());
                }
            } else {
                return Err(ApplicationError::PathNotFound(path.clone()));
            }
        }

        let mut seen = HashSet::new();
        units.retain(|unit| seen.insert(unit.clone()));
        debug!("collected {} units", units.len());
        Ok(units)
    }

    /// Read, sort and (in write mode) store one unit.
    #[instrument(level = "debug", skip(self, settings))]
    pub fn process_unit(
        &self,
        path: &Path,
        settings: &SortSettings,
        mode: WriteMode,
    ) -> ApplicationResult<UnitResult> {
        let text = self
            .fs
            .read_to_string(path)
            .with_path_context("read unit", path)?;
        let sorted = sort_java_source(&text, settings).with_path_context("parse unit", path)?;

        for failure in &sorted.report.failures {
            self.reporter.report(
                &format!("{}: {}", path.display(), failure.node),
                &failure.message,
            );
        }

        if sorted.changed && mode == WriteMode::Write {
            self.fs
                .write(path, &sorted.text)
                .with_path_context("write unit", path)?;
            info!("sorted {}", path.display());
        }

        Ok(UnitResult {
            path: path.to_path_buf(),
            changed: sorted.changed,
            report: sorted.report,
        })
    }

    /// Process units sequentially.
    ///
    /// Settings are snapshotted once for the whole batch. Cancellation is
    /// checked before each unit; a unit in progress always completes.
    /// Unit failures are reported and the batch moves on.
    #[instrument(level = "debug", skip_all, fields(units = units.len()))]
    pub fn process_batch(
        &self,
        units: &[PathBuf],
        mode: WriteMode,
        cancel: &CancellationToken,
        mut on_progress: impl FnMut(&Progress<'_>),
    ) -> BatchReport {
        let settings = self.settings.current();
        let mut report = BatchReport {
            total: units.len(),
            ..Default::default()
        };

        for (idx, unit) in units.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("batch cancelled after {} of {} units", idx, units.len());
                report.cancelled = true;
                break;
            }

            let progress = Progress {
                index: idx + 1,
                total: units.len(),
                unit,
            };
            debug!("{}: {}", progress.text(), unit.display());
            on_progress(&progress);

            match self.process_unit(unit, &settings, mode) {
                Ok(result) => report.units.push(result),
                Err(e) => {
                    warn!("skipping {}: {}", unit.display(), e);
                    let message = error_chain(&e);
                    self.reporter.report(&unit.display().to_string(), &message);
                    report.failures.push(UnitFailure {
                        path: unit.clone(),
                        message,
                    });
                }
            }
        }

        report
    }
}

fn is_java_unit(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == JAVA_EXTENSION)
}

fn error_chain(e: &ApplicationError) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
