//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, ErrorReporter)
//! but are themselves concrete structs, not traits.

mod settings;
mod sort;

pub use settings::{ReloadOutcome, SettingsService};
pub use sort::{
    sort_java_source, BatchReport, Progress, SortService, SortedSource, UnitFailure, UnitResult,
    WriteMode,
};
