//! Tests for SortService: unit collection, batch processing, cancellation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use annosort::application::services::WriteMode;
use annosort::application::{ApplicationError, CancellationToken};
use annosort::config::Settings;
use annosort::infrastructure::di::ServiceContainer;
use annosort::infrastructure::traits::{ErrorReporter, RealFileSystem};
use annosort::util::testing;

/// Reporter that records every failure for later inspection.
#[derive(Default)]
struct RecordingReporter {
    reports: Mutex<Vec<(String, String)>>,
}

impl RecordingReporter {
    fn subjects(&self) -> Vec<String> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .map(|(subject, _)| subject.clone())
            .collect()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, subject: &str, message: &str) {
        self.reports
            .lock()
            .unwrap()
            .push((subject.to_string(), message.to_string()));
    }
}

const UNSORTED: &str = "class A {\n    @Deprecated @Override\n    void f() {}\n}\n";
const SORTED: &str = "class A {\n    @Override @Deprecated\n    void f() {}\n}\n";

fn settings() -> Settings {
    Settings {
        annotation_order: vec!["Override".into(), "Deprecated".into()],
        unmatched_position: -1,
    }
}

fn container(project: &Path) -> (ServiceContainer, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::default());
    let container = ServiceContainer::with_deps(
        settings(),
        project,
        Arc::new(RealFileSystem),
        Arc::clone(&reporter) as Arc<dyn ErrorReporter>,
    );
    (container, reporter)
}

fn write_unit(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

// ============================================================
// collect_units
// ============================================================

#[test]
fn given_directory_when_collecting_then_java_units_depth_first_in_name_order() {
    testing::init_test_setup();
    // Arrange
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write_unit(root, "b/inner/Y.java", UNSORTED);
    write_unit(root, "b/A.java", UNSORTED);
    write_unit(root, "a/Z.java", UNSORTED);
    write_unit(root, "a/notes.txt", "not java");
    let (container, _) = container(root);

    // Act
    let units = container.sort.collect_units(&[root.to_path_buf()]).unwrap();

    // Assert
    let rel: Vec<PathBuf> = units
        .iter()
        .map(|u| u.strip_prefix(root).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        rel,
        vec![
            PathBuf::from("a/Z.java"),
            PathBuf::from("b/A.java"),
            PathBuf::from("b/inner/Y.java"),
        ]
    );
}

#[test]
fn given_file_named_twice_when_collecting_then_listed_once() {
    let temp = TempDir::new().unwrap();
    let unit = write_unit(temp.path(), "A.java", UNSORTED);
    let (container, _) = container(temp.path());

    let units = container
        .sort
        .collect_units(&[unit.clone(), temp.path().to_path_buf()])
        .unwrap();

    assert_eq!(units, vec![unit]);
}

#[test]
fn given_missing_path_when_collecting_then_path_not_found() {
    let temp = TempDir::new().unwrap();
    let (container, _) = container(temp.path());

    let err = container
        .sort
        .collect_units(&[temp.path().join("Nope.java")])
        .unwrap_err();

    assert!(matches!(err, ApplicationError::PathNotFound(_)));
}

#[test]
fn given_non_java_file_among_paths_when_collecting_then_skipped_and_rest_kept() {
    let temp = TempDir::new().unwrap();
    let notes = write_unit(temp.path(), "notes.txt", "text");
    let unit = write_unit(temp.path(), "A.java", UNSORTED);
    let (container, _) = container(temp.path());

    let units = container.sort.collect_units(&[notes, unit.clone()]).unwrap();

    assert_eq!(units, vec![unit]);
}

// ============================================================
// process_batch
// ============================================================

#[test]
fn given_units_when_processing_batch_then_all_sorted_with_progress() {
    let temp = TempDir::new().unwrap();
    let first = write_unit(temp.path(), "A.java", UNSORTED);
    let second = write_unit(temp.path(), "B.java", SORTED);
    let (container, reporter) = container(temp.path());
    let mut seen = Vec::new();

    let report = container.sort.process_batch(
        &[first.clone(), second.clone()],
        WriteMode::Write,
        &CancellationToken::new(),
        |p| seen.push((p.index, p.total, p.fraction())),
    );

    assert_eq!(seen, vec![(1, 2, 0.0), (2, 2, 0.5)]);
    assert!(!report.cancelled);
    assert!(!report.has_failures());
    assert_eq!(report.changed_count(), 1);
    assert_eq!(fs::read_to_string(&first).unwrap(), SORTED);
    assert_eq!(fs::read_to_string(&second).unwrap(), SORTED);
    assert!(reporter.subjects().is_empty());
}

#[test]
fn given_check_mode_when_processing_batch_then_files_untouched() {
    let temp = TempDir::new().unwrap();
    let unit = write_unit(temp.path(), "A.java", UNSORTED);
    let (container, _) = container(temp.path());

    let report = container.sort.process_batch(
        &[unit.clone()],
        WriteMode::Check,
        &CancellationToken::new(),
        |_| {},
    );

    assert_eq!(report.changed_count(), 1);
    assert_eq!(fs::read_to_string(&unit).unwrap(), UNSORTED);
}

#[test]
fn given_cancel_during_first_unit_when_processing_batch_then_stops_before_next() {
    let temp = TempDir::new().unwrap();
    let first = write_unit(temp.path(), "A.java", UNSORTED);
    let second = write_unit(temp.path(), "B.java", UNSORTED);
    let (container, _) = container(temp.path());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    let report = container.sort.process_batch(
        &[first.clone(), second.clone()],
        WriteMode::Write,
        &cancel,
        |_| trigger.cancel(),
    );

    assert!(report.cancelled);
    assert_eq!(report.total, 2);
    assert_eq!(report.units.len(), 1);
    assert_eq!(fs::read_to_string(&first).unwrap(), SORTED);
    assert_eq!(fs::read_to_string(&second).unwrap(), UNSORTED);
}

#[test]
fn given_unreadable_unit_when_processing_batch_then_reported_and_rest_sorted() {
    let temp = TempDir::new().unwrap();
    let bad = temp.path().join("Bad.java");
    fs::write(&bad, [0xff, 0xfe, 0xfd]).unwrap();
    let good = write_unit(temp.path(), "Good.java", UNSORTED);
    let (container, reporter) = container(temp.path());

    let report = container.sort.process_batch(
        &[bad.clone(), good.clone()],
        WriteMode::Write,
        &CancellationToken::new(),
        |_| {},
    );

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, bad);
    assert!(report.has_failures());
    assert_eq!(reporter.subjects(), vec![bad.display().to_string()]);
    assert_eq!(fs::read_to_string(&good).unwrap(), SORTED);
}

#[test]
fn given_project_order_when_processing_batch_then_project_order_applied() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(".annotation-sorting.json"),
        r#"{"annotationOrder": ["Deprecated", "Override"], "unmatchedPosition": -1}"#,
    )
    .unwrap();
    let unit = write_unit(temp.path(), "A.java", SORTED);
    let (container, _) = container(temp.path());

    container
        .sort
        .process_batch(&[unit.clone()], WriteMode::Write, &CancellationToken::new(), |_| {});

    assert_eq!(fs::read_to_string(&unit).unwrap(), UNSORTED);
}
