//! End-to-end CRAP pipeline tests over a temporary project tree.

use gaze::crap::{self, Options, Quadrant};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const LIB_SRC: &str = r#"
pub fn tiny(x: u64) -> u64 {
    x + 1
}

pub fn branchy(x: i64) -> i64 {
    if x > 100 {
        return 100;
    }
    if x > 50 {
        return 50;
    }
    if x > 25 {
        return 25;
    }
    if x > 12 {
        return 12;
    }
    for i in 0..x {
        if i % 2 == 0 {
            return i;
        }
    }
    match x {
        0 => -1,
        1 => -2,
        _ => x,
    }
}
"#;

fn project_with_coverage() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("proj");
    fs::create_dir(&src).unwrap();
    let lib = src.join("lib.rs");
    fs::write(&lib, LIB_SRC).unwrap();

    let lcov = dir.path().join("lcov.info");
    fs::write(
        &lcov,
        format!(
            "SF:{}\nFN:2,tiny\nFN:6,branchy\nFNDA:12,tiny\nFNDA:0,branchy\nend_of_record\n",
            lib.display()
        ),
    )
    .unwrap();

    (dir, src, lcov)
}

#[test]
fn scores_fuse_complexity_and_coverage() {
    let (_dir, src, lcov) = project_with_coverage();

    let report = crap::analyze(
        &[src],
        &Options {
            coverage_file: Some(lcov),
            ..Options::default()
        },
    )
    .unwrap();

    assert_eq!(report.scores.len(), 2);

    let tiny = report.scores.iter().find(|s| s.function == "tiny").unwrap();
    assert_eq!(tiny.complexity, 1);
    assert_eq!(tiny.line_coverage, 100.0);
    // Fully covered: crap equals complexity.
    assert_eq!(tiny.crap, 1.0);
    assert_eq!(tiny.quadrant, Quadrant::Safe);

    let branchy = report
        .scores
        .iter()
        .find(|s| s.function == "branchy")
        .unwrap();
    assert!(branchy.complexity >= 8, "complexity {}", branchy.complexity);
    assert_eq!(branchy.line_coverage, 0.0);
    assert!(branchy.crap > report.summary.crap_threshold);
    assert_eq!(branchy.quadrant, Quadrant::Dangerous);
}

#[test]
fn summary_counts_crapload_and_worst_offenders() {
    let (_dir, src, lcov) = project_with_coverage();

    let report = crap::analyze(
        &[src],
        &Options {
            coverage_file: Some(lcov),
            ..Options::default()
        },
    )
    .unwrap();

    assert_eq!(report.summary.total_functions, 2);
    assert_eq!(report.summary.crapload, 1);
    assert_eq!(report.summary.quadrant_counts.safe, 1);
    assert_eq!(report.summary.quadrant_counts.dangerous, 1);
    assert_eq!(report.summary.worst[0].function, "branchy");
}

#[test]
fn missing_coverage_profile_treats_functions_as_uncovered() {
    let (_dir, src, _lcov) = project_with_coverage();

    let report = crap::analyze(&[src], &Options::default()).unwrap();
    for score in &report.scores {
        assert_eq!(score.line_coverage, 0.0, "{}", score.function);
    }
}

#[test]
fn generated_files_are_skipped() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("gen");
    fs::create_dir(&src).unwrap();
    fs::write(
        src.join("generated.rs"),
        "// @generated by protoc\npub fn machine_made() -> u64 { 0 }\n",
    )
    .unwrap();
    fs::write(src.join("hand.rs"), "pub fn hand_made() -> u64 { 0 }\n").unwrap();

    let report = crap::analyze(&[src], &Options::default()).unwrap();
    let names: Vec<&str> = report.scores.iter().map(|s| s.function.as_str()).collect();
    assert!(names.contains(&"hand_made"), "{names:?}");
    assert!(!names.contains(&"machine_made"), "{names:?}");
}

#[test]
fn test_files_are_excluded_from_scoring() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("proj");
    fs::create_dir_all(src.join("tests")).unwrap();
    fs::write(src.join("lib.rs"), "pub fn real() -> u64 { 0 }\n").unwrap();
    fs::write(
        src.join("tests/smoke.rs"),
        "pub fn test_helper() -> u64 { 0 }\n",
    )
    .unwrap();

    let report = crap::analyze(&[src], &Options::default()).unwrap();
    let names: Vec<&str> = report.scores.iter().map(|s| s.function.as_str()).collect();
    assert!(names.contains(&"real"), "{names:?}");
    assert!(!names.contains(&"test_helper"), "{names:?}");
}
