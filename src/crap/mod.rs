//! CRAP (Change Risk Anti-Patterns) scoring: cyclomatic complexity
//! fused with test coverage.
//!
//! `crap = comp^2 * (1 - coverage/100)^3 + comp`; a complex function
//! is forgiven in proportion to how well its tests exercise it. The
//! report carries per-function scores, a summary with the CRAPload
//! (functions at or above the threshold), and a quadrant breakdown.

pub mod complexity;
pub mod coverage;
pub mod report;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::errors::Result;
use crate::program::loader::load_program;

/// Risk quadrant for one function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    /// Low complexity, covered.
    Safe,
    /// High complexity redeemed by coverage.
    ComplexButTested,
    /// Low complexity but nothing asserts on it.
    SimpleButUnderspecified,
    /// High complexity and uncovered.
    Dangerous,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::Safe,
        Quadrant::ComplexButTested,
        Quadrant::SimpleButUnderspecified,
        Quadrant::Dangerous,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quadrant::Safe => "safe",
            Quadrant::ComplexButTested => "complex but tested",
            Quadrant::SimpleButUnderspecified => "simple but underspecified",
            Quadrant::Dangerous => "dangerous",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-function CRAP score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Score {
    pub function: String,
    pub file: PathBuf,
    pub line: usize,
    pub complexity: u32,
    pub line_coverage: f64,
    pub crap: f64,
    pub quadrant: Quadrant,
}

/// Per-quadrant function counts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct QuadrantCounts {
    pub safe: usize,
    pub complex_but_tested: usize,
    pub simple_but_underspecified: usize,
    pub dangerous: usize,
}

impl QuadrantCounts {
    fn add(&mut self, quadrant: Quadrant) {
        match quadrant {
            Quadrant::Safe => self.safe += 1,
            Quadrant::ComplexButTested => self.complex_but_tested += 1,
            Quadrant::SimpleButUnderspecified => self.simple_but_underspecified += 1,
            Quadrant::Dangerous => self.dangerous += 1,
        }
    }

    pub fn get(&self, quadrant: Quadrant) -> usize {
        match quadrant {
            Quadrant::Safe => self.safe,
            Quadrant::ComplexButTested => self.complex_but_tested,
            Quadrant::SimpleButUnderspecified => self.simple_but_underspecified,
            Quadrant::Dangerous => self.dangerous,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total_functions: usize,
    pub avg_complexity: f64,
    pub avg_line_coverage: f64,
    pub avg_crap: f64,
    pub crap_threshold: f64,
    /// Count of functions at or above the threshold.
    pub crapload: usize,
    pub quadrant_counts: QuadrantCounts,
    /// Top offenders by CRAP score, highest first.
    pub worst: Vec<Score>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub scores: Vec<Score>,
    pub summary: Summary,
}

/// CRAP analysis options.
#[derive(Debug, Clone)]
pub struct Options {
    /// LCOV tracefile; without one every function counts as uncovered.
    pub coverage_file: Option<PathBuf>,
    pub crap_threshold: f64,
    /// Fail the run when the CRAPload exceeds this; 0 means no limit.
    pub max_crapload: usize,
    pub ignore_generated: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            coverage_file: None,
            crap_threshold: 15.0,
            max_crapload: 0,
            ignore_generated: true,
        }
    }
}

/// The CRAP formula.
pub fn formula(complexity: u32, coverage_percent: f64) -> f64 {
    let comp = complexity as f64;
    let uncovered = 1.0 - coverage_percent / 100.0;
    comp * comp * uncovered.powi(3) + comp
}

const QUADRANT_COMPLEXITY_THRESHOLD: u32 = 10;
const QUADRANT_COVERAGE_THRESHOLD: f64 = 50.0;

/// Sort a function into its risk quadrant.
pub fn classify_quadrant(
    complexity: u32,
    coverage: f64,
    complexity_threshold: u32,
    coverage_threshold: f64,
) -> Quadrant {
    let complex = complexity >= complexity_threshold;
    let covered = coverage >= coverage_threshold;
    match (complex, covered) {
        (false, true) => Quadrant::Safe,
        (true, true) => Quadrant::ComplexButTested,
        (false, false) => Quadrant::SimpleButUnderspecified,
        (true, false) => Quadrant::Dangerous,
    }
}

/// Compute CRAP scores for every function under the given paths.
pub fn analyze(paths: &[PathBuf], options: &Options) -> Result<Report> {
    let coverage = match &options.coverage_file {
        Some(path) => Some(coverage::parse_lcov(path)?),
        None => {
            warn!("no coverage profile provided; treating every function as uncovered");
            None
        }
    };

    let mut scores = Vec::new();
    for path in paths {
        let program = load_program(path)?;
        for package in program.packages() {
            for function in package.functions() {
                if function.in_test_file() {
                    continue;
                }
                if options.ignore_generated && is_generated_file(&function.file.path) {
                    continue;
                }

                let complexity = complexity::cyclomatic(function.block());
                let line_coverage = coverage
                    .as_ref()
                    .and_then(|data| {
                        data.function_coverage(&function.file.path, &function.name())
                    })
                    .unwrap_or(0.0);
                let crap = formula(complexity, line_coverage);

                scores.push(Score {
                    function: function.name(),
                    file: function.file.path.clone(),
                    line: function.line(),
                    complexity,
                    line_coverage,
                    crap,
                    quadrant: classify_quadrant(
                        complexity,
                        line_coverage,
                        QUADRANT_COMPLEXITY_THRESHOLD,
                        QUADRANT_COVERAGE_THRESHOLD,
                    ),
                });
            }
        }
    }

    let summary = build_summary(&scores, options);
    Ok(Report { scores, summary })
}

const WORST_OFFENDERS: usize = 5;

pub(crate) fn build_summary(scores: &[Score], options: &Options) -> Summary {
    let total = scores.len();
    let (mut sum_complexity, mut sum_coverage, mut sum_crap) = (0.0, 0.0, 0.0);
    let mut quadrant_counts = QuadrantCounts::default();
    let mut crapload = 0;

    for score in scores {
        sum_complexity += score.complexity as f64;
        sum_coverage += score.line_coverage;
        sum_crap += score.crap;
        quadrant_counts.add(score.quadrant);
        if score.crap >= options.crap_threshold {
            crapload += 1;
        }
    }

    let mut worst: Vec<Score> = scores.to_vec();
    worst.sort_by(|a, b| b.crap.total_cmp(&a.crap));
    worst.truncate(WORST_OFFENDERS);

    let denom = total.max(1) as f64;
    Summary {
        total_functions: total,
        avg_complexity: sum_complexity / denom,
        avg_line_coverage: sum_coverage / denom,
        avg_crap: sum_crap / denom,
        crap_threshold: options.crap_threshold,
        crapload,
        quadrant_counts,
        worst,
    }
}

/// Generated sources carry a marker comment near the top of the file.
fn is_generated_file(path: &Path) -> bool {
    let Ok(file) = std::fs::File::open(path) else {
        return false;
    };
    std::io::BufReader::new(file)
        .lines()
        .take(5)
        .map_while(std::result::Result::ok)
        .any(|line| line.contains("@generated") || line.contains("DO NOT EDIT"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_matches_known_points() {
        // Fully covered: crap == complexity.
        assert_eq!(formula(10, 100.0), 10.0);
        // Fully uncovered: comp^2 + comp.
        assert_eq!(formula(10, 0.0), 110.0);
        // Halfway: 100 * 0.125 + 10.
        assert!((formula(10, 50.0) - 22.5).abs() < 1e-9);
    }

    #[test]
    fn quadrants_cover_all_four_corners() {
        assert_eq!(classify_quadrant(2, 90.0, 10, 50.0), Quadrant::Safe);
        assert_eq!(
            classify_quadrant(20, 90.0, 10, 50.0),
            Quadrant::ComplexButTested
        );
        assert_eq!(
            classify_quadrant(2, 10.0, 10, 50.0),
            Quadrant::SimpleButUnderspecified
        );
        assert_eq!(classify_quadrant(20, 10.0, 10, 50.0), Quadrant::Dangerous);
    }

    #[test]
    fn summary_counts_the_crapload() {
        let mk = |complexity: u32, coverage: f64| {
            let crap = formula(complexity, coverage);
            Score {
                function: "f".into(),
                file: PathBuf::from("lib.rs"),
                line: 1,
                complexity,
                line_coverage: coverage,
                crap,
                quadrant: classify_quadrant(complexity, coverage, 10, 50.0),
            }
        };
        let scores = vec![mk(2, 100.0), mk(10, 0.0), mk(6, 0.0)];
        let summary = build_summary(&scores, &Options::default());

        assert_eq!(summary.total_functions, 3);
        // crap scores: 2.0, 110.0, 42.0 -> two at or above 15.
        assert_eq!(summary.crapload, 2);
        assert_eq!(summary.worst.first().map(|s| s.complexity), Some(10));
    }
}
