//! LCOV tracefile parsing for function-level coverage.
//!
//! Only the function records matter here: `SF:` opens a source file,
//! `FN:<line>,<name>` declares a function, `FNDA:<count>,<name>`
//! carries its execution count, `end_of_record` closes the file. A
//! function counts as covered when it executed at least once.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::errors::{GazeError, Result};

#[derive(Debug, Clone)]
pub struct FunctionCoverage {
    pub name: String,
    pub start_line: usize,
    pub execution_count: u64,
}

impl FunctionCoverage {
    pub fn percentage(&self) -> f64 {
        if self.execution_count > 0 {
            100.0
        } else {
            0.0
        }
    }
}

/// Coverage data grouped by source file.
#[derive(Debug, Default)]
pub struct CoverageData {
    functions: HashMap<PathBuf, Vec<FunctionCoverage>>,
}

impl CoverageData {
    /// Coverage percentage for one function, matched by exact name
    /// first, then by `::name` suffix for qualified records.
    pub fn function_coverage(&self, file: &Path, function: &str) -> Option<f64> {
        let functions = self.lookup_file(file)?;
        if let Some(f) = functions.iter().find(|f| f.name == function) {
            return Some(f.percentage());
        }
        let suffix = format!("::{function}");
        functions
            .iter()
            .find(|f| f.name.ends_with(&suffix))
            .map(FunctionCoverage::percentage)
    }

    /// Fraction of a file's functions that executed at least once.
    pub fn file_coverage(&self, file: &Path) -> Option<f64> {
        let functions = self.lookup_file(file)?;
        if functions.is_empty() {
            return Some(0.0);
        }
        let covered = functions.iter().filter(|f| f.execution_count > 0).count();
        Some(covered as f64 / functions.len() as f64 * 100.0)
    }

    fn lookup_file(&self, file: &Path) -> Option<&Vec<FunctionCoverage>> {
        if let Some(found) = self.functions.get(file) {
            return Some(found);
        }
        // Tracefiles often record paths from the workspace root while
        // analysis sees them relative to the analyzed directory; fall
        // back to a suffix match.
        self.functions
            .iter()
            .find(|(recorded, _)| recorded.ends_with(file) || file.ends_with(recorded))
            .map(|(_, functions)| functions)
    }
}

/// Parse an LCOV tracefile.
pub fn parse_lcov(path: &Path) -> Result<CoverageData> {
    let file = File::open(path).map_err(|e| GazeError::CoverageInvalid {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut data = CoverageData::default();
    let mut current: Option<PathBuf> = None;
    let mut lines: HashMap<String, usize> = HashMap::new();
    let mut hits: HashMap<String, u64> = HashMap::new();

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| GazeError::CoverageInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let line = line.trim();

        if let Some(source) = line.strip_prefix("SF:") {
            current = Some(PathBuf::from(source));
        } else if let Some(record) = line.strip_prefix("FN:") {
            if let Some((line_no, name)) = record.split_once(',') {
                if let Ok(line_no) = line_no.parse::<usize>() {
                    lines.insert(name.to_string(), line_no);
                }
            }
        } else if let Some(record) = line.strip_prefix("FNDA:") {
            if let Some((count, name)) = record.split_once(',') {
                if let Ok(count) = count.parse::<u64>() {
                    hits.insert(name.to_string(), count);
                }
            }
        } else if line == "end_of_record" {
            if let Some(file_path) = current.take() {
                let mut functions: Vec<FunctionCoverage> = lines
                    .drain()
                    .map(|(name, start_line)| {
                        let execution_count = hits.get(&name).copied().unwrap_or(0);
                        FunctionCoverage {
                            name,
                            start_line,
                            execution_count,
                        }
                    })
                    .collect();
                hits.clear();
                if !functions.is_empty() {
                    functions.sort_by_key(|f| f.start_line);
                    data.functions.insert(file_path, functions);
                }
            }
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TRACEFILE: &str = "\
SF:src/store.rs
FN:3,save_record
FN:10,load_record
FNDA:7,save_record
FNDA:0,load_record
end_of_record
SF:src/util.rs
FN:1,helpers::trim
FNDA:2,helpers::trim
end_of_record
";

    fn parsed() -> CoverageData {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(TRACEFILE.as_bytes()).unwrap();
        parse_lcov(file.path()).unwrap()
    }

    #[test]
    fn covered_functions_report_full_coverage() {
        let data = parsed();
        assert_eq!(
            data.function_coverage(Path::new("src/store.rs"), "save_record"),
            Some(100.0)
        );
        assert_eq!(
            data.function_coverage(Path::new("src/store.rs"), "load_record"),
            Some(0.0)
        );
    }

    #[test]
    fn qualified_names_match_by_suffix() {
        let data = parsed();
        assert_eq!(
            data.function_coverage(Path::new("src/util.rs"), "trim"),
            Some(100.0)
        );
    }

    #[test]
    fn file_coverage_is_the_covered_fraction() {
        let data = parsed();
        assert_eq!(data.file_coverage(Path::new("src/store.rs")), Some(50.0));
    }

    #[test]
    fn missing_tracefile_is_an_error() {
        let err = parse_lcov(Path::new("does/not/exist.info")).unwrap_err();
        assert!(matches!(err, GazeError::CoverageInvalid { .. }));
    }
}
