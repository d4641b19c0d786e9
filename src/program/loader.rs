//! Filesystem loader: walks a directory tree, parses every Rust
//! source file, and assembles the [`Program`].
//!
//! Loading is the only place gaze touches the filesystem or spends
//! wall-clock parsing; the analysis core consumes the finished,
//! read-only program. Files are parsed in parallel, but the resulting
//! program is plain owned data.

use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{Package, Program, SourceFile};
use crate::errors::{GazeError, Result};

/// Load a program rooted at `root`. Every directory under the root
/// that contains `.rs` files becomes one package, named by its path
/// relative to the root; the root directory itself is the package
/// named after its final component.
///
/// Syntax errors in any file fail the load with the offending
/// package's diagnostics reproduced verbatim.
pub fn load_program(root: &Path) -> Result<Program> {
    if !root.is_dir() {
        return Err(GazeError::load(
            root.display().to_string(),
            "not a directory",
        ));
    }

    let sources = discover_sources(root);
    if sources.is_empty() {
        return Err(GazeError::load(
            root.display().to_string(),
            "no Rust source files found",
        ));
    }

    debug!(files = sources.len(), root = %root.display(), "parsing sources");

    let parsed: Vec<std::result::Result<SourceFile, String>> = sources
        .iter()
        .map(|path| parse_source(path))
        .collect();

    let mut packages: BTreeMap<String, Vec<SourceFile>> = BTreeMap::new();
    let mut diagnostics: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (path, result) in sources.iter().zip(parsed) {
        let package = package_name(root, path);
        match result {
            Ok(file) => packages.entry(package).or_default().push(file),
            Err(diag) => diagnostics.entry(package).or_default().push(diag),
        }
    }

    if let Some((package, diags)) = diagnostics.into_iter().next() {
        return Err(GazeError::package(package, diags.join("\n  ")));
    }

    let packages = packages
        .into_iter()
        .map(|(name, files)| {
            let root = files
                .first()
                .and_then(|f| f.path.parent())
                .map(Path::to_path_buf)
                .unwrap_or_default();
            Package { name, root, files }
        })
        .collect();

    Ok(Program::new(packages))
}

fn discover_sources(root: &Path) -> Vec<PathBuf> {
    let mut sources: Vec<PathBuf> = WalkBuilder::new(root)
        .hidden(true)
        .build()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "rs"))
        .collect();
    sources.sort();
    sources
}

fn parse_source(path: &Path) -> std::result::Result<SourceFile, String> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    match syn::parse_file(&source) {
        Ok(ast) => Ok(SourceFile {
            path: path.to_path_buf(),
            ast,
        }),
        Err(e) => {
            let pos = e.span().start();
            Err(format!(
                "{}:{}:{}: {e}",
                path.display(),
                pos.line,
                pos.column + 1
            ))
        }
    }
}

/// Package name for a source file: its directory path relative to the
/// program root, or the root's final component for top-level files.
fn package_name(root: &Path, file: &Path) -> String {
    let dir = file.parent().unwrap_or(root);
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    if rel.as_os_str().is_empty() {
        root.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(".")
            .to_string()
    } else {
        rel.to_string_lossy().replace('\\', "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn loads_packages_by_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("lib.rs"), "pub fn top() {}\n").unwrap();
        fs::create_dir(dir.path().join("store")).unwrap();
        fs::write(
            dir.path().join("store/mod.rs"),
            "pub fn save_record() {}\n",
        )
        .unwrap();

        let program = load_program(dir.path()).unwrap();
        assert_eq!(program.packages().len(), 2);
        assert!(program.package("store").is_some());
        let store = program.package("store").unwrap();
        assert!(store.find_function("save_record").is_some());
    }

    #[test]
    fn syntax_errors_fail_with_diagnostics() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.rs"), "fn broken( {\n").unwrap();

        let err = load_program(dir.path()).unwrap_err();
        match err {
            GazeError::Package { diagnostics, .. } => {
                assert!(diagnostics.contains("bad.rs"), "{diagnostics}");
            }
            other => panic!("expected Package error, got {other}"),
        }
    }

    #[test]
    fn empty_directory_is_a_load_failure() {
        let dir = TempDir::new().unwrap();
        let err = load_program(dir.path()).unwrap_err();
        assert!(matches!(err, GazeError::Load { .. }));
    }
}
