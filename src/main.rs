//! Gaze CLI entry point: argument parsing, command dispatch, and
//! top-level error handling. The analysis itself lives in the library.

use anyhow::Result;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use gaze::cli::{parse_args, Commands, OutputFormat};
use gaze::config::{GazeConfig, CONFIG_FILE};
use gaze::observability::init_tracing;
use gaze::program::loader::load_program;
use gaze::{analysis, classify, crap, report};

fn main() -> Result<()> {
    init_tracing();

    let cli = parse_args();
    match cli.command {
        Commands::Analyze {
            path,
            function,
            format,
            include_unexported,
            classify,
            verbose,
        } => run_analyze(
            &path,
            function,
            format,
            include_unexported,
            classify,
            verbose,
        ),
        Commands::Crap {
            paths,
            coverage_file,
            format,
            crap_threshold,
            max_crapload,
        } => run_crap(&paths, coverage_file, format, crap_threshold, max_crapload),
    }
}

fn run_analyze(
    path: &Path,
    function: Option<String>,
    format: OutputFormat,
    include_unexported: bool,
    with_classification: bool,
    verbose: bool,
) -> Result<()> {
    let started = Instant::now();

    let config = GazeConfig::load(Path::new(CONFIG_FILE))?;
    let path = path
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("resolving {}: {e}", path.display()))?;
    let program = load_program(&path)?;

    let package = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| ".".to_string());

    let options = analysis::Options {
        include_unexported,
        function_filter: function,
    };
    let mut results = analysis::analyze(&program, &package, &options)?;

    if results.is_empty() {
        eprintln!("no functions found to analyze");
        return Ok(());
    }

    if with_classification {
        classify::classify(
            &mut results,
            &classify::Options {
                config: &config,
                program: &program,
                verbose,
            },
        );
    }

    let elapsed = started.elapsed();
    for result in &mut results {
        result.metadata.duration = elapsed;
    }

    match format {
        OutputFormat::Json => report::json::write_json(io::stdout().lock(), &results)?,
        OutputFormat::Text => report::text::write_text(io::stdout().lock(), &results)?,
    }

    Ok(())
}

fn run_crap(
    paths: &[PathBuf],
    coverage_file: Option<PathBuf>,
    format: OutputFormat,
    crap_threshold: f64,
    max_crapload: usize,
) -> Result<()> {
    let options = crap::Options {
        coverage_file,
        crap_threshold,
        max_crapload,
        ignore_generated: true,
    };

    let rpt = crap::analyze(paths, &options)?;

    match format {
        OutputFormat::Json => crap::report::write_json(io::stdout().lock(), &rpt)?,
        OutputFormat::Text => crap::report::write_text(io::stdout().lock(), &rpt)?,
    }

    // CI summary and enforcement.
    if max_crapload > 0 {
        let status = if rpt.summary.crapload > max_crapload {
            "FAIL"
        } else {
            "PASS"
        };
        eprintln!(
            "CRAPload: {}/{} ({})",
            rpt.summary.crapload, max_crapload, status
        );
        if rpt.summary.crapload > max_crapload {
            anyhow::bail!(
                "CRAPload {} exceeds maximum {}",
                rpt.summary.crapload,
                max_crapload
            );
        }
    }

    Ok(())
}
