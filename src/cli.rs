use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gaze")]
#[command(about = "Side effect detection and contractual classification for Rust functions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze side effects of the functions in a package
    Analyze {
        /// Package directory to analyze
        path: PathBuf,

        /// Analyze a specific function (default: all exported)
        #[arg(short, long)]
        function: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Include unexported functions
        #[arg(long)]
        include_unexported: bool,

        /// Classify each effect as contractual, incidental, or
        /// ambiguous
        #[arg(long)]
        classify: bool,

        /// Keep signal detail fields in the output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compute CRAP scores from complexity and test coverage
    Crap {
        /// Package directories to analyze
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Path to an LCOV coverage profile
        #[arg(long)]
        coverage_file: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// CRAP score threshold for flagging functions
        #[arg(long, default_value_t = 15.0)]
        crap_threshold: f64,

        /// Fail if the CRAPload exceeds this (0 = no limit)
        #[arg(long, default_value_t = 0)]
        max_crapload: usize,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
