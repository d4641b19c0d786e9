//! Error taxonomy for gaze operations.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal error categories surfaced by the analysis pipeline.
///
/// Non-fatal anomalies are not errors: detectors record them as
/// warnings on [`crate::taxonomy::Metadata`] and analysis continues.
#[derive(Debug, Error)]
pub enum GazeError {
    /// The loader rejected its input before analysis started.
    #[error("loading package {package:?}: {message}")]
    Load { package: String, message: String },

    /// The package has syntax errors on entry; diagnostics are
    /// surfaced verbatim and the package is not analyzed.
    #[error("package {package:?} has errors:\n  {diagnostics}")]
    Package {
        package: String,
        diagnostics: String,
    },

    /// An explicit function filter matched nothing.
    #[error("function {function:?} not found in package {package:?}")]
    FilterMiss { function: String, package: String },

    /// Malformed configuration file.
    #[error("parsing config {}: {message}", .path.display())]
    ConfigInvalid { path: PathBuf, message: String },

    /// Malformed coverage profile.
    #[error("parsing coverage profile {}: {message}", .path.display())]
    CoverageInvalid { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GazeError {
    pub fn load(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            package: package.into(),
            message: message.into(),
        }
    }

    pub fn package(package: impl Into<String>, diagnostics: impl Into<String>) -> Self {
        Self::Package {
            package: package.into(),
            diagnostics: diagnostics.into(),
        }
    }

    pub fn config_invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias using the gaze error taxonomy.
pub type Result<T> = std::result::Result<T, GazeError>;
