//! Configuration loaded from `.gaze.yaml`.
//!
//! Every field carries a default, and a config file overlays onto the
//! defaults field by field: a missing file yields the defaults, an
//! empty file preserves them, a partial file overrides only what it
//! names. A malformed file is a hard error.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;
use std::time::Duration;

use crate::errors::{GazeError, Result};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".gaze.yaml";

/// Confidence score boundaries for classification labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum confidence for the contractual label.
    #[serde(default = "default_contractual")]
    pub contractual: u8,

    /// Upper bound for the incidental label: scores below it are
    /// incidental.
    #[serde(default = "default_incidental")]
    pub incidental: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            contractual: default_contractual(),
            incidental: default_incidental(),
        }
    }
}

fn default_contractual() -> u8 {
    80
}

fn default_incidental() -> u8 {
    50
}

/// Documentation scanning policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocScan {
    /// Glob patterns excluded from document scanning.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// When set, only matching files are scanned, overriding the
    /// default full-repository walk.
    #[serde(default)]
    pub include: Vec<String>,

    /// Upper bound on document scanning time.
    #[serde(
        default = "default_timeout",
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub timeout: Duration,
}

impl Default for DocScan {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
            include: Vec::new(),
            timeout: default_timeout(),
        }
    }
}

fn default_exclude() -> Vec<String> {
    [
        "vendor/**",
        "node_modules/**",
        ".git/**",
        "testdata/**",
        "CHANGELOG.md",
        "CONTRIBUTING.md",
        "CODE_OF_CONDUCT.md",
        "LICENSE",
        "LICENSE.md",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Classification-related settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationConfig {
    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub doc_scan: DocScan,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GazeConfig {
    #[serde(default)]
    pub classification: ClassificationConfig,
}

impl GazeConfig {
    /// Read configuration from the given path. A missing file yields
    /// the defaults; an invalid file is an error carrying the path and
    /// the parse diagnostic.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => return Err(GazeError::config_invalid(path, e.to_string())),
        };

        // serde_yaml rejects a fully empty document; an empty file
        // means "use the defaults".
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: GazeConfig = serde_yaml::from_str(&contents)
            .map_err(|e| GazeError::config_invalid(path, e.to_string()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let doc_scan = &self.classification.doc_scan;
        for pattern in doc_scan.exclude.iter().chain(doc_scan.include.iter()) {
            glob::Pattern::new(pattern).map_err(|e| {
                GazeError::config_invalid(path, format!("doc_scan pattern {pattern:?}: {e}"))
            })?;
        }
        Ok(())
    }
}

fn serialize_duration<S: Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&format_duration(d))
}

fn deserialize_duration<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Duration, D::Error> {
    let raw = String::deserialize(d)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
}

/// Render a duration the way the config file spells it.
fn format_duration(d: &Duration) -> String {
    if d.subsec_millis() == 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{}ms", d.as_millis())
    }
}

/// Parse durations of the form `500ms`, `30s`, `5m`, `1h`.
fn parse_duration(raw: &str) -> std::result::Result<Duration, String> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .ok_or_else(|| format!("duration {raw:?} is missing a unit (ms, s, m, h)"))?;
    let (value, unit) = raw.split_at(split);
    let value: f64 = value
        .parse()
        .map_err(|_| format!("duration {raw:?} has an invalid numeric part"))?;
    let seconds = match unit {
        "ms" => value / 1000.0,
        "s" => value,
        "m" => value * 60.0,
        "h" => value * 3600.0,
        other => return Err(format!("duration {raw:?} has unknown unit {other:?}")),
    };
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(format!("duration {raw:?} is out of range"));
    }
    Ok(Duration::from_secs_f64(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_accepts_common_units() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn parse_duration_rejects_garbage() {
        assert!(parse_duration("30").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("30 parsecs").is_err());
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = GazeConfig::default();
        assert_eq!(config.classification.thresholds.contractual, 80);
        assert_eq!(config.classification.thresholds.incidental, 50);
        assert_eq!(
            config.classification.doc_scan.timeout,
            Duration::from_secs(30)
        );
        assert_eq!(config.classification.doc_scan.exclude.len(), 9);
        assert!(config.classification.doc_scan.include.is_empty());
    }

    #[test]
    fn partial_config_overlays_defaults() {
        let config: GazeConfig = serde_yaml::from_str(
            "classification:\n  thresholds:\n    contractual: 85\n",
        )
        .unwrap();
        assert_eq!(config.classification.thresholds.contractual, 85);
        // Unnamed fields keep their defaults.
        assert_eq!(config.classification.thresholds.incidental, 50);
        assert_eq!(config.classification.doc_scan.exclude.len(), 9);
    }
}
