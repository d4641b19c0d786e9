//! Side effect taxonomy, core result model, and stable ID generation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;

/// Closed enumeration of observable side effect categories.
///
/// Variant order follows the priority tiers (P0 first), so the derived
/// ordering doubles as the stable sort key for effect lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    // P0: must detect, zero false positives.
    ReturnValue,
    ErrorReturn,
    SentinelError,
    ReceiverMutation,
    PointerArgMutation,
    // P1: high value.
    SliceMutation,
    MapMutation,
    GlobalMutation,
    WriterOutput,
    HttpResponseWrite,
    ChannelSend,
    ChannelClose,
    DeferredReturnMutation,
    // P2: important.
    FileSystemWrite,
    FileSystemDelete,
    FileSystemMeta,
    DatabaseWrite,
    DatabaseTransaction,
    ThreadSpawn,
    Panic,
    CallbackInvocation,
    LogWrite,
    TaskCancellation,
    // P3: nice to have.
    StdoutWrite,
    StderrWrite,
    EnvVarMutation,
    MutexOp,
    BarrierOp,
    AtomicOp,
    TimeDependency,
    ProcessExit,
    PanicRecovery,
    // P4: exotic.
    ReflectionMutation,
    UnsafeMutation,
    FfiCall,
    FinalizerRegistration,
    PoolOp,
    ClosureCaptureMutation,
}

impl EffectKind {
    /// Stable string form used in IDs, JSON, and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectKind::ReturnValue => "ReturnValue",
            EffectKind::ErrorReturn => "ErrorReturn",
            EffectKind::SentinelError => "SentinelError",
            EffectKind::ReceiverMutation => "ReceiverMutation",
            EffectKind::PointerArgMutation => "PointerArgMutation",
            EffectKind::SliceMutation => "SliceMutation",
            EffectKind::MapMutation => "MapMutation",
            EffectKind::GlobalMutation => "GlobalMutation",
            EffectKind::WriterOutput => "WriterOutput",
            EffectKind::HttpResponseWrite => "HttpResponseWrite",
            EffectKind::ChannelSend => "ChannelSend",
            EffectKind::ChannelClose => "ChannelClose",
            EffectKind::DeferredReturnMutation => "DeferredReturnMutation",
            EffectKind::FileSystemWrite => "FileSystemWrite",
            EffectKind::FileSystemDelete => "FileSystemDelete",
            EffectKind::FileSystemMeta => "FileSystemMeta",
            EffectKind::DatabaseWrite => "DatabaseWrite",
            EffectKind::DatabaseTransaction => "DatabaseTransaction",
            EffectKind::ThreadSpawn => "ThreadSpawn",
            EffectKind::Panic => "Panic",
            EffectKind::CallbackInvocation => "CallbackInvocation",
            EffectKind::LogWrite => "LogWrite",
            EffectKind::TaskCancellation => "TaskCancellation",
            EffectKind::StdoutWrite => "StdoutWrite",
            EffectKind::StderrWrite => "StderrWrite",
            EffectKind::EnvVarMutation => "EnvVarMutation",
            EffectKind::MutexOp => "MutexOp",
            EffectKind::BarrierOp => "BarrierOp",
            EffectKind::AtomicOp => "AtomicOp",
            EffectKind::TimeDependency => "TimeDependency",
            EffectKind::ProcessExit => "ProcessExit",
            EffectKind::PanicRecovery => "PanicRecovery",
            EffectKind::ReflectionMutation => "ReflectionMutation",
            EffectKind::UnsafeMutation => "UnsafeMutation",
            EffectKind::FfiCall => "FfiCall",
            EffectKind::FinalizerRegistration => "FinalizerRegistration",
            EffectKind::PoolOp => "PoolOp",
            EffectKind::ClosureCaptureMutation => "ClosureCaptureMutation",
        }
    }

    /// Priority tier for this effect kind. Tier is a pure function of
    /// kind; the exotic group is the P4 fallthrough.
    pub fn tier(&self) -> Tier {
        use EffectKind::*;
        match self {
            ReturnValue | ErrorReturn | SentinelError | ReceiverMutation | PointerArgMutation => {
                Tier::P0
            }
            SliceMutation | MapMutation | GlobalMutation | WriterOutput | HttpResponseWrite
            | ChannelSend | ChannelClose | DeferredReturnMutation => Tier::P1,
            FileSystemWrite | FileSystemDelete | FileSystemMeta | DatabaseWrite
            | DatabaseTransaction | ThreadSpawn | Panic | CallbackInvocation | LogWrite
            | TaskCancellation => Tier::P2,
            StdoutWrite | StderrWrite | EnvVarMutation | MutexOp | BarrierOp | AtomicOp
            | TimeDependency | ProcessExit | PanicRecovery => Tier::P3,
            ReflectionMutation | UnsafeMutation | FfiCall | FinalizerRegistration | PoolOp
            | ClosureCaptureMutation => Tier::P4,
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority tier for a side effect kind (P0 highest).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Tier {
    P0,
    P1,
    P2,
    P3,
    P4,
}

impl Tier {
    pub const ALL: [Tier; 5] = [Tier::P0, Tier::P1, Tier::P2, Tier::P3, Tier::P4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::P0 => "P0",
            Tier::P1 => "P1",
            Tier::P2 => "P2",
            Tier::P3 => "P3",
            Tier::P4 => "P4",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contractual classification of a side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Contractual,
    Incidental,
    Ambiguous,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Contractual => "contractual",
            Label::Incidental => "incidental",
            Label::Ambiguous => "ambiguous",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of evidence contributing to a classification score.
///
/// The detail fields are populated in verbose mode only and are omitted
/// from JSON when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// Signal source: "interface", "visibility", "caller", "naming",
    /// "rustdoc".
    pub source: String,

    /// Numeric contribution to the confidence score; negative weights
    /// are incidental evidence.
    pub weight: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Signal {
    pub fn new(source: impl Into<String>, weight: i32) -> Self {
        Self {
            source: source.into(),
            weight,
            source_file: None,
            excerpt: None,
            reasoning: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn with_source_file(mut self, file: impl Into<String>) -> Self {
        self.source_file = Some(file.into());
        self
    }

    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    /// Drop the verbose-only detail fields.
    pub fn strip_details(&mut self) {
        self.source_file = None;
        self.excerpt = None;
        self.reasoning = None;
    }
}

/// Classification of a single side effect with the evidence behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub label: Label,

    /// Composed confidence score, clamped to 0..=100.
    pub confidence: u8,

    pub signals: Vec<Signal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// A single detected observable change in a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideEffect {
    /// Stable identifier for diffing across runs, derived from
    /// (package, function, kind, location).
    pub id: String,

    #[serde(rename = "type")]
    pub kind: EffectKind,

    pub tier: Tier,

    /// Source position as `file:line:col`.
    pub location: String,

    pub description: String,

    /// Affected entity: field name, argument name, return type, etc.
    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
}

/// Function name used for package-level declarations (sentinel errors)
/// that are not attached to any function. Consumers must treat this as
/// a tag, not a real identifier.
pub const PACKAGE_FUNCTION: &str = "<package>";

/// Identifies the function under analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionTarget {
    /// Package path the function belongs to.
    pub package: String,

    /// Function or method name, or [`PACKAGE_FUNCTION`] for the
    /// synthetic package-level target.
    pub function: String,

    /// Receiver type for methods (e.g. "&mut Store"), absent for free
    /// functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,

    pub signature: String,

    pub location: String,
}

impl FunctionTarget {
    /// Fully qualified name including the receiver when present,
    /// e.g. `(&mut Store).save` or `parse_config`.
    pub fn qualified_name(&self) -> String {
        match &self.receiver {
            Some(recv) => format!("({}).{}", recv, self.function),
            None => self.function.clone(),
        }
    }
}

fn serialize_duration_ms<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

fn deserialize_duration_ms<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    let ms = u64::deserialize(d)?;
    Ok(Duration::from_millis(ms))
}

/// Analysis run metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub gaze_version: String,

    /// Host toolchain version string.
    pub rust_version: String,

    /// Run duration; serialized as integer milliseconds. Filled by the
    /// caller once the whole run is timed.
    #[serde(
        rename = "duration_ms",
        serialize_with = "serialize_duration_ms",
        deserialize_with = "deserialize_duration_ms"
    )]
    pub duration: Duration,

    /// Non-fatal anomalies encountered during analysis; null when none.
    pub warnings: Option<Vec<String>>,
}

impl Metadata {
    pub fn current() -> Self {
        Self {
            gaze_version: env!("CARGO_PKG_VERSION").to_string(),
            rust_version: rust_version(),
            duration: Duration::ZERO,
            warnings: None,
        }
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.get_or_insert_with(Vec::new).push(warning.into());
    }
}

/// Toolchain version captured at build time when available.
fn rust_version() -> String {
    option_env!("GAZE_RUSTC_VERSION")
        .unwrap_or("rustc-unknown")
        .to_string()
}

/// Complete analysis output for one function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub target: FunctionTarget,

    pub side_effects: Vec<SideEffect>,

    pub metadata: Metadata,
}

/// Produce the stable, deterministic ID for a side effect: "se-" plus
/// the first 8 hex characters of SHA-256 over
/// `package:function:kind:location`.
pub fn generate_id(package: &str, function: &str, kind: EffectKind, location: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(package.as_bytes());
    hasher.update(b":");
    hasher.update(function.as_bytes());
    hasher.update(b":");
    hasher.update(kind.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(location.as_bytes());
    let digest = hasher.finalize();
    let mut id = String::with_capacity(11);
    id.push_str("se-");
    for byte in &digest[..4] {
        id.push_str(&format!("{byte:02x}"));
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_id_is_deterministic() {
        let a = generate_id("pkg/foo", "save", EffectKind::ReceiverMutation, "foo.rs:10:2");
        let b = generate_id("pkg/foo", "save", EffectKind::ReceiverMutation, "foo.rs:10:2");
        assert_eq!(a, b);
    }

    #[test]
    fn generate_id_format() {
        let id = generate_id("pkg/foo", "save", EffectKind::ReceiverMutation, "foo.rs:10:2");
        assert_eq!(id.len(), 11, "se- plus 8 hex chars: {id}");
        assert!(id.starts_with("se-"));
        assert!(id[3..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generate_id_varies_with_inputs() {
        let base = generate_id("pkg/foo", "save", EffectKind::ReceiverMutation, "foo.rs:10:2");
        let other_kind = generate_id("pkg/foo", "save", EffectKind::ReturnValue, "foo.rs:10:2");
        let other_fn = generate_id("pkg/foo", "load", EffectKind::ReceiverMutation, "foo.rs:20:2");
        assert_ne!(base, other_kind);
        assert_ne!(base, other_fn);
    }

    #[test]
    fn p0_kinds_map_to_p0() {
        for kind in [
            EffectKind::ReturnValue,
            EffectKind::ErrorReturn,
            EffectKind::SentinelError,
            EffectKind::ReceiverMutation,
            EffectKind::PointerArgMutation,
        ] {
            assert_eq!(kind.tier(), Tier::P0, "{kind}");
        }
    }

    #[test]
    fn deferred_return_mutation_is_p1() {
        assert_eq!(EffectKind::DeferredReturnMutation.tier(), Tier::P1);
    }

    #[test]
    fn label_values_are_lowercase() {
        assert_eq!(Label::Contractual.as_str(), "contractual");
        assert_eq!(Label::Incidental.as_str(), "incidental");
        assert_eq!(Label::Ambiguous.as_str(), "ambiguous");
    }

    #[test]
    fn qualified_name_includes_receiver() {
        let plain = FunctionTarget {
            package: "demo".into(),
            function: "parse_config".into(),
            receiver: None,
            signature: "fn parse_config()".into(),
            location: "demo/lib.rs:1:1".into(),
        };
        assert_eq!(plain.qualified_name(), "parse_config");

        let method = FunctionTarget {
            receiver: Some("&mut Store".into()),
            function: "save".into(),
            ..plain
        };
        assert_eq!(method.qualified_name(), "(&mut Store).save");
    }
}
