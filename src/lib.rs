//! # Gaze
//!
//! A static analyzer that detects the observable side effects of Rust
//! functions and classifies each one as **contractual** (part of the
//! function's public meaning), **incidental** (an implementation
//! detail), or **ambiguous**.
//!
//! Two pipelines:
//!
//! 1. **Effect detection**: walks each function's syntax tree and
//!    emits a taxonomy-tagged list of side effects (return values,
//!    error returns, receiver and argument mutation, sentinel errors,
//!    deferred return mutation), each with a deterministic fingerprint
//!    that is stable across runs and machines.
//! 2. **Classification**: five mechanical signal analyzers (trait
//!    satisfaction, API visibility, caller count, naming convention,
//!    doc comment) vote with integer weights; the score composer fuses
//!    them into a bounded confidence and a label, with a fixed penalty
//!    when the evidence contradicts itself.
//!
//! A secondary pipeline computes per-function CRAP scores by fusing
//! cyclomatic complexity with LCOV test coverage.
//!
//! ## Example
//!
//! ```
//! use gaze::analysis;
//! use gaze::program::{Package, Program};
//! use gaze::taxonomy::EffectKind;
//!
//! let package = Package::from_source(
//!     "demo",
//!     "pub fn checksum(data: &[u8]) -> u32 { data.len() as u32 }",
//! )
//! .unwrap();
//! let program = Program::new(vec![package]);
//!
//! let function = program
//!     .package("demo")
//!     .unwrap()
//!     .find_function("checksum")
//!     .unwrap();
//! let result = analysis::analyze_function(function);
//!
//! assert_eq!(result.side_effects.len(), 1);
//! assert_eq!(result.side_effects[0].kind, EffectKind::ReturnValue);
//! assert_eq!(result.side_effects[0].target, "u32");
//! ```

pub mod analysis;
pub mod classify;
pub mod cli;
pub mod config;
pub mod crap;
pub mod errors;
pub mod observability;
pub mod program;
pub mod report;
pub mod taxonomy;

pub use crate::errors::{GazeError, Result};
pub use crate::program::{FnHandle, Package, Program};
pub use crate::taxonomy::{
    AnalysisResult, Classification, EffectKind, FunctionTarget, Label, Metadata, SideEffect,
    Signal, Tier,
};
