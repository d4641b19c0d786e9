//! Contractual classification: fuses mechanical evidence signals into
//! a bounded confidence score and a label for every detected effect.
//!
//! The five analyzers run in a fixed order (interface, visibility,
//! caller, naming, rustdoc); each is pure over the borrowed program
//! and yields at most one weighted signal. The composer does the rest.

pub mod callers;
pub mod score;
pub mod signals;

use crate::config::GazeConfig;
use crate::program::{FnHandle, Program};
use crate::taxonomy::{AnalysisResult, Signal, PACKAGE_FUNCTION};

/// Classification options.
pub struct Options<'p> {
    pub config: &'p GazeConfig,

    /// The whole program, for trait satisfaction and caller counting
    /// across packages.
    pub program: &'p Program,

    /// Controls whether signal detail fields (source file, excerpt,
    /// reasoning) are kept; they are suppressed otherwise.
    pub verbose: bool,
}

/// Attach a classification to every side effect in the given results.
/// This is the only mutation the result envelope permits.
pub fn classify(results: &mut [AnalysisResult], options: &Options<'_>) {
    for result in results.iter_mut() {
        let handle = resolve_function(options.program, result);
        let function = result.target.function.clone();
        let package = result.target.package.clone();

        for effect in &mut result.side_effects {
            let signals = collect_signals(options, handle, &package, &function);
            let mut classification =
                score::compute_score(signals, &options.config.classification.thresholds);
            if !options.verbose {
                for signal in &mut classification.signals {
                    signal.strip_details();
                }
            }
            effect.classification = Some(classification);
        }
    }
}

/// Run the analyzers in their fixed order, keeping only actual
/// evidence.
fn collect_signals(
    options: &Options<'_>,
    handle: Option<FnHandle<'_>>,
    package: &str,
    function: &str,
) -> Vec<Signal> {
    let mut signals = Vec::new();

    if let Some(signal) = signals::interface_signal(options.program, handle) {
        signals.push(signal);
    }
    if let Some(signal) = signals::visibility_signal(handle) {
        signals.push(signal);
    }
    if let Some(signal) = callers::caller_signal(options.program, package, function) {
        signals.push(signal);
    }
    if let Some(signal) = signals::naming_signal(function) {
        signals.push(signal);
    }
    if let Some(signal) = signals::rustdoc_signal(handle) {
        signals.push(signal);
    }

    signals
}

/// Find the declaration behind a result target. The synthetic
/// `<package>` target has none; its effects classify on base
/// confidence alone.
fn resolve_function<'p>(program: &'p Program, result: &AnalysisResult) -> Option<FnHandle<'p>> {
    if result.target.function == PACKAGE_FUNCTION {
        return None;
    }
    let package = program.package(&result.target.package)?;
    match &result.target.receiver {
        Some(receiver) => package.find_method(&bare_type_name(receiver), &result.target.function),
        None => package.find_function(&result.target.function),
    }
}

/// Strip reference sigils and generics off a rendered receiver type:
/// `&mut Store<T>` names `Store`.
fn bare_type_name(receiver: &str) -> String {
    let stripped = receiver
        .trim_start_matches('&')
        .trim_start_matches("mut ")
        .trim();
    stripped
        .split('<')
        .next()
        .unwrap_or(stripped)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_type_name_strips_sigils_and_generics() {
        assert_eq!(bare_type_name("&mut Store"), "Store");
        assert_eq!(bare_type_name("&Store"), "Store");
        assert_eq!(bare_type_name("Store<T>"), "Store");
        assert_eq!(bare_type_name("&mut Cache<K, V>"), "Cache");
    }
}
