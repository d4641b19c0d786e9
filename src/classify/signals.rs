//! Mechanical signal analyzers.
//!
//! Each analyzer inspects one narrow slice of evidence and returns
//! `Some(Signal)` only when it actually found any; a missing signal
//! is never appended as a zero.

use crate::program::{FnHandle, Program};
use crate::taxonomy::Signal;

/// Weight for a method that satisfies a published trait contract.
const INTERFACE_WEIGHT: i32 = 30;

/// Weights for API surface visibility.
const EXPORTED_WEIGHT: i32 = 10;
const UNEXPORTED_WEIGHT: i32 = -5;

/// Weights for naming-convention matches.
const CONTRACTUAL_NAME_WEIGHT: i32 = 10;
const INCIDENTAL_NAME_WEIGHT: i32 = -10;

/// Weights for doc-comment phrase matches.
const CONTRACTUAL_DOC_WEIGHT: i32 = 15;
const INCIDENTAL_DOC_WEIGHT: i32 = -10;

/// Trait satisfaction: a method that fulfills a published contract
/// carries contractual weight regardless of caller count. The check
/// accepts an explicit `impl Trait for Type` naming the method, or
/// structural satisfaction against the memoized trait method sets.
pub fn interface_signal(program: &Program, handle: Option<FnHandle<'_>>) -> Option<Signal> {
    let handle = handle?;
    let receiver = handle.receiver_base()?;
    let method = handle.name();

    for tr in program.traits() {
        if !tr.methods.iter().any(|m| m == &method) {
            continue;
        }
        let satisfied =
            program.has_trait_impl(&tr.name, &receiver) || program.satisfies_trait(&receiver, tr);
        if satisfied {
            return Some(
                Signal::new("interface", INTERFACE_WEIGHT)
                    .with_source_file(tr.file.display().to_string())
                    .with_excerpt(format!("trait {}", tr.name))
                    .with_reasoning(format!(
                        "method '{method}' satisfies trait '{}' declared in package '{}'",
                        tr.name, tr.package
                    )),
            );
        }
    }
    None
}

/// API surface visibility. Test helpers contribute nothing.
pub fn visibility_signal(handle: Option<FnHandle<'_>>) -> Option<Signal> {
    let handle = handle?;
    if handle.in_test_file() {
        return None;
    }
    let signal = if handle.is_public() {
        Signal::new("visibility", EXPORTED_WEIGHT)
            .with_reasoning("function is part of the package's public API")
    } else {
        Signal::new("visibility", UNEXPORTED_WEIGHT).with_reasoning("function is not exported")
    };
    Some(signal.with_source_file(handle.file.path.display().to_string()))
}

/// Ordered prefix lists for the naming convention. The contractual
/// list is consulted first; the first list containing a match wins.
const CONTRACTUAL_PREFIXES: &[&str] = &[
    "get", "set", "save", "delete", "fetch", "load", "store", "read", "write", "handle", "parse",
    "encode", "decode", "update", "create", "remove",
];

const INCIDENTAL_PREFIXES: &[&str] = &["log", "debug", "trace", "print"];

/// Naming convention: case-sensitive whole-prefix match against the
/// identifier.
pub fn naming_signal(function: &str) -> Option<Signal> {
    if let Some(prefix) = CONTRACTUAL_PREFIXES
        .iter()
        .find(|p| function.starts_with(**p))
    {
        return Some(
            Signal::new("naming", CONTRACTUAL_NAME_WEIGHT).with_reasoning(format!(
                "function name matches contractual prefix '{prefix}'"
            )),
        );
    }
    if let Some(prefix) = INCIDENTAL_PREFIXES
        .iter()
        .find(|p| function.starts_with(**p))
    {
        return Some(
            Signal::new("naming", INCIDENTAL_NAME_WEIGHT).with_reasoning(format!(
                "function name matches incidental prefix '{prefix}'"
            )),
        );
    }
    None
}

const CONTRACTUAL_PHRASES: &[&str] = &["returns", "must", "guarantees", "on success", "implements"];

const INCIDENTAL_PHRASES: &[&str] = &["internal", "helper", "debug", "for testing"];

/// Doc-comment phrases on the function under analysis. Contractual
/// and incidental matches add when both are present.
pub fn rustdoc_signal(handle: Option<FnHandle<'_>>) -> Option<Signal> {
    let handle = handle?;
    let doc = handle.doc_comment();
    if doc.is_empty() {
        return None;
    }
    let lowered = doc.to_lowercase();

    let contractual: Vec<&str> = CONTRACTUAL_PHRASES
        .iter()
        .copied()
        .filter(|phrase| lowered.contains(phrase))
        .collect();
    let incidental: Vec<&str> = INCIDENTAL_PHRASES
        .iter()
        .copied()
        .filter(|phrase| lowered.contains(phrase))
        .collect();

    if contractual.is_empty() && incidental.is_empty() {
        return None;
    }

    let mut weight = 0;
    let mut matched = Vec::new();
    if !contractual.is_empty() {
        weight += CONTRACTUAL_DOC_WEIGHT;
        matched.extend(contractual);
    }
    if !incidental.is_empty() {
        weight += INCIDENTAL_DOC_WEIGHT;
        matched.extend(incidental);
    }

    let excerpt: String = doc.lines().next().unwrap_or_default().chars().take(80).collect();
    Some(
        Signal::new("rustdoc", weight)
            .with_source_file(handle.file.path.display().to_string())
            .with_excerpt(excerpt)
            .with_reasoning(format!("doc comment mentions {}", matched.join(", "))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naming_matches_contractual_prefixes() {
        for name in ["get_data", "save_record", "fetch_config", "delete_item", "handle_request"] {
            let signal = naming_signal(name).unwrap();
            assert_eq!(signal.weight, 10, "{name}");
        }
    }

    #[test]
    fn naming_matches_incidental_prefixes() {
        for name in ["log_error", "debug_trace", "trace_request", "print_result"] {
            let signal = naming_signal(name).unwrap();
            assert!(signal.weight < 0, "{name}");
        }
    }

    #[test]
    fn naming_is_silent_on_unmatched_names() {
        assert!(naming_signal("compute_hash").is_none());
    }

    #[test]
    fn naming_is_case_sensitive() {
        assert!(naming_signal("GetData").is_none());
    }
}
