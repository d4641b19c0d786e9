//! Report envelope and serialization-contract tests.

use gaze::analysis::{self, Options as AnalysisOptions};
use gaze::classify::{self, Options as ClassifyOptions};
use gaze::config::GazeConfig;
use gaze::program::{Package, Program};
use gaze::report;
use gaze::taxonomy::{
    generate_id, Classification, EffectKind, Label, SideEffect, Signal, Tier,
};

const SRC: &str = r#"
/// Returns the number of items saved.
pub fn save_items(items: &[u64]) -> Result<usize, StoreError> {
    Ok(items.len())
}
"#;

fn classified_results() -> Vec<gaze::AnalysisResult> {
    let program = Program::new(vec![Package::from_source("store", SRC).unwrap()]);
    let mut results =
        analysis::analyze(&program, "store", &AnalysisOptions::default()).unwrap();
    let config = GazeConfig::default();
    classify::classify(
        &mut results,
        &ClassifyOptions {
            config: &config,
            program: &program,
            verbose: false,
        },
    );
    results
}

#[test]
fn json_envelope_matches_the_schema_shape() {
    let mut out = Vec::new();
    report::json::write_json(&mut out, &classified_results()).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(value["version"], report::REPORT_VERSION);
    let result = &value["results"][0];
    assert_eq!(result["target"]["package"], "store");
    assert_eq!(result["target"]["function"], "save_items");
    assert!(result["target"]["receiver"].is_null() || result["target"].get("receiver").is_none());

    let effects = result["side_effects"].as_array().unwrap();
    assert_eq!(effects.len(), 2);
    for effect in effects {
        for key in ["id", "type", "tier", "location", "description", "target"] {
            assert!(effect.get(key).is_some(), "missing {key}: {effect}");
        }
        let classification = &effect["classification"];
        assert!(classification["confidence"].is_u64());
        let label = classification["label"].as_str().unwrap();
        assert!(["contractual", "incidental", "ambiguous"].contains(&label));
        for signal in classification["signals"].as_array().unwrap() {
            assert!(signal.get("source").is_some());
            assert!(signal.get("weight").is_some());
            // Non-verbose output must suppress the detail fields.
            assert!(signal.get("source_file").is_none(), "{signal}");
            assert!(signal.get("excerpt").is_none(), "{signal}");
            assert!(signal.get("reasoning").is_none(), "{signal}");
        }
    }

    assert!(result["metadata"]["duration_ms"].is_u64());
}

#[test]
fn text_report_summarizes_tiers_and_totals() {
    let mut out = Vec::new();
    report::text::write_text(&mut out, &classified_results()).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("=== save_items ==="), "{text}");
    assert!(text.contains("ReturnValue"), "{text}");
    assert!(text.contains("ErrorReturn"), "{text}");
    assert!(text.contains("Summary: P0: 2"), "{text}");
    assert!(text.contains("1 function(s) analyzed, 2 side effect(s) detected"));
}

#[test]
fn unclassified_effects_omit_the_classification_key() {
    let effect = SideEffect {
        id: generate_id("pkg", "f", EffectKind::ReturnValue, "pkg/lib.rs:1:1"),
        kind: EffectKind::ReturnValue,
        tier: Tier::P0,
        location: "pkg/lib.rs:1:1".into(),
        description: "returns i32".into(),
        target: "i32".into(),
        classification: None,
    };

    let json = serde_json::to_string(&effect).unwrap();
    assert!(!json.contains("classification"), "{json}");
    assert!(json.contains("\"type\":\"ReturnValue\""), "{json}");
}

#[test]
fn bare_signals_omit_empty_detail_fields() {
    let signal = Signal::new("naming", 10);
    let json = serde_json::to_string(&signal).unwrap();
    assert!(!json.contains("source_file"), "{json}");
    assert!(!json.contains("excerpt"), "{json}");
    assert!(!json.contains("reasoning"), "{json}");
}

#[test]
fn classifications_round_trip_through_json() {
    let classification = Classification {
        label: Label::Contractual,
        confidence: 87,
        signals: vec![
            Signal::new("interface", 30)
                .with_source_file("store.rs")
                .with_excerpt("trait Store")
                .with_reasoning("method satisfies a trait contract"),
            Signal::new("caller", 12),
        ],
        reasoning: Some("strong contractual evidence".into()),
    };

    let json = serde_json::to_string(&classification).unwrap();
    let back: Classification = serde_json::from_str(&json).unwrap();

    assert_eq!(back, classification);
    assert!(json.contains("\"label\":\"contractual\""), "{json}");
}
