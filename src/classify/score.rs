//! Score composer: signals in, label and bounded confidence out.

use crate::config::Thresholds;
use crate::taxonomy::{Classification, Label, Signal};

/// Neutral starting confidence before any evidence is applied.
const BASE_CONFIDENCE: i32 = 50;

/// Penalty applied when the evidence pulls in both directions.
const CONTRADICTION_PENALTY: i32 = 20;

/// Compose a classification from the collected signals:
/// base 50 plus the signal weights, minus the contradiction penalty
/// when both strictly-positive and strictly-negative evidence is
/// present, clamped to 0..=100, labeled against the thresholds.
pub fn compute_score(signals: Vec<Signal>, thresholds: &Thresholds) -> Classification {
    let mut score: i32 = BASE_CONFIDENCE + signals.iter().map(|s| s.weight).sum::<i32>();

    let has_positive = signals.iter().any(|s| s.weight > 0);
    let has_negative = signals.iter().any(|s| s.weight < 0);
    let contradictory = has_positive && has_negative;
    if contradictory {
        score -= CONTRADICTION_PENALTY;
    }

    let confidence = score.clamp(0, 100) as u8;

    let label = if confidence >= thresholds.contractual {
        Label::Contractual
    } else if confidence < thresholds.incidental {
        Label::Incidental
    } else {
        Label::Ambiguous
    };

    let reasoning = if signals.is_empty() {
        "no evidence; using base confidence".to_string()
    } else if contradictory {
        format!(
            "confidence {confidence} from {} signal(s); contradictory evidence penalized",
            signals.len()
        )
    } else {
        format!("confidence {confidence} from {} signal(s)", signals.len())
    };

    Classification {
        label,
        confidence,
        signals,
        reasoning: Some(reasoning),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> Thresholds {
        Thresholds::default()
    }

    #[test]
    fn empty_signals_score_base_and_ambiguous() {
        let c = compute_score(Vec::new(), &thresholds());
        assert_eq!(c.confidence, 50);
        assert_eq!(c.label, Label::Ambiguous);
    }

    #[test]
    fn strong_positive_evidence_is_contractual() {
        let c = compute_score(
            vec![Signal::new("interface", 30), Signal::new("visibility", 10)],
            &thresholds(),
        );
        assert_eq!(c.confidence, 90);
        assert_eq!(c.label, Label::Contractual);
    }

    #[test]
    fn negative_evidence_is_incidental() {
        let c = compute_score(vec![Signal::new("naming", -10)], &thresholds());
        assert_eq!(c.confidence, 40);
        assert_eq!(c.label, Label::Incidental);
    }

    #[test]
    fn contradiction_applies_fixed_penalty() {
        let c = compute_score(
            vec![Signal::new("interface", 30), Signal::new("naming", -10)],
            &thresholds(),
        );
        // 50 + 30 - 10 - 20 = 50.
        assert_eq!(c.confidence, 50);
        assert_eq!(c.label, Label::Ambiguous);
    }

    #[test]
    fn confidence_clamps_to_zero() {
        let c = compute_score(
            vec![
                Signal::new("naming", -10),
                Signal::new("rustdoc", -15),
                Signal::new("another", -30),
            ],
            &thresholds(),
        );
        assert_eq!(c.confidence, 0);
    }

    #[test]
    fn confidence_clamps_to_hundred() {
        let c = compute_score(
            vec![
                Signal::new("interface", 30),
                Signal::new("visibility", 20),
                Signal::new("caller", 15),
                Signal::new("naming", 10),
                Signal::new("rustdoc", 15),
            ],
            &thresholds(),
        );
        assert_eq!(c.confidence, 100);
    }

    #[test]
    fn custom_thresholds_are_respected() {
        let custom = Thresholds {
            contractual: 90,
            incidental: 40,
        };
        let c = compute_score(
            vec![Signal::new("interface", 30), Signal::new("visibility", 10)],
            &custom,
        );
        assert_eq!(c.confidence, 90);
        assert_eq!(c.label, Label::Contractual);
    }

    #[test]
    fn identical_inputs_compose_identically() {
        let signals = vec![Signal::new("interface", 30), Signal::new("naming", 10)];
        let a = compute_score(signals.clone(), &thresholds());
        let b = compute_score(signals, &thresholds());
        assert_eq!(a, b);
    }

    #[test]
    fn removing_a_positive_signal_never_raises_confidence() {
        let full = vec![
            Signal::new("interface", 30),
            Signal::new("visibility", 10),
            Signal::new("naming", -10),
        ];
        let with = compute_score(full.clone(), &thresholds());
        for removed in 0..full.len() {
            let mut fewer = full.clone();
            let gone = fewer.remove(removed);
            let without = compute_score(fewer, &thresholds());
            if gone.weight > 0 {
                assert!(without.confidence <= with.confidence, "removed +{}", gone.weight);
            } else {
                assert!(without.confidence >= with.confidence, "removed {}", gone.weight);
            }
        }
    }
}
