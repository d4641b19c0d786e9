//! Human-readable text report, formatted for an 80-column terminal.

use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::taxonomy::{AnalysisResult, Tier};

const MAX_DESCRIPTION: usize = 50;

/// Write analysis results as a per-function table with a trailing
/// totals line.
pub fn write_text<W: Write>(mut w: W, results: &[AnalysisResult]) -> io::Result<()> {
    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        write_one_result(&mut w, result)?;
    }

    let total: usize = results.iter().map(|r| r.side_effects.len()).sum();
    writeln!(
        w,
        "\n{} function(s) analyzed, {} side effect(s) detected",
        results.len(),
        total
    )?;

    Ok(())
}

fn write_one_result<W: Write>(w: &mut W, result: &AnalysisResult) -> io::Result<()> {
    writeln!(w, "=== {} ===", result.target.qualified_name())?;
    if !result.target.signature.is_empty() {
        writeln!(w, "    {}", result.target.signature)?;
    }
    writeln!(w, "    {}", result.target.location)?;

    if result.side_effects.is_empty() {
        writeln!(w, "    No side effects detected.")?;
        return Ok(());
    }

    writeln!(w)?;

    // Column widths are computed per result so the table stays tight.
    let type_width = result
        .side_effects
        .iter()
        .map(|e| e.kind.as_str().len())
        .max()
        .unwrap_or(4)
        .max("TYPE".len());

    writeln!(w, "    TIER  {:<type_width$}  DESCRIPTION", "TYPE")?;
    writeln!(w, "    ----  {:<type_width$}  -----------", "----")?;

    for effect in &result.side_effects {
        let mut description = effect.description.clone();
        if description.len() > MAX_DESCRIPTION {
            description.truncate(MAX_DESCRIPTION - 3);
            description.push_str("...");
        }
        writeln!(
            w,
            "    {}    {:<type_width$}  {}",
            effect.tier,
            effect.kind.as_str(),
            description
        )?;
    }

    let mut tier_counts: BTreeMap<Tier, usize> = BTreeMap::new();
    for effect in &result.side_effects {
        *tier_counts.entry(effect.tier).or_default() += 1;
    }
    let summary: Vec<String> = Tier::ALL
        .iter()
        .filter_map(|tier| tier_counts.get(tier).map(|count| format!("{tier}: {count}")))
        .collect();
    writeln!(w, "\n    Summary: {}", summary.join(", "))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{
        generate_id, EffectKind, FunctionTarget, Metadata, SideEffect,
    };

    fn sample_result() -> AnalysisResult {
        let kind = EffectKind::ReturnValue;
        AnalysisResult {
            target: FunctionTarget {
                package: "demo".into(),
                function: "single_return".into(),
                receiver: None,
                signature: "fn single_return() -> i32".into(),
                location: "demo/lib.rs:3:8".into(),
            },
            side_effects: vec![SideEffect {
                id: generate_id("demo", "single_return", kind, "demo/lib.rs:3:27"),
                kind,
                tier: kind.tier(),
                location: "demo/lib.rs:3:27".into(),
                description: "returns i32".into(),
                target: "i32".into(),
                classification: None,
            }],
            metadata: Metadata::current(),
        }
    }

    #[test]
    fn text_report_names_the_function_and_counts_effects() {
        let mut out = Vec::new();
        write_text(&mut out, &[sample_result()]).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("=== single_return ==="), "{text}");
        assert!(text.contains("ReturnValue"), "{text}");
        assert!(text.contains("Summary: P0: 1"), "{text}");
        assert!(text.contains("1 function(s) analyzed, 1 side effect(s) detected"));
    }

    #[test]
    fn empty_result_prints_a_note() {
        let mut result = sample_result();
        result.side_effects.clear();
        let mut out = Vec::new();
        write_text(&mut out, &[result]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("No side effects detected."), "{text}");
    }
}
