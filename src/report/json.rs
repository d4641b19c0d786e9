//! JSON report writer.

use serde::Serialize;
use std::io::Write;

use super::REPORT_VERSION;
use crate::taxonomy::AnalysisResult;

#[derive(Serialize)]
struct Envelope<'a> {
    version: &'a str,
    results: &'a [AnalysisResult],
}

/// Write the `{version, results}` envelope as pretty-printed JSON.
pub fn write_json<W: Write>(mut writer: W, results: &[AnalysisResult]) -> anyhow::Result<()> {
    let envelope = Envelope {
        version: REPORT_VERSION,
        results,
    };
    serde_json::to_writer_pretty(&mut writer, &envelope)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{FunctionTarget, Metadata};

    #[test]
    fn envelope_has_version_and_results() {
        let results = vec![AnalysisResult {
            target: FunctionTarget {
                package: "demo".into(),
                function: "noop".into(),
                receiver: None,
                signature: "fn noop()".into(),
                location: "demo/lib.rs:1:1".into(),
            },
            side_effects: Vec::new(),
            metadata: Metadata::current(),
        }];

        let mut out = Vec::new();
        write_json(&mut out, &results).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["version"], REPORT_VERSION);
        assert_eq!(value["results"].as_array().unwrap().len(), 1);
        assert!(value["results"][0]["metadata"]["duration_ms"].is_u64());
        assert!(value["results"][0]["metadata"]["warnings"].is_null());
    }
}
