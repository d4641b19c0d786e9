//! CRAP report writers.

use std::io::{self, Write};

use super::{Quadrant, Report, Score};

/// Write the CRAP report as formatted JSON.
pub fn write_json<W: Write>(mut writer: W, report: &Report) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    Ok(())
}

/// Write the CRAP report as human-readable text, worst scores first.
pub fn write_text<W: Write>(mut w: W, report: &Report) -> io::Result<()> {
    if report.scores.is_empty() {
        writeln!(w, "No functions analyzed.")?;
        return Ok(());
    }

    let mut sorted: Vec<&Score> = report.scores.iter().collect();
    sorted.sort_by(|a, b| b.crap.total_cmp(&a.crap));

    let function_width = sorted
        .iter()
        .map(|s| s.function.len())
        .max()
        .unwrap_or(8)
        .max("FUNCTION".len());

    writeln!(
        w,
        "CRAP     COMPLEXITY  COVERAGE  {:<function_width$}  FILE",
        "FUNCTION"
    )?;
    writeln!(
        w,
        "----     ----------  --------  {:<function_width$}  ----",
        "--------"
    )?;

    for score in &sorted {
        let marker = if score.crap >= report.summary.crap_threshold {
            " *"
        } else {
            ""
        };
        writeln!(
            w,
            "{:<7.1}{marker:<2}{:<10}  {:>6.1}%  {:<function_width$}  {}:{}",
            score.crap,
            score.complexity,
            score.line_coverage,
            score.function,
            shorten_path(&score.file.display().to_string()),
            score.line
        )?;
    }

    let summary = &report.summary;
    writeln!(w)?;
    writeln!(w, "--- Summary ---")?;
    writeln!(w, "Functions analyzed: {}", summary.total_functions)?;
    writeln!(w, "Avg complexity:     {:.1}", summary.avg_complexity)?;
    writeln!(w, "Avg line coverage:  {:.1}%", summary.avg_line_coverage)?;
    writeln!(w, "Avg CRAP score:     {:.1}", summary.avg_crap)?;
    writeln!(w, "CRAP threshold:     {:.0}", summary.crap_threshold)?;
    write!(w, "CRAPload:           {}", summary.crapload)?;
    if summary.crapload > 0 {
        write!(w, " (functions at or above threshold)")?;
    }
    writeln!(w)?;

    writeln!(w)?;
    writeln!(w, "--- Quadrant Breakdown ---")?;
    for quadrant in Quadrant::ALL {
        writeln!(
            w,
            "  {:<28}  {}",
            quadrant.to_string(),
            summary.quadrant_counts.get(quadrant)
        )?;
    }

    if !summary.worst.is_empty() {
        writeln!(w)?;
        writeln!(
            w,
            "--- Worst Offenders (top {} by CRAP) ---",
            summary.worst.len()
        )?;
        for (i, score) in summary.worst.iter().enumerate() {
            writeln!(
                w,
                "  {}. {:.1}  {}  ({}:{})",
                i + 1,
                score.crap,
                score.function,
                shorten_path(&score.file.display().to_string()),
                score.line
            )?;
        }
    }

    Ok(())
}

/// Trim long absolute paths down to their interesting tail.
fn shorten_path(path: &str) -> String {
    for marker in ["/src/", "/crates/", "/lib/"] {
        if let Some(idx) = path.rfind(marker) {
            return path[idx + 1..].to_string();
        }
    }
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() > 3 {
        parts[parts.len() - 3..].join("/")
    } else {
        path.to_string()
    }
}
