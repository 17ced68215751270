//! Rendering of memsweep run reports
//!
//! This crate turns a [`RunReport`] into caller-facing output:
//!
//! - an aligned text table for terminals
//! - pretty-printed JSON for files and pipelines
//!
//! Rendering is deliberately outside the engine; the core only produces the
//! report and the event stream.

#![warn(missing_docs)]
#![warn(clippy::all)]

use memsweep_core::RunReport;

/// Render a report as an aligned text table, one row per resource step
///
/// Percentile columns follow the rank set of the run. An empty report
/// renders a single placeholder line.
pub fn render_table(report: &RunReport) -> String {
    let Some(first) = report.iter().next() else {
        return "(no completed steps)\n".to_string();
    };

    let ranks: Vec<u8> = first.report.percentiles.keys().copied().collect();

    let mut header = vec![
        "memory_mb".to_string(),
        "min".to_string(),
        "max".to_string(),
        "avg".to_string(),
    ];
    header.extend(ranks.iter().map(|p| format!("p{p}")));

    let mut rows = Vec::with_capacity(report.len());
    for entry in report {
        let mut row = vec![
            entry.memory_mb.to_string(),
            entry.report.min.to_string(),
            entry.report.max.to_string(),
            entry.report.avg.to_string(),
        ];
        row.extend(
            ranks
                .iter()
                .map(|p| entry.report.percentiles.get(p).map_or_else(|| "-".into(), |v| v.to_string())),
        );
        rows.push(row);
    }

    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r[i].len())
                .chain(std::iter::once(h.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, &header, &widths);
    push_separator(&mut out, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(&" ".repeat(widths[i] - cell.len()));
        out.push_str(cell);
    }
    out.push('\n');
}

fn push_separator(out: &mut String, widths: &[usize]) {
    for (i, w) in widths.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(&"-".repeat(*w));
    }
    out.push('\n');
}

/// Serialize a report as pretty-printed JSON
pub fn render_json(report: &RunReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
