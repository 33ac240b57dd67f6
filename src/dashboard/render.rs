//! Plain-text rendering of runs and stored records.

use crate::consts::{PREVIEW_CHARS, preview};
use crate::orchestrator::RunResult;
use crate::store::StoredEntry;

/// Widest a table cell may get before it is cut.
const CELL_CHARS: usize = 40;

/// Shown for a field whose step failed.
const EMPTY_CELL: &str = "-";

/// Content preview, each step's output under its name, then failures.
pub fn render_run(run: &RunResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("source: {}\n", run.url));
    out.push_str("\nfetched content:\n");
    out.push_str(&format!("  {}\n", preview(&run.content, PREVIEW_CHARS)));

    for output in &run.outputs {
        out.push_str(&format!("\n[{}]\n{}\n", output.step, output.text.trim()));
    }

    if !run.failures.is_empty() {
        out.push('\n');
        for failure in &run.failures {
            out.push_str(&format!("✗ {}: {}\n", failure.step, failure.error));
        }
    }
    out
}

/// Render records as row/column tables, one table per record shape, rows
/// in insertion order.
pub fn render_table(entries: &[StoredEntry]) -> String {
    if entries.is_empty() {
        return "no results stored yet\n".to_string();
    }

    let mut kinds: Vec<&str> = Vec::new();
    for entry in entries {
        let kind = entry.record.kind();
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    kinds
        .iter()
        .map(|kind| {
            let rows: Vec<&StoredEntry> = entries
                .iter()
                .filter(|e| e.record.kind() == *kind)
                .collect();
            render_kind(&rows)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_kind(rows: &[&StoredEntry]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };

    let mut header: Vec<String> = vec!["id".to_string(), "created_at".to_string()];
    header.extend(first.record.fields().iter().map(|(name, _)| name.to_string()));

    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|entry| {
            let mut cells = vec![entry.id.to_string(), entry.created_at.clone()];
            cells.extend(
                entry
                    .record
                    .fields()
                    .into_iter()
                    .map(|(_, value)| cell(value)),
            );
            cells
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            std::iter::once(&header)
                .chain(body.iter())
                .map(|row| row[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&format_row(&header, &widths));
    out.push_str(&format!(
        "{}\n",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    ));
    for row in &body {
        out.push_str(&format_row(row, &widths));
    }
    out
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("{}\n", line.trim_end())
}

/// One line, cut to [`CELL_CHARS`].
fn cell(value: Option<&str>) -> String {
    match value {
        Some(v) => {
            let flat = v.split_whitespace().collect::<Vec<_>>().join(" ");
            preview(&flat, CELL_CHARS)
        }
        None => EMPTY_CELL.to_string(),
    }
}
