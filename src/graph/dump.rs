//! Human-readable listing of parsed task records.

use std::fmt::Write;

use super::record::TaskRecords;

/// Render every task with its parameters, sources and next tasks.
pub fn describe(records: &TaskRecords) -> String {
    let mut out = String::new();
    for record in records.iter() {
        let _ = writeln!(out, " ----- ");
        let _ = writeln!(out, "Task:");
        let _ = writeln!(out, "{}", record.identity());
        let _ = writeln!(out, "Parameters:");
        for (name, value) in record.parameters.iter() {
            let _ = writeln!(out, "{}: {}", name, value);
        }
        let _ = writeln!(out, "Sources:");
        for source in &record.sources {
            let _ = writeln!(out, "{}: {}", source.key(), source);
        }
        let _ = writeln!(out, "Next Task:");
        for next in &record.next_tasks {
            let _ = writeln!(out, "{}: {}", next.key(), next);
        }
        out.push('\n');
    }
    out
}
