//! List history records

use convenient_history::{TargetHistory, TargetHistoryTable};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Print the retained records grouped by signature
pub fn execute(table: &TargetHistoryTable) {
    print!("{}", render(table));
}

fn render(table: &TargetHistoryTable) -> String {
    let mut by_signature: BTreeMap<&str, Vec<&TargetHistory>> = BTreeMap::new();
    for record in table.iter() {
        by_signature
            .entry(record.configuration())
            .or_default()
            .push(record);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} records)",
        table.history_file().display(),
        table.len()
    );
    for (signature, mut records) in by_signature {
        records.sort_by(|a, b| a.output().cmp(b.output()));
        let _ = writeln!(out, "\n[{signature}]");
        for record in records {
            let _ = writeln!(
                out,
                "  {}  {}",
                record.output(),
                record.output_last_modified()
            );
            for source in record.sources() {
                let _ = writeln!(
                    out,
                    "    <- {}  {}",
                    source.relative_path(),
                    source.last_modified()
                );
            }
        }
    }
    out
}
