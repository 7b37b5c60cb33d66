//! Up-to-date check for a single output

use super::absolute;
use convenient_history::{BuildTarget, TargetHistoryTable, TargetInfo};
use std::path::{Path, PathBuf};
use tracing::info;

/// Check one output against the history. Returns `true` when it must be rebuilt.
pub fn execute(
    table: &TargetHistoryTable,
    signature: &str,
    output: &Path,
    sources: &[PathBuf],
) -> bool {
    let output = if output.is_absolute() {
        output.to_path_buf()
    } else {
        table.output_dir().join(output)
    };
    let sources = sources.iter().map(|s| absolute(s)).collect();
    let mut target = TargetInfo::new(signature, sources, Vec::new(), output, false);

    table.mark_for_rebuild(&mut target);
    if target.rebuild() {
        info!("{} must be rebuilt", target.output().display());
        println!("rebuild");
    } else {
        println!("up-to-date");
    }
    target.rebuild()
}
