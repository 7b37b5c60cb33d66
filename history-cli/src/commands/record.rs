use super::absolute;
use convenient_history::{HistoryResult, TargetHistoryTable};
use std::path::PathBuf;
use tracing::warn;

/// Record a built output and write the history file.
///
/// Returns whether the output was recorded.
pub fn execute(
    table: &mut TargetHistoryTable,
    signature: &str,
    output: &str,
    sources: &[PathBuf],
) -> HistoryResult<bool> {
    let sources: Vec<PathBuf> = sources.iter().map(|s| absolute(s)).collect();
    let recorded = table.update_output(signature, output, &sources);
    if recorded {
        table.commit()?;
        println!("recorded {output}");
    } else {
        warn!("{output} was not recorded: missing or older than {}", table.history_file().display());
    }
    Ok(recorded)
}
