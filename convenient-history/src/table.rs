//! The build history of one output directory.
//!
//! A [`TargetHistoryTable`] lives for a single build run:
//!
//! 1. [`TargetHistoryTable::open`] loads `history.xml`, dropping every record
//!    whose output is gone or carries a different timestamp than recorded.
//! 2. [`TargetHistoryTable::mark_for_rebuild`] is asked once per target while
//!    planning.
//! 3. One of the `update_*` methods records each output that was really
//!    produced.
//! 4. [`TargetHistoryTable::commit`] rewrites the file if anything changed.
//!
//! Output timestamps are compared within a [`Tolerance`] when loading;
//! source timestamps must match exactly when checking staleness.

use crate::config::HistoryConfig;
use crate::descriptor::{BuildMetadata, BuildTarget, ProcessorConfiguration};
use crate::error::{HistoryError, HistoryResult};
use crate::format;
use crate::paths;
use crate::source::SourceHistory;
use crate::target::TargetHistory;
use crate::timestamp::{Timestamp, Tolerance};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outputs of one directory mapped to the record of their last build.
///
/// At most one record exists per output name; a later update replaces the
/// earlier one regardless of its configuration.
#[derive(Debug)]
pub struct TargetHistoryTable {
    history: HashMap<String, TargetHistory>,
    dirty: bool,
    output_dir: PathBuf,
    history_file: PathBuf,
    build_epoch: Timestamp,
    tolerance: Tolerance,
}

impl TargetHistoryTable {
    /// Open the history of `output_dir` with the default configuration.
    pub fn open<P: AsRef<Path>>(output_dir: P) -> HistoryResult<Self> {
        Self::open_with_config(output_dir, &HistoryConfig::default())
    }

    /// Open the history of `output_dir`.
    ///
    /// A missing history file is created empty right away: its modification
    /// time marks the start of this run and lets [`Self::update_output`]
    /// tell fresh outputs from artifacts of an earlier attempt. A history
    /// file that cannot be read or parsed is logged and ignored.
    pub fn open_with_config<P: AsRef<Path>>(
        output_dir: P,
        config: &HistoryConfig,
    ) -> HistoryResult<Self> {
        config.validate()?;
        let output_dir = output_dir.as_ref();
        if !output_dir.exists() {
            return Err(HistoryError::MissingDirectory(output_dir.to_path_buf()));
        }
        if !output_dir.is_dir() {
            return Err(HistoryError::NotADirectory(output_dir.to_path_buf()));
        }

        let output_dir = paths::canonical_or_absolute(output_dir);
        let history_file = output_dir.join(&config.file_name);
        let tolerance = config.tolerance();

        let history = if history_file.exists() {
            Self::load(&output_dir, &history_file, tolerance)
        } else {
            debug!("Creating empty history {}", history_file.display());
            fs::write(&history_file, format::EMPTY_HISTORY).map_err(|source| {
                HistoryError::CreateHistoryFile {
                    path: history_file.clone(),
                    source,
                }
            })?;
            HashMap::new()
        };

        let build_epoch = Timestamp::read(&history_file).map_err(|source| HistoryError::Io {
            path: history_file.clone(),
            source,
        })?;

        Ok(Self {
            history,
            dirty: false,
            output_dir,
            history_file,
            build_epoch,
            tolerance,
        })
    }

    fn load(
        output_dir: &Path,
        history_file: &Path,
        tolerance: Tolerance,
    ) -> HashMap<String, TargetHistory> {
        let mut history = HashMap::new();

        let records = fs::read_to_string(history_file)
            .map_err(|source| HistoryError::Io {
                path: history_file.to_path_buf(),
                source,
            })
            .and_then(|text| format::read_history(&text));
        let records = match records {
            Ok(records) => records,
            Err(e) => {
                warn!("Error reading {}: {}", history_file.display(), e);
                return history;
            }
        };

        let total = records.len();
        for record in records {
            let output = output_dir.join(record.output());
            let Some(actual) = Timestamp::of(&output) else {
                debug!("Dropping history of {}: output missing", record.output());
                continue;
            };
            if !tolerance.within(actual, record.output_last_modified()) {
                debug!(
                    "Dropping history of {}: output modified at {}, recorded {}",
                    record.output(),
                    actual,
                    record.output_last_modified()
                );
                continue;
            }
            let _ = history.insert(record.output().to_string(), record);
        }

        info!(
            "Loaded {} of {} history records from {}",
            history.len(),
            total,
            history_file.display()
        );
        history
    }

    /// Record for `output_name` if it was built with `configuration`.
    #[must_use]
    pub fn get(&self, configuration: &str, output_name: &str) -> Option<&TargetHistory> {
        self.history
            .get(output_name)
            .filter(|record| record.configuration() == configuration)
    }

    /// Flag `target` for rebuild unless its history shows it is up to date.
    ///
    /// A target is up to date when a record exists for its output name and
    /// configuration, it has as many sources as recorded, and every recorded
    /// source is still an input with exactly the recorded timestamp.
    pub fn mark_for_rebuild<T: BuildTarget + ?Sized>(&self, target: &mut T) {
        if target.rebuild() {
            return;
        }

        let output_name = output_name(target.output());
        let Some(record) = self.get(target.configuration(), &output_name) else {
            if self.history.contains_key(&output_name) {
                debug!("Rebuild {output_name}: configuration changed");
            } else {
                debug!("Rebuild {output_name}: no history");
            }
            target.must_rebuild();
            return;
        };

        let sources = target.sources();
        if record.sources().len() != sources.len() {
            debug!(
                "Rebuild {output_name}: {} sources recorded, {} now",
                record.sources().len(),
                sources.len()
            );
            target.must_rebuild();
            return;
        }

        let current: HashMap<PathBuf, &PathBuf> = sources
            .iter()
            .map(|source| (paths::canonical_or_absolute(source), source))
            .collect();

        for source in record.sources() {
            let absolute = source.absolute_path(&self.output_dir);
            let Some(path) = current.get(&absolute) else {
                debug!(
                    "Rebuild {output_name}: {} is no longer an input",
                    absolute.display()
                );
                target.must_rebuild();
                return;
            };
            if Timestamp::of(path) != Some(source.last_modified()) {
                debug!("Rebuild {output_name}: {} changed", path.display());
                target.must_rebuild();
                return;
            }
        }

        debug!("{output_name} is up to date");
    }

    /// [`Self::mark_for_rebuild`] for every target.
    pub fn mark_all_for_rebuild<'t, T, I>(&self, targets: I)
    where
        T: BuildTarget + 't,
        I: IntoIterator<Item = &'t mut T>,
    {
        for target in targets {
            self.mark_for_rebuild(target);
        }
    }

    /// Record the outputs of a compile step that built each of `sources` separately.
    ///
    /// Returns how many outputs were recorded.
    pub fn update_compiled<P: AsRef<Path>>(
        &mut self,
        config: &dyn ProcessorConfiguration,
        sources: &[P],
        metadata: &BuildMetadata,
    ) -> usize {
        let mut recorded = 0;
        for source in sources {
            let source = source.as_ref();
            for output_name in config.output_file_names(source, metadata) {
                if self.update_output(config.identifier(), &output_name, &[source]) {
                    recorded += 1;
                }
            }
        }
        recorded
    }

    /// Record that `output_name` was built from `sources` with `configuration`.
    ///
    /// Nothing is recorded when the output is missing or older than the
    /// history file itself, since that means this run did not produce it.
    /// Returns whether a record was written.
    pub fn update_output<P: AsRef<Path>>(
        &mut self,
        configuration: &str,
        output_name: &str,
        sources: &[P],
    ) -> bool {
        let output = self.output_dir.join(output_name);
        let Some(output_modified) = self.fresh_output(&output, output_name) else {
            return false;
        };
        self.record(configuration, output_name, output_modified, sources);
        true
    }

    /// Record a link step from its target descriptor.
    ///
    /// The descriptor's output path is checked, wherever it lives; the
    /// record is keyed by its file name. Returns whether a record was written.
    pub fn update_linked<T: BuildTarget + ?Sized>(&mut self, target: &T) -> bool {
        let output_name = output_name(target.output());
        let Some(output_modified) = self.fresh_output(target.output(), &output_name) else {
            return false;
        };
        self.record(
            target.configuration(),
            &output_name,
            output_modified,
            target.sources(),
        );
        true
    }

    fn fresh_output(&self, output: &Path, output_name: &str) -> Option<Timestamp> {
        let Some(modified) = Timestamp::of(output) else {
            debug!("Not recording {output_name}: output missing");
            return None;
        };
        if self.tolerance.is_significantly_before(modified, self.build_epoch) {
            debug!(
                "Not recording {output_name}: modified at {modified}, before this build started at {}",
                self.build_epoch
            );
            return None;
        }
        Some(modified)
    }

    fn record<P: AsRef<Path>>(
        &mut self,
        configuration: &str,
        output_name: &str,
        output_modified: Timestamp,
        sources: &[P],
    ) {
        let sources = sources
            .iter()
            .map(|source| self.source_history(source.as_ref()))
            .collect();
        self.replace(TargetHistory::new(
            configuration,
            output_name,
            output_modified,
            sources,
        ));
    }

    fn source_history(&self, source: &Path) -> SourceHistory {
        SourceHistory::new(
            paths::relative_path(&self.output_dir, source),
            Timestamp::of(source).unwrap_or(Timestamp::UNKNOWN),
        )
    }

    fn replace(&mut self, record: TargetHistory) {
        let _ = self.history.remove(record.output());
        let _ = self.history.insert(record.output().to_string(), record);
        self.dirty = true;
    }

    /// Rewrite the history file if any record changed since it was loaded.
    ///
    /// The file is overwritten in place. On failure the table stays dirty.
    pub fn commit(&mut self) -> HistoryResult<()> {
        if !self.dirty {
            debug!("History unchanged, not writing {}", self.history_file.display());
            return Ok(());
        }

        let text = format::write_history(self.history.values())?;
        fs::write(&self.history_file, text).map_err(|source| HistoryError::Io {
            path: self.history_file.clone(),
            source,
        })?;
        self.dirty = false;

        info!(
            "Wrote {} history records to {}",
            self.history.len(),
            self.history_file.display()
        );
        Ok(())
    }

    /// Whether records changed since load or the last commit.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// All records, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &TargetHistory> {
        self.history.values()
    }

    /// Canonical output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the history file.
    #[must_use]
    pub fn history_file(&self) -> &Path {
        &self.history_file
    }

    /// Modification time of the history file when the table was opened.
    #[must_use]
    pub fn build_epoch(&self) -> Timestamp {
        self.build_epoch
    }
}

fn output_name(output: &Path) -> String {
    output
        .file_name()
        .map_or_else(|| output.to_string_lossy(), |name| name.to_string_lossy())
        .into_owned()
}
