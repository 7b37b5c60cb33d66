//! Interfaces to the build driver: targets to check and toolchain configurations.

use std::path::{Path, PathBuf};

/// One thing to build, as seen by the history table.
///
/// Source paths are absolute; the table converts them to paths relative to
/// its output directory when recording.
pub trait BuildTarget {
    /// Current input files of the output.
    fn sources(&self) -> &[PathBuf];

    /// Output file.
    fn output(&self) -> &Path;

    /// Signature of the toolchain invocation that builds the output.
    fn configuration(&self) -> &str;

    /// Whether the target is already flagged for rebuild.
    fn rebuild(&self) -> bool;

    /// Flag the target for rebuild.
    fn must_rebuild(&mut self);
}

/// Extra build information a configuration may need to name its outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildMetadata {
    /// Product or library version, used for versioned output names
    pub version: Option<String>,
}

/// A toolchain configuration (compiler or linker with its options).
pub trait ProcessorConfiguration {
    /// Signature identifying the exact invocation.
    fn identifier(&self) -> &str;

    /// Output file names, relative to the output directory, produced from `source`.
    fn output_file_names(&self, source: &Path, metadata: &BuildMetadata) -> Vec<String>;
}

/// A build target descriptor owned by the driver.
#[derive(Debug, Clone)]
pub struct TargetInfo {
    configuration: String,
    sources: Vec<PathBuf>,
    system_sources: Vec<PathBuf>,
    output: PathBuf,
    rebuild: bool,
}

impl TargetInfo {
    /// Create a descriptor.
    pub fn new(
        configuration: impl Into<String>,
        sources: Vec<PathBuf>,
        system_sources: Vec<PathBuf>,
        output: PathBuf,
        rebuild: bool,
    ) -> Self {
        Self {
            configuration: configuration.into(),
            sources,
            system_sources,
            output,
            rebuild,
        }
    }

    /// Library or object files supplied by the toolchain itself.
    #[must_use]
    pub fn system_sources(&self) -> &[PathBuf] {
        &self.system_sources
    }

    /// Sources followed by system sources, as passed to a linker.
    #[must_use]
    pub fn all_sources(&self) -> Vec<PathBuf> {
        self.sources
            .iter()
            .chain(&self.system_sources)
            .cloned()
            .collect()
    }
}

impl BuildTarget for TargetInfo {
    fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    fn output(&self) -> &Path {
        &self.output
    }

    fn configuration(&self) -> &str {
        &self.configuration
    }

    fn rebuild(&self) -> bool {
        self.rebuild
    }

    fn must_rebuild(&mut self) {
        self.rebuild = true;
    }
}

/// Configuration that maps `dir/name.c` to `name.<extension>`.
///
/// With [`SimpleConfiguration::versioned`] and a version in the metadata the
/// name becomes `name.<extension>.<version>`, the way shared libraries are
/// usually named.
#[derive(Debug, Clone)]
pub struct SimpleConfiguration {
    identifier: String,
    extension: String,
    versioned: bool,
}

impl SimpleConfiguration {
    /// Configuration with the given signature and output extension.
    pub fn new(identifier: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            extension: extension.into(),
            versioned: false,
        }
    }

    /// Append the metadata version to output names.
    #[must_use]
    pub fn versioned(mut self) -> Self {
        self.versioned = true;
        self
    }
}

impl ProcessorConfiguration for SimpleConfiguration {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn output_file_names(&self, source: &Path, metadata: &BuildMetadata) -> Vec<String> {
        let Some(stem) = source.file_stem() else {
            return Vec::new();
        };
        let mut name = format!("{}.{}", stem.to_string_lossy(), self.extension);
        if self.versioned
            && let Some(version) = &metadata.version
        {
            name.push('.');
            name.push_str(version);
        }
        vec![name]
    }
}
