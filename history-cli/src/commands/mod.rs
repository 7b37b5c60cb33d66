//! cpphistory command-line interface
//!
//! - `show`: list the records kept for an output directory
//! - `check`: decide whether one output must be rebuilt
//! - `record`: store the history of a freshly built output

use clap::{Parser, Subcommand};
use convenient_history::{HistoryConfig, HistoryResult, TargetHistoryTable};
use std::path::{Path, PathBuf};

pub mod check;
pub mod record;
pub mod show;

/// Inspect and maintain incremental build history
#[derive(Parser)]
#[command(name = "cpphistory")]
#[command(about = "Inspect and maintain the build history of an output directory")]
#[command(version)]
pub struct Cli {
    /// Output directory holding the history file
    #[arg(short, long, default_value = ".", env = "CPPHISTORY_DIR")]
    pub dir: PathBuf,

    /// YAML configuration file
    #[arg(short, long, env = "CPPHISTORY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the history records that are still valid
    Show,

    /// Check whether an output is up to date; exits with 1 if it must be rebuilt
    Check {
        /// Toolchain signature the output would be built with
        #[arg(short, long)]
        signature: String,

        /// Output path, relative to the output directory or absolute
        #[arg(short, long)]
        output: PathBuf,

        /// Input files of the output
        sources: Vec<PathBuf>,
    },

    /// Record that an output was just built from the given sources
    Record {
        /// Toolchain signature the output was built with
        #[arg(short, long)]
        signature: String,

        /// Output file name inside the output directory
        #[arg(short, long)]
        output: String,

        /// Input files of the output
        sources: Vec<PathBuf>,
    },
}

impl Cli {
    /// Open the history table selected by `--dir` and `--config`.
    pub fn open_table(&self) -> HistoryResult<TargetHistoryTable> {
        let config = match &self.config {
            Some(path) => HistoryConfig::load(path)?,
            None => HistoryConfig::default(),
        };
        TargetHistoryTable::open_with_config(&self.dir, &config)
    }
}

/// Resolve command-line paths against the working directory.
pub(crate) fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "cpphistory",
            "--dir",
            "build",
            "check",
            "-s",
            "gcc -c",
            "-o",
            "foo.o",
            "src/foo.c",
            "src/foo.h",
        ])
        .unwrap();
        assert_eq!(cli.dir, PathBuf::from("build"));
        match cli.command {
            Commands::Check {
                signature,
                output,
                sources,
            } => {
                assert_eq!(signature, "gcc -c");
                assert_eq!(output, PathBuf::from("foo.o"));
                assert_eq!(sources.len(), 2);
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn test_record_requires_signature() {
        assert!(Cli::try_parse_from(["cpphistory", "record", "-o", "foo.o"]).is_err());
    }
}
