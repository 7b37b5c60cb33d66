//! Build history for incremental native builds.
//!
//! This crate remembers, per output directory, which sources produced which
//! outputs under which toolchain configuration, and uses that record together
//! with the current file timestamps to decide what must be rebuilt.
//!
//! # Features
//!
//! - Persistent `history.xml` per output directory, compatible with earlier writers
//! - Self-healing load: records of deleted or externally modified outputs are dropped
//! - Staleness by configuration signature, source set and exact source timestamps
//! - Guard against recording outputs a failed build step left behind
//!
//! # Example
//!
//! ```no_run
//! use convenient_history::{BuildTarget, TargetHistoryTable, TargetInfo};
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), convenient_history::HistoryError> {
//! let mut table = TargetHistoryTable::open("build/obj")?;
//!
//! let mut target = TargetInfo::new(
//!     "gcc -c -O2",
//!     vec![PathBuf::from("/work/src/foo.c")],
//!     Vec::new(),
//!     PathBuf::from("/work/build/obj/foo.o"),
//!     false,
//! );
//! table.mark_for_rebuild(&mut target);
//!
//! if target.rebuild() {
//!     // ... run the compiler ...
//!     let _ = table.update_output("gcc -c -O2", "foo.o", target.sources());
//! }
//! table.commit()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(unused_results)]

pub mod config;
pub mod descriptor;
pub mod error;
pub mod format;
pub mod paths;
pub mod source;
pub mod table;
pub mod target;
pub mod timestamp;

pub use config::{DEFAULT_HISTORY_FILE, HistoryConfig};
pub use descriptor::{
    BuildMetadata, BuildTarget, ProcessorConfiguration, SimpleConfiguration, TargetInfo,
};
pub use error::{HistoryError, HistoryResult};
pub use source::SourceHistory;
pub use table::TargetHistoryTable;
pub use target::TargetHistory;
pub use timestamp::{FILETIME_EPSILON_MS, Timestamp, Tolerance};
