//! Persisted history file format.
//!
//! The file is a small tagged-record document:
//!
//! ```text
//! <?xml version='1.0' encoding='UTF-8'?>
//! <history>
//!    <processor signature="gcc -O2 ...">
//!       <target file="foo.o" lastModified="18c2f3a1b20">
//!          <source file="../src/foo.c" lastModified="18c2f3a0000"/>
//!       </target>
//!    </processor>
//! </history>
//! ```
//!
//! Timestamps are hexadecimal milliseconds so values survive a round trip
//! exactly. Tag and attribute names match what earlier versions of the
//! build tool wrote, so existing history files keep loading.

mod element;
mod reader;
mod records;
mod writer;

pub use element::Element;
pub use reader::parse_document;
pub use writer::{DECLARATION, write_document};

use crate::error::HistoryResult;
use crate::target::TargetHistory;

/// Content of a freshly created history file.
pub const EMPTY_HISTORY: &str = "<history/>";

/// Parse history text into target records.
///
/// A document without any element yields no records.
pub fn read_history(text: &str) -> HistoryResult<Vec<TargetHistory>> {
    match parse_document(text)? {
        Some(root) => records::decode(&root),
        None => Ok(Vec::new()),
    }
}

/// Render target records as history text.
pub fn write_history<'a>(
    records: impl IntoIterator<Item = &'a TargetHistory>,
) -> HistoryResult<String> {
    write_document(&records::encode(records))
}
