//! Mapping between target records and the `history > processor > target > source` tree.

use super::element::Element;
use crate::error::{HistoryError, HistoryResult};
use crate::source::SourceHistory;
use crate::target::TargetHistory;
use crate::timestamp::Timestamp;
use std::collections::BTreeMap;

const HISTORY: &str = "history";
const PROCESSOR: &str = "processor";
const TARGET: &str = "target";
const SOURCE: &str = "source";
const SIGNATURE: &str = "signature";
const FILE: &str = "file";
const LAST_MODIFIED: &str = "lastModified";

/// Extract every target record from a parsed document, in document order.
///
/// Targets of a `processor` without a `signature` are skipped; elements the
/// schema does not know are ignored together with their children.
pub fn decode(root: &Element) -> HistoryResult<Vec<TargetHistory>> {
    if root.name != HISTORY {
        return Err(HistoryError::InvalidRecord(format!(
            "root element is <{}>, expected <{HISTORY}>",
            root.name
        )));
    }

    let mut records = Vec::new();
    for processor in root.children_named(PROCESSOR) {
        let Some(signature) = processor.attribute(SIGNATURE) else {
            continue;
        };
        for target in processor.children_named(TARGET) {
            let sources = target
                .children_named(SOURCE)
                .map(|source| {
                    Ok(SourceHistory::new(
                        required(source, FILE)?,
                        timestamp(source)?,
                    ))
                })
                .collect::<HistoryResult<Vec<_>>>()?;
            records.push(TargetHistory::new(
                signature,
                required(target, FILE)?,
                timestamp(target)?,
                sources,
            ));
        }
    }
    Ok(records)
}

/// Build the document for `records`, one `processor` per distinct signature.
///
/// Signatures and outputs are sorted so that an unchanged table always
/// produces the same file; sources keep their recorded order.
pub fn encode<'a>(records: impl IntoIterator<Item = &'a TargetHistory>) -> Element {
    let mut by_signature: BTreeMap<&str, Vec<&TargetHistory>> = BTreeMap::new();
    for record in records {
        by_signature
            .entry(record.configuration())
            .or_default()
            .push(record);
    }

    let mut root = Element::new(HISTORY);
    for (signature, mut targets) in by_signature {
        targets.sort_by(|a, b| a.output().cmp(b.output()));

        let mut processor = Element::new(PROCESSOR).with_attribute(SIGNATURE, signature);
        for record in targets {
            let mut target = Element::new(TARGET)
                .with_attribute(FILE, record.output())
                .with_attribute(LAST_MODIFIED, record.output_last_modified().to_hex());
            for source in record.sources() {
                target.push(
                    Element::new(SOURCE)
                        .with_attribute(FILE, source.relative_path())
                        .with_attribute(LAST_MODIFIED, source.last_modified().to_hex()),
                );
            }
            processor.push(target);
        }
        root.push(processor);
    }
    root
}

fn required<'e>(element: &'e Element, name: &str) -> HistoryResult<&'e str> {
    element.attribute(name).ok_or_else(|| {
        HistoryError::InvalidRecord(format!("<{}> without {name} attribute", element.name))
    })
}

fn timestamp(element: &Element) -> HistoryResult<Timestamp> {
    let text = required(element, LAST_MODIFIED)?;
    Timestamp::from_hex(text).map_err(|e| {
        HistoryError::InvalidRecord(format!(
            "<{}> has invalid {LAST_MODIFIED} {text:?}: {e}",
            element.name
        ))
    })
}
