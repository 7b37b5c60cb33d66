//! Parser from history text to an [`Element`] tree.
//!
//! Declarations, doctypes, comments, processing instructions and text are
//! skipped. A leading byte order mark is accepted.

use super::element::Element;
use crate::error::{HistoryError, HistoryResult};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

const MAX_DEPTH: usize = 64;

/// Parse `input` into its root element.
///
/// Returns `Ok(None)` for a document without any element, such as an empty
/// or whitespace-only file.
pub fn parse_document(input: &str) -> HistoryResult<Option<Element>> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut reader = Reader::from_str(input);
    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| error_at(input, position, &e.to_string()))?;

        match event {
            Event::Start(start) => {
                if open.is_empty() && root.is_some() {
                    return Err(error_at(input, position, "content after root element"));
                }
                if open.len() >= MAX_DEPTH {
                    return Err(error_at(input, position, "elements nested too deeply"));
                }
                open.push(element(&start).map_err(|msg| error_at(input, position, &msg))?);
            }
            Event::Empty(start) => {
                let element = element(&start).map_err(|msg| error_at(input, position, &msg))?;
                attach(&mut open, &mut root, element)
                    .map_err(|msg| error_at(input, position, msg))?;
            }
            Event::End(end) => {
                let Some(element) = open.pop() else {
                    return Err(error_at(input, position, "close tag without start tag"));
                };
                if end.name().as_ref() != element.name.as_bytes() {
                    return Err(error_at(
                        input,
                        position,
                        &format!(
                            "expected </{}>, found </{}>",
                            element.name,
                            String::from_utf8_lossy(end.name().as_ref())
                        ),
                    ));
                }
                attach(&mut open, &mut root, element)
                    .map_err(|msg| error_at(input, position, msg))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(error_at(
            input,
            input.len(),
            &format!("missing </{}>", unclosed.name),
        ));
    }
    Ok(root)
}

fn element(start: &BytesStart<'_>) -> Result<Element, String> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let value = attribute.unescape_value().map_err(|e| e.to_string())?;
        element.attributes.push((
            String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
            value.into_owned(),
        ));
    }
    Ok(element)
}

fn attach(
    open: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), &'static str> {
    if let Some(parent) = open.last_mut() {
        parent.push(element);
    } else if root.is_some() {
        return Err("content after root element");
    } else {
        *root = Some(element);
    }
    Ok(())
}

fn error_at(input: &str, offset: usize, message: &str) -> HistoryError {
    let before = input.get(..offset.min(input.len())).unwrap_or(input);
    let line_start = before.rfind('\n').map_or(0, |nl| nl + 1);
    HistoryError::Parse {
        line: before.matches('\n').count() + 1,
        column: before[line_start..].chars().count() + 1,
        message: message.to_string(),
    }
}
