//! Serializer from an [`Element`] tree to history text.

use super::element::Element;
use crate::error::HistoryResult;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};

/// Declaration written at the top of every committed history file.
pub const DECLARATION: &str = "<?xml version='1.0' encoding='UTF-8'?>";

/// Render `root` with the declaration, three-space indentation and a trailing newline.
///
/// Elements without children are written as empty tags.
pub fn write_document(root: &Element) -> HistoryResult<String> {
    let mut buffer = Vec::with_capacity(256);
    buffer.extend_from_slice(DECLARATION.as_bytes());
    buffer.push(b'\n');

    let mut writer = Writer::new_with_indent(buffer, b' ', 3);
    write_element(&mut writer, root)?;

    let mut text = String::from_utf8_lossy(&writer.into_inner()).into_owned();
    text.push('\n');
    Ok(text)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> HistoryResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::reader::parse_document;

    #[test]
    fn test_layout() {
        let mut target = Element::new("target")
            .with_attribute("file", "a.o")
            .with_attribute("lastModified", "1f");
        target.push(Element::new("source").with_attribute("file", "../a&b.c"));
        let mut root = Element::new("history");
        root.push(target);

        assert_eq!(
            write_document(&root).unwrap(),
            "<?xml version='1.0' encoding='UTF-8'?>\n\
             <history>\n\
             \x20  <target file=\"a.o\" lastModified=\"1f\">\n\
             \x20     <source file=\"../a&amp;b.c\"/>\n\
             \x20  </target>\n\
             </history>\n"
        );
    }

    #[test]
    fn test_empty_root() {
        assert_eq!(
            write_document(&Element::new("history")).unwrap(),
            format!("{DECLARATION}\n<history/>\n")
        );
    }

    #[test]
    fn test_written_text_parses_back() {
        let mut root = Element::new("history");
        root.push(Element::new("processor").with_attribute("signature", "cc \"-O2\" <x86> & 'y'"));
        let text = write_document(&root).unwrap();
        assert!(text.starts_with(DECLARATION));
        let parsed = parse_document(&text).unwrap().unwrap();
        assert_eq!(parsed, root);
    }
}
