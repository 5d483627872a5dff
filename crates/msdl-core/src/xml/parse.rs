use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use super::{Element, NodeId, NodeKind, Text, XmlTree};

/// Failure to read a document as well-formed XML
#[derive(Error, Debug, Clone, PartialEq)]
pub enum XmlError {
    /// Markup error reported by the reader
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    /// Document ended while elements were still open
    #[error("unexpected end of document: <{open_element}> is not closed")]
    UnclosedElement { open_element: String },

    /// Closing tag without a matching open element
    #[error("unexpected closing tag </{name}>")]
    UnexpectedClose { name: String },
}

pub(super) fn parse_document(source: &str) -> Result<XmlTree, XmlError> {
    let mut reader = Reader::from_str(source);
    let mut tree = XmlTree::new();
    let mut stack: Vec<NodeId> = vec![tree.document()];

    loop {
        let event = reader.read_event().map_err(|e| XmlError::Malformed {
            position: reader.buffer_position() as u64,
            message: e.to_string(),
        })?;
        let parent = stack.last().copied().unwrap_or(tree.document());

        match event {
            Event::Start(start) => {
                let element = read_element(&start, false, &reader)?;
                let id = tree.push(NodeKind::Element(element), Some(parent));
                stack.push(id);
            }
            Event::Empty(start) => {
                let element = read_element(&start, true, &reader)?;
                tree.push(NodeKind::Element(element), Some(parent));
            }
            Event::End(end) => {
                if stack.len() <= 1 {
                    return Err(XmlError::UnexpectedClose {
                        name: String::from_utf8_lossy(end.name().as_ref()).into_owned(),
                    });
                }
                stack.pop();
            }
            Event::Text(text) => {
                let raw = String::from_utf8_lossy(&text).into_owned();
                let value = match quick_xml::escape::unescape(&raw) {
                    Ok(value) => value.into_owned(),
                    Err(err) => {
                        tracing::warn!(error = %err, "keeping undecodable text verbatim");
                        raw.clone()
                    }
                };
                tree.push(NodeKind::Text(Text { value, raw }), Some(parent));
            }
            Event::CData(data) => {
                let content = String::from_utf8_lossy(&data).into_owned();
                tree.push(NodeKind::CData(content), Some(parent));
            }
            Event::Comment(comment) => {
                let content = String::from_utf8_lossy(&comment).into_owned();
                tree.push(NodeKind::Comment(content), Some(parent));
            }
            Event::Decl(decl) => {
                let content = String::from_utf8_lossy(&decl).into_owned();
                tree.push(NodeKind::Declaration(content), Some(parent));
            }
            Event::PI(pi) => {
                let content = String::from_utf8_lossy(&pi).into_owned();
                tree.push(NodeKind::ProcessingInstruction(content), Some(parent));
            }
            Event::DocType(doctype) => {
                let content = String::from_utf8_lossy(&doctype).into_owned();
                tree.push(NodeKind::DocType(content), Some(parent));
            }
            Event::Eof => break,
        }
    }

    if stack.len() > 1 {
        let open = stack[stack.len() - 1];
        return Err(XmlError::UnclosedElement {
            open_element: tree
                .element(open)
                .map(|e| e.name.clone())
                .unwrap_or_default(),
        });
    }

    Ok(tree)
}

fn read_element(
    start: &BytesStart<'_>,
    self_closing: bool,
    reader: &Reader<&[u8]>,
) -> Result<Element, XmlError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Malformed {
            position: reader.buffer_position() as u64,
            message: e.to_string(),
        })?;
        attributes.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            String::from_utf8_lossy(&attr.value).into_owned(),
        ));
    }

    let content: &[u8] = start;
    let raw_attributes = content
        .get(start.name().as_ref().len()..)
        .filter(|rest| !rest.is_empty())
        .map(|rest| String::from_utf8_lossy(rest).into_owned());

    Ok(Element {
        name,
        attributes,
        raw_attributes,
        self_closing,
    })
}
