//! XML persistence for [`LogicalDocument`].
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <LogicalDocument LogicalText="Due: , total ">
//!   <FieldList>
//!     <LogInfo>
//!       <Position>5</Position>
//!       <FieldType type="u32">1</FieldType>
//!     </LogInfo>
//!   </FieldList>
//! </LogicalDocument>
//! ```
//!
//! `FieldList` is omitted when there are no fields. A `FieldType` holding a
//! child element is a structured id (the element and its attributes); one
//! holding text is a primitive id whose `type` attribute names the type.
//! The root element name is not checked on decode.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;

use crate::error::EditError;
use crate::models::{FieldId, FieldIdError, FieldIdRepr, LogicalDocument, LogicalField};

const ROOT: &str = "LogicalDocument";
const LOGICAL_TEXT: &str = "LogicalText";
const FIELD_LIST: &str = "FieldList";
const LOG_INFO: &str = "LogInfo";
const POSITION: &str = "Position";
const FIELD_TYPE: &str = "FieldType";
const TYPE_ATTR: &str = "type";

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Malformed document: {0}")]
    Malformed(String),
    #[error("Field id error: {0}")]
    FieldId(#[from] FieldIdError),
    #[error(transparent)]
    Fragment(#[from] EditError),
}

/// Serialize a logical document to XML.
pub fn encode<F: FieldId>(doc: &LogicalDocument<F>) -> Result<String, CodecError> {
    doc.validate()?;

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut root = BytesStart::new(ROOT);
    push_escaped_attribute(&mut root, LOGICAL_TEXT, &doc.text);
    if doc.fields.is_empty() {
        writer.write_event(Event::Empty(root))?;
    } else {
        writer.write_event(Event::Start(root))?;
        writer.write_event(Event::Start(BytesStart::new(FIELD_LIST)))?;
        for field in &doc.fields {
            writer.write_event(Event::Start(BytesStart::new(LOG_INFO)))?;
            writer.write_event(Event::Start(BytesStart::new(POSITION)))?;
            writer.write_event(Event::Text(BytesText::new(&field.position.to_string())))?;
            writer.write_event(Event::End(BytesEnd::new(POSITION)))?;
            write_field_type(&mut writer, &field.field_id.encode())?;
            writer.write_event(Event::End(BytesEnd::new(LOG_INFO)))?;
        }
        writer.write_event(Event::End(BytesEnd::new(FIELD_LIST)))?;
        writer.write_event(Event::End(BytesEnd::new(ROOT)))?;
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| CodecError::Malformed(format!("encoded XML is not UTF-8: {e}")))
}

/// Parse XML written by [`encode`].
///
/// The decoded document is validated, so field positions outside the text
/// fail with [`CodecError::Fragment`].
pub fn decode<F: FieldId>(xml: &str) -> Result<LogicalDocument<F>, CodecError> {
    let mut reader = Reader::from_str(xml);

    let (root, has_children) = loop {
        match reader.read_event()? {
            Event::Start(e) => break (e, true),
            Event::Empty(e) => break (e, false),
            Event::Eof => return Err(CodecError::Malformed("missing root element".to_string())),
            _ => {}
        }
    };

    let text = attribute(&root, LOGICAL_TEXT)?
        .ok_or_else(|| CodecError::Malformed(format!("root element has no {LOGICAL_TEXT} attribute")))?;
    let mut doc = LogicalDocument::from_text(text);

    if has_children {
        loop {
            match reader.read_event()? {
                Event::Start(e) if e.name().as_ref() == FIELD_LIST.as_bytes() => {
                    doc.fields = read_field_list(&mut reader)?;
                }
                Event::Start(e) => {
                    log::debug!(
                        "skipping unknown element <{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    );
                    reader.read_to_end(e.name())?;
                }
                Event::End(_) => break,
                Event::Eof => return Err(unexpected_eof(ROOT)),
                _ => {}
            }
        }
    }

    doc.validate()?;
    Ok(doc)
}

fn read_field_list<F: FieldId>(reader: &mut Reader<&[u8]>) -> Result<Vec<LogicalField<F>>, CodecError> {
    let mut fields = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == LOG_INFO.as_bytes() => {
                fields.push(read_log_info(reader)?);
            }
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(_) => return Ok(fields),
            Event::Eof => return Err(unexpected_eof(FIELD_LIST)),
            _ => {}
        }
    }
}

fn read_log_info<F: FieldId>(reader: &mut Reader<&[u8]>) -> Result<LogicalField<F>, CodecError> {
    let mut position = None;
    let mut repr = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == POSITION.as_bytes() => {
                let raw = read_text(reader, POSITION)?;
                let parsed = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| CodecError::Malformed(format!("invalid field position {raw:?}")))?;
                position = Some(parsed);
            }
            Event::Start(e) if e.name().as_ref() == FIELD_TYPE.as_bytes() => {
                repr = Some(read_field_type(reader, &e)?);
            }
            Event::Empty(e) if e.name().as_ref() == FIELD_TYPE.as_bytes() => {
                repr = Some(primitive_repr(&e, String::new())?);
            }
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(LOG_INFO)),
            _ => {}
        }
    }

    let position =
        position.ok_or_else(|| CodecError::Malformed(format!("{LOG_INFO} without {POSITION}")))?;
    let repr = repr.ok_or_else(|| CodecError::Malformed(format!("{LOG_INFO} without {FIELD_TYPE}")))?;
    Ok(LogicalField::new(F::decode(&repr)?, position))
}

fn read_field_type(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<FieldIdRepr, CodecError> {
    let mut structured = None;
    let mut value = String::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if structured.is_none() {
                    structured = Some(structured_repr(&e)?);
                }
                reader.read_to_end(e.name())?;
            }
            Event::Empty(e) => {
                if structured.is_none() {
                    structured = Some(structured_repr(&e)?);
                }
            }
            Event::Text(e) => value.push_str(&e.unescape()?),
            Event::CData(e) => value.push_str(&String::from_utf8_lossy(&e)),
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof(FIELD_TYPE)),
            _ => {}
        }
    }

    match structured {
        Some(repr) => Ok(repr),
        None => primitive_repr(start, value),
    }
}

fn primitive_repr(start: &BytesStart, value: String) -> Result<FieldIdRepr, CodecError> {
    let type_name = attribute(start, TYPE_ATTR)?
        .ok_or_else(|| CodecError::Malformed(format!("{FIELD_TYPE} has neither a child element nor a {TYPE_ATTR} attribute")))?;
    Ok(FieldIdRepr::Primitive { type_name, value })
}

fn structured_repr(element: &BytesStart) -> Result<FieldIdRepr, CodecError> {
    let mut attributes = Vec::new();
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        attributes.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            attr.unescape_value()?.into_owned(),
        ));
    }
    Ok(FieldIdRepr::Structured {
        element: String::from_utf8_lossy(element.name().as_ref()).into_owned(),
        attributes,
    })
}

/// Text content of the current element up to its end tag
fn read_text(reader: &mut Reader<&[u8]>, element: &str) -> Result<String, CodecError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(_) => return Ok(text),
            Event::Eof => return Err(unexpected_eof(element)),
            _ => {}
        }
    }
}

fn attribute(element: &BytesStart, name: &str) -> Result<Option<String>, CodecError> {
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn write_field_type(writer: &mut Writer<Vec<u8>>, repr: &FieldIdRepr) -> Result<(), CodecError> {
    match repr {
        FieldIdRepr::Primitive { type_name, value } => {
            let mut start = BytesStart::new(FIELD_TYPE);
            push_escaped_attribute(&mut start, TYPE_ATTR, type_name);
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Text(BytesText::new(value)))?;
        }
        FieldIdRepr::Structured {
            element,
            attributes,
        } => {
            writer.write_event(Event::Start(BytesStart::new(FIELD_TYPE)))?;
            let mut child = BytesStart::new(element.as_str());
            for (key, value) in attributes {
                push_escaped_attribute(&mut child, key, value);
            }
            writer.write_event(Event::Empty(child))?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(FIELD_TYPE)))?;
    Ok(())
}

// Line breaks and tabs are written as character references so they survive
// attribute-value normalization in other XML readers.
fn push_escaped_attribute(element: &mut BytesStart, key: &str, value: &str) {
    let escaped = quick_xml::escape::escape(value)
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;");
    element.push_attribute(Attribute {
        key: QName(key.as_bytes()),
        value: Cow::Owned(escaped.into_bytes()),
    });
}

fn unexpected_eof(element: &str) -> CodecError {
    CodecError::Malformed(format!("unexpected end of input inside <{element}>"))
}
