//! XML codec.
//!
//! Parsing reads the document with `quick-xml` into a small element tree and converts
//! the root element into a [`Value`]. The root itself contributes no key, so the `<root>`
//! envelope written by [`serialize_xml`] disappears again on the way back.
//!
//! Conversion rules per element:
//!
//! - attributes are collected under the reserved `@attributes` key
//! - a child tag seen once maps to its converted value, a repeated tag to a `List`
//! - an element without attributes and child elements becomes its text
//! - an element whose children are all `<item>` becomes a `List`
//! - text mixed with child elements or attributes is kept under `#text`
//!
//! ```rust
//! use datacast::xml::{parse_xml, serialize_xml};
//! use datacast::{value, AttributeMode, DEFAULT_MAX_XML_DEPTH};
//!
//! let rows = value!([{"a": "1"}, {"a": "2"}]);
//! let xml = serialize_xml(&rows, AttributeMode::Drop);
//! assert_eq!(
//!     xml,
//!     "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
//!      <root><item><a>1</a></item><item><a>2</a></item></root>"
//! );
//! assert_eq!(parse_xml(&xml, DEFAULT_MAX_XML_DEPTH).unwrap(), rows);
//! ```

use crate::{AttributeMode, Error, Record, Result, Value};
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Reserved record key holding an element's attributes.
pub const ATTRIBUTES_KEY: &str = "@attributes";
/// Reserved record key holding text mixed with child elements.
pub const TEXT_KEY: &str = "#text";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const LIST_ITEM_TAG: &str = "item";

fn xml_error<T: std::fmt::Display>(message: T) -> Error {
    Error::parse("XML", message)
}

#[derive(Debug)]
struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_start(tag: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in tag.attributes() {
            let attr = attr.map_err(xml_error)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(xml_error)?.into_owned();
            attributes.push((key, value));
        }
        Ok(XmlElement {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }
}

/// Reads the document into an element tree without recursion.
fn read_tree(input: &str, max_depth: usize) -> Result<XmlElement> {
    let mut reader = Reader::from_str(input);
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|err| {
            xml_error(format!(
                "{} at position {}",
                err,
                reader.buffer_position()
            ))
        })?;
        match event {
            Event::Start(tag) => {
                if stack.len() >= max_depth {
                    return Err(xml_error(format!(
                        "elements are nested deeper than {max_depth} levels"
                    )));
                }
                if stack.is_empty() && root.is_some() {
                    return Err(xml_error("document has more than one root element"));
                }
                stack.push(XmlElement::from_start(&tag)?);
            }
            Event::Empty(tag) => {
                let node = XmlElement::from_start(&tag)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None if root.is_none() => root = Some(node),
                    None => return Err(xml_error("document has more than one root element")),
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| xml_error("closing tag without matching opening tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(xml_error)?;
                if !text.trim().is_empty() {
                    match stack.last_mut() {
                        Some(current) => current.text.push_str(&text),
                        None => return Err(xml_error("text outside of the root element")),
                    }
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(xml_error(format!("element <{}> is never closed", open.name)));
    }
    root.ok_or_else(|| xml_error("document has no root element"))
}

fn element_to_value(el: XmlElement) -> Value {
    let XmlElement {
        attributes,
        text,
        children,
        ..
    } = el;

    let text = text.trim();
    if attributes.is_empty() {
        if children.is_empty() {
            return Value::String(text.to_string());
        }
        if children.iter().all(|child| child.name == LIST_ITEM_TAG) {
            return Value::List(children.into_iter().map(element_to_value).collect());
        }
    }

    let mut record = Record::new();
    if !attributes.is_empty() {
        let attrs: Record = attributes
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        record.insert(ATTRIBUTES_KEY.to_string(), Value::Record(attrs));
    }
    if !text.is_empty() {
        record.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
    }

    let mut groups: IndexMap<String, Vec<Value>> = IndexMap::new();
    for child in children {
        let name = child.name.clone();
        groups.entry(name).or_default().push(element_to_value(child));
    }
    for (name, mut values) in groups {
        let value = if values.len() == 1 {
            values.pop().unwrap_or_default()
        } else {
            Value::List(values)
        };
        record.insert(name, value);
    }
    Value::Record(record)
}

/// Parses an XML document into a [`Value`].
///
/// Fails on malformed markup, on more than one root element, and when elements nest
/// deeper than `max_depth`.
///
/// # Examples
///
/// ```rust
/// use datacast::xml::parse_xml;
/// use datacast::value;
///
/// let value = parse_xml(r#"<user id="7"><name>Ada</name></user>"#, 64).unwrap();
/// assert_eq!(value, value!({"@attributes": {"id": "7"}, "name": "Ada"}));
///
/// assert!(parse_xml("<a><b></a>", 64).is_err());
/// ```
pub fn parse_xml(input: &str, max_depth: usize) -> Result<Value> {
    let root = read_tree(input, max_depth)?;
    log::debug!("parsed XML document with root <{}>", root.name);
    Ok(element_to_value(root))
}

/// Turns a key into a usable tag name.
///
/// Characters outside `[A-Za-z0-9_-]` become `_`, and names starting with a digit or
/// hyphen get a `_` prefix.
///
/// # Examples
///
/// ```rust
/// use datacast::xml::sanitize_tag;
///
/// assert_eq!(sanitize_tag("first name"), "first_name");
/// assert_eq!(sanitize_tag("2nd"), "_2nd");
/// assert_eq!(sanitize_tag(""), "_");
/// ```
#[must_use]
pub fn sanitize_tag(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    match out.chars().next() {
        None => out.push('_'),
        Some(first) if first.is_ascii_digit() || first == '-' => out.insert(0, '_'),
        Some(_) => {}
    }
    out
}

fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(input: &str) -> String {
    escape_text(input).replace('"', "&quot;")
}

struct XmlWriter {
    output: String,
    attributes: AttributeMode,
}

impl XmlWriter {
    fn write_element(&mut self, name: &str, value: &Value) {
        self.output.push('<');
        self.output.push_str(name);
        if self.attributes == AttributeMode::Emit {
            self.write_attributes(value);
        }
        self.output.push('>');
        self.write_body(value);
        self.output.push_str("</");
        self.output.push_str(name);
        self.output.push('>');
    }

    fn write_attributes(&mut self, value: &Value) {
        let Some(Value::Record(attrs)) = value.as_record().and_then(|r| r.get(ATTRIBUTES_KEY))
        else {
            return;
        };
        for (key, attr) in attrs.iter() {
            self.output.push(' ');
            self.output.push_str(&sanitize_tag(key));
            self.output.push_str("=\"");
            self.output.push_str(&escape_attribute(&attr.to_text()));
            self.output.push('"');
        }
    }

    fn write_body(&mut self, value: &Value) {
        match value {
            Value::List(items) => {
                for item in items {
                    self.write_element(LIST_ITEM_TAG, item);
                }
            }
            Value::Record(record) => {
                for (key, child) in record.iter() {
                    match key.as_str() {
                        ATTRIBUTES_KEY => {}
                        TEXT_KEY => self.output.push_str(&escape_text(&child.to_text())),
                        _ => self.write_element(&sanitize_tag(key), child),
                    }
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                self.output.push_str(&escape_text(&value.to_text()));
            }
        }
    }
}

/// Serializes a value as an XML document wrapped in a single `<root>` element.
///
/// Lists become repeated `<item>` elements, records one child element per key. With
/// [`AttributeMode::Drop`] the `@attributes` captured by [`parse_xml`] are not written
/// back; [`AttributeMode::Emit`] restores them onto the owning element.
///
/// # Examples
///
/// ```rust
/// use datacast::xml::serialize_xml;
/// use datacast::{value, AttributeMode};
///
/// let user = value!({"@attributes": {"id": "7"}, "name": "Ada & Co"});
/// let dropped = serialize_xml(&user, AttributeMode::Drop);
/// assert!(dropped.ends_with("<root><name>Ada &amp; Co</name></root>"));
///
/// let emitted = serialize_xml(&user, AttributeMode::Emit);
/// assert!(emitted.ends_with("<root id=\"7\"><name>Ada &amp; Co</name></root>"));
/// ```
pub fn serialize_xml(value: &Value, attributes: AttributeMode) -> String {
    let mut writer = XmlWriter {
        output: String::from(XML_DECLARATION),
        attributes,
    };
    writer.write_element("root", value);
    writer.output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;

    const DEPTH: usize = crate::DEFAULT_MAX_XML_DEPTH;

    #[test]
    fn test_item_children_become_list() {
        let value = parse_xml(
            "<root><item><a>1</a></item><item><a>1</a></item></root>",
            DEPTH,
        )
        .unwrap();
        assert_eq!(value, value!([{"a": "1"}, {"a": "1"}]));
    }

    #[test]
    fn test_repeated_tags_group_into_list() {
        let value = parse_xml(
            "<library><book>A</book><shelf>1</shelf><book>B</book></library>",
            DEPTH,
        )
        .unwrap();
        let record = value.as_record().unwrap();
        let keys: Vec<_> = record.keys().cloned().collect();
        assert_eq!(keys, vec!["book", "shelf"]);
        assert_eq!(record.get("book"), Some(&value!(["A", "B"])));
        assert_eq!(record.get("shelf"), Some(&value!("1")));
    }

    #[test]
    fn test_whitespace_nodes_ignored() {
        let value = parse_xml("<root>\n  <a>x</a>\n  <b/>\n</root>", DEPTH).unwrap();
        assert_eq!(value, value!({"a": "x", "b": ""}));
    }

    #[test]
    fn test_attributes_and_mixed_text() {
        let value = parse_xml(r#"<root><p lang="en">Hello <b>there</b></p></root>"#, DEPTH)
            .unwrap();
        assert_eq!(
            value,
            value!({"p": {"@attributes": {"lang": "en"}, "#text": "Hello", "b": "there"}})
        );
    }

    #[test]
    fn test_entities_unescaped() {
        let value = parse_xml("<root><a>1 &lt; 2 &amp;&amp; 3</a></root>", DEPTH).unwrap();
        assert_eq!(value, value!({"a": "1 < 2 && 3"}));
    }

    #[test]
    fn test_cdata_is_text() {
        let value = parse_xml("<root><a><![CDATA[<raw>]]></a></root>", DEPTH).unwrap();
        assert_eq!(value, value!({"a": "<raw>"}));
    }

    #[test]
    fn test_malformed_documents_fail() {
        for input in [
            "",
            "<a>",
            "<a></b>",
            "<a/><b/>",
            "text only",
            "<a>&bogus;</a>",
        ] {
            let err = parse_xml(input, DEPTH).unwrap_err();
            assert!(matches!(err, Error::Parse { format: "XML", .. }), "{input}");
        }
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}{}", "<a>".repeat(10), "</a>".repeat(10));
        assert!(parse_xml(&deep, 10).is_ok());
        assert!(parse_xml(&deep, 9).is_err());
    }

    #[test]
    fn test_serialize_sanitizes_and_escapes() {
        let value = value!({"first name": "<b>", "1st": true, "n": null, "x": 2.5});
        assert_eq!(
            serialize_xml(&value, AttributeMode::Drop),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root>\
             <first_name>&lt;b&gt;</first_name><_1st>true</_1st><n></n><x>2.5</x></root>"
        );
    }

    #[test]
    fn test_nested_list_round_trip() {
        let value = value!({"tags": ["a", "b"], "owner": {"name": "Ada"}});
        let xml = serialize_xml(&value, AttributeMode::Drop);
        assert_eq!(parse_xml(&xml, DEPTH).unwrap(), value);
    }

    #[test]
    fn test_attributes_dropped_by_default_and_emitted_on_request() {
        let input = r#"<root><user id="7" role="a&quot;b"><name>Ada</name></user></root>"#;
        let value = parse_xml(input, DEPTH).unwrap();

        let dropped = serialize_xml(&value, AttributeMode::Drop);
        assert!(dropped.ends_with("<root><user><name>Ada</name></user></root>"));

        let emitted = serialize_xml(&value, AttributeMode::Emit);
        assert!(emitted.ends_with(
            r#"<root><user id="7" role="a&quot;b"><name>Ada</name></user></root>"#
        ));
        assert_eq!(parse_xml(&emitted, DEPTH).unwrap(), value);
    }
}
