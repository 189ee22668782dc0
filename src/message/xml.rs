//! XML reply parser.
//!
//! Maps a document onto a `serde_json::Value`:
//! - attributes and child elements become object keys
//! - repeated children with the same name become an array
//! - an element with only text becomes a string
//! - text next to attributes or children is kept under `content`

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use super::{InboundMessage, MessageParser};
use crate::error::{GlpiError, Result};

/// Root element of server replies
pub const REPLY_ROOT: &str = "REPLY";

/// Key holding mixed text content
const TEXT_KEY: &str = "content";

/// XML reply parser
#[derive(Debug, Clone)]
pub struct XmlMessageParser {
    expected_root: Option<String>,
}

impl Default for XmlMessageParser {
    fn default() -> Self {
        Self::with_root(REPLY_ROOT)
    }
}

impl XmlMessageParser {
    /// Parser that requires `<REPLY>` as root
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser that requires the given root element
    pub fn with_root(root: impl Into<String>) -> Self {
        Self {
            expected_root: Some(root.into()),
        }
    }

    /// Parser that accepts any root element
    pub fn any_root() -> Self {
        Self {
            expected_root: None,
        }
    }
}

impl MessageParser for XmlMessageParser {
    fn parse(&self, text: &str) -> Result<InboundMessage> {
        let (root, content) = parse_document(text)?;

        if let Some(expected) = &self.expected_root {
            if root != *expected {
                return Err(GlpiError::Message(format!(
                    "unexpected root element <{root}>, expected <{expected}>"
                )));
            }
        }

        Ok(InboundMessage { root, content })
    }
}

struct Frame {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let mut fields = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(invalid)?;
            let value = attr.unescape_value().map_err(invalid)?;
            fields.insert(lossy(attr.key.as_ref()), Value::String(value.into_owned()));
        }

        Ok(Self {
            name: lossy(start.name().as_ref()),
            fields,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Value) {
        let Frame {
            name,
            mut fields,
            text,
        } = self;

        if fields.is_empty() {
            return (name, Value::String(text));
        }
        if !text.is_empty() {
            fields.insert(TEXT_KEY.to_string(), Value::String(text));
        }
        (name, Value::Object(fields))
    }

    fn attach(&mut self, name: String, value: Value) {
        match self.fields.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            },
            None => {
                self.fields.insert(name, value);
            },
        }
    }
}

fn parse_document(text: &str) -> Result<(String, Value)> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                ensure_single_root(&root, &stack)?;
                stack.push(Frame::open(&start)?);
            },
            Event::Empty(start) => {
                ensure_single_root(&root, &stack)?;
                let (name, value) = Frame::open(&start)?.close();
                finish(&mut stack, &mut root, name, value);
            },
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| GlpiError::Message("unbalanced closing tag".to_string()))?;
                let (name, value) = frame.close();
                finish(&mut stack, &mut root, name, value);
            },
            Event::Text(chunk) => {
                let chunk = chunk.unescape().map_err(invalid)?;
                match stack.last_mut() {
                    Some(frame) => frame.text.push_str(&chunk),
                    None => {
                        return Err(GlpiError::Message(
                            "text outside of root element".to_string(),
                        ))
                    },
                }
            },
            Event::CData(chunk) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&chunk));
                }
            },
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctypes
            _ => {},
        }
    }

    if let Some(open) = stack.last() {
        return Err(GlpiError::Message(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| GlpiError::Message("no root element".to_string()))
}

fn ensure_single_root(root: &Option<(String, Value)>, stack: &[Frame]) -> Result<()> {
    if stack.is_empty() && root.is_some() {
        return Err(GlpiError::Message("multiple root elements".to_string()));
    }
    Ok(())
}

fn finish(
    stack: &mut [Frame],
    root: &mut Option<(String, Value)>,
    name: String,
    value: Value,
) {
    match stack.last_mut() {
        Some(parent) => parent.attach(name, value),
        None => *root = Some((name, value)),
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn invalid(err: impl std::fmt::Display) -> GlpiError {
    GlpiError::Message(err.to_string())
}
