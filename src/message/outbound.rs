//! Outbound `<REQUEST>` envelopes.

use quick_xml::escape::escape;
use serde_json::{Map, Value};

/// Outbound request envelope.
///
/// ```text
/// <?xml version="1.0" encoding="UTF-8" ?>
/// <REQUEST><CONTENT>...</CONTENT><DEVICEID>...</DEVICEID><QUERY>PROLOG</QUERY></REQUEST>
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    query: String,
    device_id: String,
    content: Option<Map<String, Value>>,
}

impl OutboundMessage {
    /// Create an envelope for the given query type
    pub fn new(query: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            device_id: device_id.into(),
            content: None,
        }
    }

    /// PROLOG query, the first message of a legacy session
    pub fn prolog(device_id: impl Into<String>) -> Self {
        Self::new("PROLOG", device_id)
    }

    /// Attach a `<CONTENT>` tree
    #[must_use]
    pub fn with_content(mut self, content: Map<String, Value>) -> Self {
        self.content = Some(content);
        self
    }

    /// Query type
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Serialize to XML text
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n<REQUEST>");
        if let Some(content) = &self.content {
            write_element(&mut xml, "CONTENT", &Value::Object(content.clone()));
        }
        write_element(&mut xml, "DEVICEID", &Value::String(self.device_id.clone()));
        write_element(&mut xml, "QUERY", &Value::String(self.query.clone()));
        xml.push_str("</REQUEST>\n");
        xml
    }
}

fn write_element(xml: &mut String, name: &str, value: &Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                write_element(xml, name, item);
            }
        },
        Value::Null => {
            xml.push('<');
            xml.push_str(name);
            xml.push_str("/>");
        },
        Value::Object(fields) => {
            open(xml, name);
            for (key, field) in fields {
                write_element(xml, key, field);
            }
            close(xml, name);
        },
        Value::String(text) => {
            open(xml, name);
            xml.push_str(&escape(text.as_str()));
            close(xml, name);
        },
        Value::Bool(_) | Value::Number(_) => {
            open(xml, name);
            xml.push_str(&value.to_string());
            close(xml, name);
        },
    }
}

fn open(xml: &mut String, name: &str) {
    xml.push('<');
    xml.push_str(name);
    xml.push('>');
}

fn close(xml: &mut String, name: &str) {
    xml.push_str("</");
    xml.push_str(name);
    xml.push('>');
}
