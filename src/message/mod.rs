//! XML protocol messages.
//!
//! Outbound envelopes are opaque to the client; [`OutboundMessage`] is a
//! convenience for the common `<REQUEST>` shape. Inbound replies are handed
//! to a [`MessageParser`], by default [`XmlMessageParser`].

mod outbound;
mod xml;

pub use outbound::OutboundMessage;
pub use xml::XmlMessageParser;

use serde_json::Value;

use crate::error::Result;

/// Parsed inbound message
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Root element name (e.g. `REPLY`)
    pub root: String,
    /// Content of the root element as a JSON tree
    pub content: Value,
}

impl InboundMessage {
    /// Consume the message, keeping its content
    pub fn into_content(self) -> Value {
        self.content
    }
}

/// Parser for decompressed reply text
pub trait MessageParser {
    /// Parse a reply document
    fn parse(&self, text: &str) -> Result<InboundMessage>;
}

impl<P: MessageParser + ?Sized> MessageParser for &P {
    fn parse(&self, text: &str) -> Result<InboundMessage> {
        (**self).parse(text)
    }
}
