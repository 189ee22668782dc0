//! Response format detection from raw bytes.
//!
//! GLPI servers may answer in zlib, gzip or plain XML whatever the request
//! advertised, and proxies sometimes prepend noise or wrap an error reply in
//! an empty `<html></html>` marker. The `Content-Type` header is not trusted;
//! the body is classified by signature instead.
//!
//! Rules are tried in order and the first match wins:
//!
//! | Format     | Signature                               | Payload                    |
//! |------------|-----------------------------------------|----------------------------|
//! | Deflate    | `78 9C` anywhere                        | signature to end of buffer |
//! | Gzip       | `1F 8B 08` anywhere                     | signature to end of buffer |
//! | PlainXml   | trailing `<...>` after optional marker  | first `<` to last `>`      |
//! | Unknown    | none of the above                       | empty                      |

use serde::{Deserialize, Serialize};

/// zlib header for the default compression level
pub const ZLIB_SIGNATURE: [u8; 2] = [0x78, 0x9C];

/// gzip magic followed by the deflate method byte
pub const GZIP_SIGNATURE: [u8; 3] = [0x1F, 0x8B, 0x08];

/// Empty HTML wrapper some proxies put in front of error replies
pub const HTML_WRAPPER: &[u8] = b"<html></html>";

/// Wire format of an inbound response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// zlib-framed stream
    Deflate,
    /// gzip-framed stream
    Gzip,
    /// Uncompressed XML text
    PlainXml,
    /// No recognizable format
    Unknown,
}

impl ResponseFormat {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            ResponseFormat::Deflate => "DEFLATE",
            ResponseFormat::Gzip => "GZIP",
            ResponseFormat::PlainXml => "XML",
            ResponseFormat::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Classification of a response body, borrowing the payload proper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniffed<'a> {
    /// Detected format
    pub format: ResponseFormat,
    /// Bytes considered the payload (empty for `Unknown`)
    pub payload: &'a [u8],
}

impl<'a> Sniffed<'a> {
    fn new(format: ResponseFormat, payload: &'a [u8]) -> Self {
        Self { format, payload }
    }

    /// Whether the body matched a known format
    pub fn is_known(&self) -> bool {
        self.format != ResponseFormat::Unknown
    }
}

/// Classify a response body. Never fails: unrecognized input is `Unknown`.
pub fn sniff(data: &[u8]) -> Sniffed<'_> {
    if let Some(at) = find(data, &ZLIB_SIGNATURE) {
        return Sniffed::new(ResponseFormat::Deflate, &data[at..]);
    }
    if let Some(at) = find(data, &GZIP_SIGNATURE) {
        return Sniffed::new(ResponseFormat::Gzip, &data[at..]);
    }
    if let Some(xml) = trailing_xml(data) {
        return Sniffed::new(ResponseFormat::PlainXml, xml);
    }
    Sniffed::new(ResponseFormat::Unknown, &[])
}

/// Position of the first occurrence of `needle` in `haystack`
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Salvage a trailing XML-looking fragment.
///
/// After an optional leading `<html></html>` marker, the fragment runs from
/// the first `<` to a final `>` that is followed by nothing but whitespace.
/// A body holding only the marker is itself the fragment.
fn trailing_xml(data: &[u8]) -> Option<&[u8]> {
    data.strip_prefix(HTML_WRAPPER)
        .and_then(fragment)
        .or_else(|| fragment(data))
}

fn fragment(body: &[u8]) -> Option<&[u8]> {
    let end = body.iter().rposition(|b| !b.is_ascii_whitespace())?;
    if body[end] != b'>' {
        return None;
    }

    let start = body.iter().position(|&b| b == b'<')?;
    if start >= end {
        return None;
    }

    Some(&body[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_zlib_at_start() {
        let data = hex!("789c 0b c9 c8 2c 56");
        let sniffed = sniff(&data);
        assert_eq!(sniffed.format, ResponseFormat::Deflate);
        assert_eq!(sniffed.payload, &data[..]);
    }

    #[test]
    fn test_zlib_after_noise() {
        let data = hex!("0d0a 0d0a 789c 0102 03");
        let sniffed = sniff(&data);
        assert_eq!(sniffed.format, ResponseFormat::Deflate);
        assert_eq!(sniffed.payload, &hex!("789c 0102 03")[..]);
    }

    #[test]
    fn test_gzip_after_noise() {
        let data = hex!("2020 1f8b 0800 0000");
        let sniffed = sniff(&data);
        assert_eq!(sniffed.format, ResponseFormat::Gzip);
        assert_eq!(sniffed.payload, &hex!("1f8b 0800 0000")[..]);
    }

    #[test]
    fn test_zlib_takes_precedence_over_gzip() {
        let data = hex!("1f8b 08 00 789c 00");
        let sniffed = sniff(&data);
        assert_eq!(sniffed.format, ResponseFormat::Deflate);
        assert_eq!(sniffed.payload, &hex!("789c 00")[..]);
    }

    #[test]
    fn test_gzip_magic_without_method_byte() {
        let data = hex!("1f8b 09 00");
        assert_eq!(sniff(&data).format, ResponseFormat::Unknown);
    }

    #[test]
    fn test_plain_xml() {
        let data = b"<?xml version=\"1.0\"?>\n<REPLY><RESPONSE>SEND</RESPONSE></REPLY>\n";
        let sniffed = sniff(data);
        assert_eq!(sniffed.format, ResponseFormat::PlainXml);
        assert_eq!(
            sniffed.payload,
            &b"<?xml version=\"1.0\"?>\n<REPLY><RESPONSE>SEND</RESPONSE></REPLY>"[..]
        );
    }

    #[test]
    fn test_html_wrapped_xml() {
        let data = b"<html></html>junk<REPLY><ERROR>denied</ERROR></REPLY>  \r\n";
        let sniffed = sniff(data);
        assert_eq!(sniffed.format, ResponseFormat::PlainXml);
        assert_eq!(sniffed.payload, &b"<REPLY><ERROR>denied</ERROR></REPLY>"[..]);
    }

    #[test]
    fn test_bare_html_marker_is_plain_xml() {
        let sniffed = sniff(b"<html></html>\r\n");
        assert_eq!(sniffed.format, ResponseFormat::PlainXml);
        assert_eq!(sniffed.payload, &b"<html></html>"[..]);
    }

    #[test]
    fn test_leading_text_before_xml() {
        let data = b"HTTP noise <REPLY/>";
        let sniffed = sniff(data);
        assert_eq!(sniffed.format, ResponseFormat::PlainXml);
        assert_eq!(sniffed.payload, &b"<REPLY/>"[..]);
    }

    #[test]
    fn test_text_after_last_tag_is_unknown() {
        let data = b"<REPLY></REPLY> trailing words";
        assert_eq!(sniff(data).format, ResponseFormat::Unknown);
    }

    #[test]
    fn test_lone_bracket_is_unknown() {
        assert_eq!(sniff(b">").format, ResponseFormat::Unknown);
        assert_eq!(sniff(b"no tags here >").format, ResponseFormat::Unknown);
    }

    #[test]
    fn test_unknown_has_empty_payload() {
        let sniffed = sniff(b"plain text reply");
        assert_eq!(sniffed.format, ResponseFormat::Unknown);
        assert!(sniffed.payload.is_empty());
        assert!(!sniffed.is_known());
    }

    #[test]
    fn test_empty_and_short_inputs() {
        assert_eq!(sniff(b"").format, ResponseFormat::Unknown);
        assert_eq!(sniff(&[0x78]).format, ResponseFormat::Unknown);
        assert_eq!(sniff(b"   \n").format, ResponseFormat::Unknown);
    }
}
