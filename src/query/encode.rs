//! Percent-encoding of a single parameter value with a length bound.

use std::borrow::Cow;

/// Longest percent-encoded value emitted into a URL
pub const MAX_ENCODED_LEN: usize = 1500;

/// Marker put in place of the dropped head of an oversized value
pub const ELLIPSIS: char = '\u{2026}';

/// Characters removed from the head per truncation step
const TRUNCATION_STEP: usize = 5;

/// Percent-encode a value for a query string.
///
/// Everything but `A-Z a-z 0-9 - . _ ~` is escaped as UTF-8 octets. While the
/// encoded form is longer than [`MAX_ENCODED_LEN`], the first five characters
/// of the raw value are replaced by a single `…` and the value re-encoded, so
/// the tail survives and exactly one marker leads the result.
pub fn encode_value(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    urlencoding::encode(&truncate_value(value)).into_owned()
}

/// Apply the head-truncation policy to a raw value.
///
/// Equivalent to repeatedly replacing the first five characters with `…`
/// until the encoded length fits, computed in one pass over the value.
pub fn truncate_value(value: &str) -> Cow<'_, str> {
    let lengths: Vec<usize> = value.chars().map(encoded_len).collect();

    // suffix[i]: encoded length of value.chars().skip(i)
    let mut suffix = vec![0; lengths.len() + 1];
    for (i, len) in lengths.iter().enumerate().rev() {
        suffix[i] = suffix[i + 1] + len;
    }

    if suffix[0] <= MAX_ENCODED_LEN {
        return Cow::Borrowed(value);
    }

    let marker_len = encoded_len(ELLIPSIS);
    let mut start = 0;
    let mut marked = false;

    loop {
        let current = if marked { marker_len } else { 0 } + suffix[start];
        if current <= MAX_ENCODED_LEN {
            break;
        }
        let remaining = usize::from(marked) + lengths.len() - start;
        if remaining < TRUNCATION_STEP {
            break;
        }
        // The marker itself counts as one of the removed characters.
        start += if marked {
            TRUNCATION_STEP - 1
        } else {
            TRUNCATION_STEP
        };
        marked = true;
    }

    let offset = value
        .char_indices()
        .nth(start)
        .map_or(value.len(), |(at, _)| at);

    let mut truncated = String::with_capacity(value.len() - offset + ELLIPSIS.len_utf8());
    truncated.push(ELLIPSIS);
    truncated.push_str(&value[offset..]);
    Cow::Owned(truncated)
}

fn encoded_len(c: char) -> usize {
    if c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~') {
        1
    } else {
        3 * c.len_utf8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Literal application of the truncation rule, one step at a time
    fn truncate_naive(value: &str) -> String {
        let mut value = value.to_string();
        while urlencoding::encode(&value).len() > MAX_ENCODED_LEN {
            let head: usize = value.chars().take(TRUNCATION_STEP).map(char::len_utf8).sum();
            value = format!("{ELLIPSIS}{}", &value[head..]);
        }
        value
    }

    #[test]
    fn test_empty() {
        assert_eq!(encode_value(""), "");
    }

    #[test]
    fn test_unreserved_untouched() {
        assert_eq!(encode_value("abc-DEF_1.2~"), "abc-DEF_1.2~");
    }

    #[test]
    fn test_reserved_escaped() {
        assert_eq!(encode_value("a b&c=d/e?"), "a%20b%26c%3Dd%2Fe%3F");
        assert_eq!(encode_value("é"), "%C3%A9");
    }

    #[test]
    fn test_short_value_not_truncated() {
        let value = "a".repeat(MAX_ENCODED_LEN);
        assert_eq!(encode_value(&value), value);
        assert!(matches!(truncate_value(&value), Cow::Borrowed(_)));
    }

    #[test]
    fn test_long_value_keeps_tail() {
        let value = format!("{}/usr/lib/final-component.so", "x".repeat(3000));
        let encoded = encode_value(&value);

        assert!(encoded.len() <= MAX_ENCODED_LEN);
        assert!(encoded.starts_with("%E2%80%A6"));
        assert!(encoded.ends_with("%2Fusr%2Flib%2Ffinal-component.so"));
        assert_eq!(encoded.matches("%E2%80%A6").count(), 1);
    }

    #[test]
    fn test_matches_stepwise_rule() {
        let samples = [
            "y".repeat(1501),
            "y".repeat(1506),
            " ".repeat(600),
            format!("{}{}", "é".repeat(300), "z".repeat(200)),
            "日本語のパス/".repeat(80),
        ];
        for sample in &samples {
            assert_eq!(truncate_value(sample), truncate_naive(sample));
        }
    }

    #[test]
    fn test_reapplication_keeps_single_marker() {
        let once = truncate_value(&"q".repeat(5000)).into_owned();
        let longer = format!("{once}{}", "r".repeat(100));
        let twice = truncate_value(&longer);

        assert_eq!(twice.matches(ELLIPSIS).count(), 1);
        assert!(twice.starts_with(ELLIPSIS));
        assert!(twice.ends_with(&"r".repeat(100)));
        assert!(urlencoding::encode(&twice).len() <= MAX_ENCODED_LEN);
    }
}
