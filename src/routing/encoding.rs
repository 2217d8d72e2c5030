//! Percent-encoding tables shared by link generation and inbound matching.
//!
//! # Responsibilities
//! - Encode path content exactly as the templated-route engine does
//! - Encode query-string keys and values
//! - Decode request paths before segment matching
//!
//! # Design Decisions
//! - Path content keeps RFC 3986 unreserved and reserved characters, except
//!   `#` and `?` which would otherwise end the path
//! - `#` and `?` are written with lowercase hex (`%23`, `%3f`); every other
//!   escape uses uppercase hex
//! - Direct and delegated link generation both go through [`encode_path`], so
//!   their outputs cannot diverge

use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped in query-string keys and values: everything but unreserved.
const DATA_STRING: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Characters escaped in path content: everything but unreserved and reserved.
const URI_STRING: &AsciiSet = &DATA_STRING
    .remove(b':')
    .remove(b'/')
    .remove(b'?')
    .remove(b'#')
    .remove(b'[')
    .remove(b']')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=');

/// Encode path content (prefix literals and parameter values).
pub fn encode_path(input: &str) -> String {
    let escaped = utf8_percent_encode(input, URI_STRING).to_string();
    if escaped.contains(['#', '?']) {
        escaped.replace('#', "%23").replace('?', "%3f")
    } else {
        escaped
    }
}

/// Encode a query-string key or value.
pub fn encode_data(input: &str) -> String {
    utf8_percent_encode(input, DATA_STRING).to_string()
}

/// Decode a request path. Invalid UTF-8 sequences become U+FFFD.
pub fn decode_path(input: &str) -> Cow<'_, str> {
    percent_decode_str(input).decode_utf8_lossy()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_untouched() {
        assert_eq!(encode_path("Customers(1)/Orders"), "Customers(1)/Orders");
        assert_eq!(encode_path(""), "");
    }

    #[test]
    fn test_reserved_characters() {
        assert_eq!(
            encode_path("Customers('$&+,/:;=?@ <>#%{}|\\^~[]` ')"),
            "Customers('$&+,/:;=%3f@%20%3C%3E%23%25%7B%7D%7C%5C%5E~[]%60%20')"
        );
    }

    #[test]
    fn test_non_ascii_is_utf8_encoded() {
        assert_eq!(encode_path("Café"), "Caf%C3%A9");
    }

    #[test]
    fn test_data_string_escapes_reserved() {
        assert_eq!(encode_data("a b&c=d/e"), "a%20b%26c%3Dd%2Fe");
        assert_eq!(encode_data("safe-._~"), "safe-._~");
    }

    #[test]
    fn test_decode_reverses_path_encoding() {
        let raw = "Customers('$&+,/:;=?@ <>#%{}|\\^~[]` ')";
        assert_eq!(decode_path(&encode_path(raw)), raw);
    }
}
