//! Session log line decoding.

use crate::models::Event;
use serde_json::Value;

/// Decode one raw log line.
///
/// Returns `None` when the line is blank, not valid UTF-8, not valid JSON, or
/// not a JSON object. Such lines are skipped by the caller.
pub fn decode_line(line: &[u8]) -> Option<Event> {
    let text = std::str::from_utf8(line).ok()?.trim();
    if text.is_empty() {
        return None;
    }

    let value: Value = serde_json::from_str(text).ok()?;
    if !value.is_object() {
        return None;
    }

    serde_json::from_value(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_line() {
        let event = decode_line(br#"{"sessionId":"abc","timestamp":"2025-02-01T08:00:00Z"}"#)
            .unwrap();
        assert_eq!(event.session_id(), Some("abc"));
        assert_eq!(event.day_key(), Some("2025-02-01"));
    }

    #[test]
    fn test_decode_trailing_newline() {
        assert!(decode_line(b"{\"sessionId\":\"abc\"}\r\n").is_some());
    }

    #[test]
    fn test_decode_skips_garbage() {
        assert!(decode_line(b"").is_none());
        assert!(decode_line(b"   \n").is_none());
        assert!(decode_line(b"{not json").is_none());
        assert!(decode_line(b"{\"sessionId\":\"a\"").is_none());
    }

    #[test]
    fn test_decode_skips_non_objects() {
        assert!(decode_line(b"[1, 2, 3]").is_none());
        assert!(decode_line(b"\"text\"").is_none());
        assert!(decode_line(b"null").is_none());
    }

    #[test]
    fn test_decode_skips_invalid_utf8() {
        assert!(decode_line(b"{\"sessionId\":\"\xff\xfe\"}").is_none());
    }

    #[test]
    fn test_decode_keeps_non_ascii() {
        let event = decode_line("{\"sessionId\":\"セッション\"}".as_bytes()).unwrap();
        assert_eq!(event.session_id(), Some("セッション"));
    }
}
