//! STOMP 1.1 header escaping.
//!
//! Header names and values use exactly four escape sequences on the wire:
//! `\\` for backslash, `\n` for line feed, `\r` for carriage return and
//! `\c` for colon. Any other character maps to itself. Escaping is only
//! active once a protocol version above 1.0 has been negotiated; callers
//! gate on that and pass raw bytes through for 1.0 peers.

use crate::error::WireError;

/// Escape a header name or value for wire transmission.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            _ => out.push(ch),
        }
    }
    out
}

/// Decode the escape sequences in a raw header name or value.
///
/// Fails with `MalformedHeader` on `\x` for any `x` outside `\ n r c`, and
/// on a lone trailing backslash.
pub fn unescape(input: &[u8]) -> Result<Vec<u8>, WireError> {
    let mut out = Vec::with_capacity(input.len());
    let mut iter = input.iter();
    while let Some(&b) = iter.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match iter.next() {
            Some(b'\\') => out.push(b'\\'),
            Some(b'n') => out.push(b'\n'),
            Some(b'r') => out.push(b'\r'),
            Some(b'c') => out.push(b':'),
            Some(&other) => {
                return Err(WireError::MalformedHeader(format!(
                    "invalid escape sequence \\{}",
                    other as char
                )));
            }
            None => {
                return Err(WireError::MalformedHeader(
                    "incomplete escape sequence at end of header".to_string(),
                ));
            }
        }
    }
    Ok(out)
}
