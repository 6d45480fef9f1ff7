use std::fmt;

use bytes::{BufMut, BytesMut};

use crate::escape::escape;

/// A simple representation of a STOMP frame.
///
/// `Frame` contains the command (e.g. "SEND", "MESSAGE"), an ordered list
/// of headers (key/value pairs) and the raw body bytes. Header order is
/// preserved on the wire; lookups resolve duplicates first-wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// STOMP command (e.g. CONNECT, SEND, SUBSCRIBE)
    pub command: String,
    /// Ordered headers as (key, value) pairs
    pub headers: Vec<(String, String)>,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl Frame {
    /// Create a new frame with the given command and empty headers/body.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Add a header (builder style).
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Set the frame body (builder style).
    pub fn set_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Get the value of a header by name.
    ///
    /// Returns the first header value matching the given key (case-sensitive),
    /// or `None` if no such header exists.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove a header by name, returning the first occurrence's value.
    ///
    /// Every occurrence of the name is removed so a later pass over the
    /// remaining headers never sees a shadowed duplicate.
    pub fn remove_header(&mut self, key: &str) -> Option<String> {
        let mut first = None;
        self.headers.retain_mut(|(k, v)| {
            if *k == key {
                if first.is_none() {
                    first = Some(std::mem::take(v));
                }
                false
            } else {
                true
            }
        });
        first
    }

    /// Serialize the frame into `dst` in wire format: command line, one
    /// `name:value` line per header, blank line, body, NUL terminator.
    ///
    /// When `escape_headers` is set (negotiated version above 1.0) header
    /// names and values pass through the STOMP 1.1 escape table; for 1.0
    /// peers the bytes go out verbatim.
    pub fn encode(&self, escape_headers: bool, dst: &mut BytesMut) {
        dst.extend_from_slice(self.command.as_bytes());
        dst.put_u8(b'\n');

        for (key, value) in &self.headers {
            if escape_headers {
                dst.extend_from_slice(escape(key).as_bytes());
                dst.put_u8(b':');
                dst.extend_from_slice(escape(value).as_bytes());
            } else {
                dst.extend_from_slice(key.as_bytes());
                dst.put_u8(b':');
                dst.extend_from_slice(value.as_bytes());
            }
            dst.put_u8(b'\n');
        }

        dst.put_u8(b'\n');
        dst.extend_from_slice(&self.body);
        dst.put_u8(0);
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Command: {}", self.command)?;
        for (k, v) in &self.headers {
            writeln!(f, "{}: {}", k, v)?;
        }
        writeln!(f, "Body ({} bytes)", self.body.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_header_returns_first_and_drops_all() {
        let mut frame = Frame::new("MESSAGE")
            .header("dup", "first")
            .header("other", "x")
            .header("dup", "second");

        assert_eq!(frame.remove_header("dup"), Some("first".to_string()));
        assert_eq!(frame.get_header("dup"), None);
        assert_eq!(frame.get_header("other"), Some("x"));
    }

    #[test]
    fn encode_plain_frame() {
        let frame = Frame::new("SEND")
            .header("destination", "/queue/a")
            .set_body(b"hi".to_vec());

        let mut buf = BytesMut::new();
        frame.encode(false, &mut buf);
        assert_eq!(&buf[..], b"SEND\ndestination:/queue/a\n\nhi\0");
    }

    #[test]
    fn encode_escapes_only_when_enabled() {
        let frame = Frame::new("SEND").header("custom", "a:b");

        let mut raw = BytesMut::new();
        frame.encode(false, &mut raw);
        assert!(raw.windows(3).any(|w| w == b"a:b"));

        let mut escaped = BytesMut::new();
        frame.encode(true, &mut escaped);
        assert!(escaped.windows(4).any(|w| w == b"a\\cb"));
    }
}
