//! Slice-based incremental STOMP frame parser.
//!
//! One call parses at most one frame and reports how many bytes it consumed,
//! so the codec can `advance` its read buffer and leave any following frame
//! untouched. `Ok(None)` always means "feed me more bytes"; anything
//! structurally wrong with bytes already present is a hard error.

use crate::error::WireError;
use crate::escape::unescape;
use crate::frame::Frame;

fn decode_text(raw: &[u8], unescape_headers: bool) -> Result<String, WireError> {
    if unescape_headers {
        let decoded = unescape(raw)?;
        String::from_utf8(decoded)
            .map_err(|e| WireError::MalformedFrame(format!("invalid utf8 in header: {}", e)))
    } else {
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|e| WireError::MalformedFrame(format!("invalid utf8 in frame: {}", e)))
    }
}

/// Parse a single STOMP frame from a raw byte slice.
///
/// Returns `Ok(Some((frame, consumed_bytes)))` when a full frame was parsed,
/// `Ok(None)` when more bytes are required, and `Err` on protocol errors.
/// Lone LF bytes ahead of the command line are skipped here (the codec turns
/// a leading LF into a keep-alive before ever calling the parser); CR is
/// tolerated before every LF. When `decode_headers` is set, header names and
/// values pass through the STOMP 1.1 escape decoder.
pub fn parse_frame_slice(
    input: &[u8],
    decode_headers: bool,
) -> Result<Option<(Frame, usize)>, WireError> {
    let mut pos = 0usize;
    let len = input.len();

    // Skip leading LF/CR (broker keep-alives and line-ending slack).
    while pos < len && (input[pos] == b'\n' || input[pos] == b'\r') {
        pos += 1;
    }

    // Command line. Commands are never escaped, whatever the version.
    let cmd_end_rel = match input[pos..].iter().position(|&b| b == b'\n') {
        Some(i) => i,
        None => return Ok(None),
    };
    let mut cmd_line = &input[pos..pos + cmd_end_rel];
    if cmd_line.last() == Some(&b'\r') {
        cmd_line = &cmd_line[..cmd_line.len() - 1];
    }
    let command = decode_text(cmd_line, false)?;
    pos += cmd_end_rel + 1;

    // Header lines until the blank separator line.
    let mut headers: Vec<(String, String)> = Vec::new();
    loop {
        if pos >= len {
            return Ok(None);
        }
        if input[pos] == b'\n' {
            pos += 1;
            break;
        }
        if input[pos] == b'\r' {
            if pos + 1 >= len {
                return Ok(None);
            }
            if input[pos + 1] == b'\n' {
                pos += 2;
                break;
            }
        }
        let line_end_rel = match input[pos..].iter().position(|&b| b == b'\n') {
            Some(i) => i,
            None => return Ok(None),
        };
        let mut line = &input[pos..pos + line_end_rel];
        if line.last() == Some(&b'\r') {
            line = &line[..line.len() - 1];
        }
        // Split at the first ':' only; values may contain further colons.
        let colon = line.iter().position(|&b| b == b':').ok_or_else(|| {
            WireError::MalformedFrame(format!(
                "header line without ':': {:?}",
                String::from_utf8_lossy(line)
            ))
        })?;
        let key = decode_text(&line[..colon], decode_headers)?;
        let value = decode_text(&line[colon + 1..], decode_headers)?;
        // Repeated names keep the first occurrence only.
        if !headers.iter().any(|(k, _)| *k == key) {
            headers.push((key, value));
        }
        pos += line_end_rel + 1;
    }

    let content_length = match headers.iter().find(|(k, _)| k == "content-length") {
        Some((_, v)) => Some(v.trim().parse::<usize>().map_err(|_| {
            WireError::MalformedFrame(format!("invalid content-length '{}'", v))
        })?),
        None => None,
    };

    let body: Vec<u8>;
    match content_length {
        Some(clen) => {
            // Fixed-size body plus the mandatory NUL after it.
            if pos + clen + 1 > len {
                return Ok(None);
            }
            body = input[pos..pos + clen].to_vec();
            pos += clen;
            if input[pos] != 0 {
                return Err(WireError::MalformedFrame(
                    "missing NUL terminator after content-length body".to_string(),
                ));
            }
            pos += 1;
        }
        None => match input[pos..].iter().position(|&b| b == 0) {
            Some(nul_rel) => {
                body = input[pos..pos + nul_rel].to_vec();
                pos += nul_rel + 1;
            }
            None => return Ok(None),
        },
    }

    Ok(Some((
        Frame {
            command,
            headers,
            body,
        },
        pos,
    )))
}
