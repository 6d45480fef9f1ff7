use thiserror::Error;

/// Errors produced while marshalling or unmarshalling STOMP frames.
///
/// Transport-level read/write failures pass through as `Io`; everything else
/// is a protocol-layer diagnosis. Unknown inbound frame verbs are *not* an
/// error: they are logged and skipped by the session.
#[derive(Error, Debug)]
pub enum WireError {
    /// Structural framing violation: bad header line, bad content-length,
    /// truncated stream, malformed heart-beat value.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Invalid escape sequence in a header name or value under STOMP >= 1.1
    /// header encoding.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// Semantic violation of the connection state machine, e.g. CONNECTED
    /// without a pending CONNECT, or DISCONNECT requiring a response.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// I/O error from the underlying reader or writer.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WireError>;
