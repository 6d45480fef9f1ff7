//! STOMP 1.0/1.1 wire-format codec for ActiveMQ-dialect brokers.
//!
//! The crate maps an in-memory [`Command`] model onto STOMP frames and back,
//! and tracks the per-connection negotiation state (protocol version, header
//! escaping, heart-beat intervals, pending CONNECT correlation) in
//! [`StompWireFormat`]. The session implements the `tokio_util` codec traits
//! so it can be dropped into a `Framed` transport as-is.

pub mod codec;
pub mod command;
pub mod destination;
pub mod error;
pub mod escape;
pub mod frame;
pub mod parser;

mod marshal;
mod unmarshal;

pub use codec::{
    SessionState, StompWireFormat, DEFAULT_MAX_INACTIVITY_DURATION,
    DEFAULT_MAX_INACTIVITY_INITIAL_DELAY,
};
pub use command::{
    AckMode, BrokerError, Command, ConnectionInfo, ConsumerInfo, ExceptionResponse, KeepAliveInfo,
    Message, MessageAck, MessageBody, MessageDispatch, ObjectId, RemoveInfo, Response,
    ShutdownInfo, TransactionInfo, TransactionType, WireFormatInfo, DEFAULT_PRIORITY,
};
pub use destination::Destination;
pub use error::WireError;
pub use frame::Frame;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_frame_display() {
        let f = Frame::new("CONNECT")
            .header("accept-version", "1.0,1.1")
            .set_body(b"hello".to_vec());
        let s = format!("{}", f);
        assert!(s.contains("CONNECT"));
        assert!(s.contains("Body (5 bytes)"));
    }
}
