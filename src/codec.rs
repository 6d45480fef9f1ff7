use bytes::{Buf, BufMut, BytesMut};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::codec::{Decoder, Encoder};

use crate::command::{Command, ConnectionInfo, KeepAliveInfo, Response, WireFormatInfo};
use crate::error::WireError;
use crate::frame::Frame;
use crate::parser::parse_frame_slice;
use crate::{marshal, unmarshal};

/// Default ceiling on connection inactivity, in milliseconds. Drives the
/// `heart-beat` header offered in CONNECT.
pub const DEFAULT_MAX_INACTIVITY_DURATION: u64 = 30_000;

/// Default delay before inactivity checking starts, in milliseconds.
pub const DEFAULT_MAX_INACTIVITY_INITIAL_DELAY: u64 = 0;

/// Connection lifecycle as seen from the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Fresh,
    ConnectPending,
    Connected,
    Disconnected,
}

/// Per-connection wire-format session.
///
/// `StompWireFormat` binds the command marshaller and unmarshaller to a
/// single connection's negotiation state: the protocol version the peer
/// answered with (which decides header escaping), the correlation id of the
/// in-flight CONNECT, the peer's heart-beat intervals, and the local
/// inactivity configuration.
///
/// `marshal` and `unmarshal` must not be invoked concurrently for the same
/// session; the surrounding transport serializes them. The session also
/// implements `tokio_util::codec::{Decoder, Encoder}` so it can drive a
/// `Framed` transport directly.
///
/// Some broker frames answer a request the application never sees (the
/// CONNECTED handshake reply, receipts flagged `ignore:`). For those the
/// session synthesizes a [`Response`] and pushes it to the transport channel
/// handed to [`with_transport`](Self::with_transport), always before the
/// `unmarshal` call that produced it returns. Without a channel such
/// responses are logged and dropped; unmarshalling still succeeds.
pub struct StompWireFormat {
    encode_headers: bool,
    pending_connect_id: Option<i32>,
    remote_wire_info: Option<WireFormatInfo>,
    max_inactivity_duration: u64,
    max_inactivity_initial_delay: u64,
    state: SessionState,
    transport_tx: Option<UnboundedSender<Command>>,
}

impl StompWireFormat {
    pub fn new() -> Self {
        Self {
            encode_headers: false,
            pending_connect_id: None,
            remote_wire_info: None,
            max_inactivity_duration: DEFAULT_MAX_INACTIVITY_DURATION,
            max_inactivity_initial_delay: DEFAULT_MAX_INACTIVITY_INITIAL_DELAY,
            state: SessionState::Fresh,
            transport_tx: None,
        }
    }

    /// Wire the channel that receives synthesized responses (builder style).
    pub fn with_transport(mut self, transport_tx: UnboundedSender<Command>) -> Self {
        self.transport_tx = Some(transport_tx);
        self
    }

    /// Override the inactivity ceiling in milliseconds (builder style).
    /// Zero disables heart-beat negotiation entirely.
    pub fn with_max_inactivity_duration(mut self, millis: u64) -> Self {
        self.max_inactivity_duration = millis;
        self
    }

    /// Whether header escaping is active (negotiated version above 1.0).
    pub fn encode_headers(&self) -> bool {
        self.encode_headers
    }

    /// The peer's CONNECTED info, once received.
    pub fn remote_wire_info(&self) -> Option<&WireFormatInfo> {
        self.remote_wire_info.as_ref()
    }

    /// Correlation id of the in-flight CONNECT, if any.
    pub fn pending_connect_id(&self) -> Option<i32> {
        self.pending_connect_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn max_inactivity_duration(&self) -> u64 {
        self.max_inactivity_duration
    }

    pub fn max_inactivity_initial_delay(&self) -> u64 {
        self.max_inactivity_initial_delay
    }

    /// How often we require the peer to show life, in milliseconds.
    pub fn read_check_interval(&self) -> u64 {
        self.max_inactivity_duration
    }

    /// How often we promise to write, in milliseconds. A third of the
    /// inactivity ceiling, floored at one, so our pulses comfortably outpace
    /// the peer's read check.
    pub fn write_check_interval(&self) -> u64 {
        if self.max_inactivity_duration > 0 {
            (self.max_inactivity_duration / 3).max(1)
        } else {
            self.max_inactivity_duration
        }
    }

    /// Serialize one outbound command into `dst`.
    ///
    /// Commands with no STOMP frame shape but `response_required` set get a
    /// locally synthesized `Response` pushed to the transport channel and
    /// write nothing; commands with neither are dropped with a warning.
    pub fn marshal(&mut self, command: &Command, dst: &mut BytesMut) -> Result<(), WireError> {
        match command {
            Command::Connect(info) => return self.write_connect(info, dst),
            Command::Message(message) => marshal::send_frame(message)?.encode(self.encode_headers, dst),
            Command::Subscribe(info) => {
                marshal::subscribe_frame(info)?.encode(self.encode_headers, dst)
            }
            Command::Remove(info) => match marshal::unsubscribe_frame(info) {
                Some(frame) => frame.encode(self.encode_headers, dst),
                None => {
                    tracing::debug!(object_id = ?info.object_id, "removal has no wire form, dropping");
                }
            },
            Command::Ack(ack) => marshal::ack_frame(ack).encode(self.encode_headers, dst),
            Command::Transaction(info) => {
                marshal::transaction_frame(info).encode(self.encode_headers, dst)
            }
            Command::Shutdown(info) => {
                if info.response_required {
                    return Err(WireError::Protocol(
                        "DISCONNECT cannot require a response".to_string(),
                    ));
                }
                Frame::new("DISCONNECT").encode(self.encode_headers, dst);
                self.state = SessionState::Disconnected;
            }
            Command::KeepAlive(_) => dst.put_u8(b'\n'),
            other => {
                if other.response_required() {
                    // Nothing to say on the wire, but the sender is waiting:
                    // answer locally.
                    self.send_to_transport(Command::Response(Response {
                        correlation_id: other.command_id(),
                    }));
                } else {
                    tracing::warn!(command = ?other, "command has no STOMP mapping, ignoring");
                }
            }
        }
        Ok(())
    }

    /// Read one inbound command out of `src`.
    ///
    /// Returns `Ok(None)` when the buffer does not yet hold a complete
    /// frame. Frames with unrecognized verbs are consumed, logged and
    /// skipped, so a later complete frame in the same buffer still comes
    /// through on this call.
    pub fn unmarshal(&mut self, src: &mut BytesMut) -> Result<Option<Command>, WireError> {
        loop {
            // CR ahead of a frame is line-ending slack; LF is a keep-alive.
            while !src.is_empty() && src[0] == b'\r' {
                src.advance(1);
            }
            if !src.is_empty() && src[0] == b'\n' {
                src.advance(1);
                return Ok(Some(Command::KeepAlive(KeepAliveInfo)));
            }

            let Some((frame, consumed)) = parse_frame_slice(src.as_ref(), self.encode_headers)?
            else {
                return Ok(None);
            };
            src.advance(consumed);

            if let Some(command) = self.read_command(frame)? {
                return Ok(Some(command));
            }
        }
    }

    fn write_connect(
        &mut self,
        info: &ConnectionInfo,
        dst: &mut BytesMut,
    ) -> Result<(), WireError> {
        if self.pending_connect_id.is_some() {
            return Err(WireError::Protocol(
                "CONNECT while a previous CONNECT is still pending".to_string(),
            ));
        }

        let mut frame = Frame::new("CONNECT").header("client-id", info.client_id.clone());
        if let Some(login) = info.user_name.as_deref().filter(|s| !s.is_empty()) {
            frame = frame.header("login", login);
        }
        if let Some(passcode) = info.password.as_deref().filter(|s| !s.is_empty()) {
            frame = frame.header("passcode", passcode);
        }
        frame = frame
            .header("host", info.host.clone())
            .header("accept-version", "1.0,1.1");
        if self.max_inactivity_duration != 0 {
            frame = frame.header(
                "heart-beat",
                format!(
                    "{},{}",
                    self.write_check_interval(),
                    self.read_check_interval()
                ),
            );
        }

        frame.encode(self.encode_headers, dst);
        // The CONNECTED reply itself carries the correlation; no receipt.
        self.pending_connect_id = Some(info.command_id);
        self.state = SessionState::ConnectPending;
        Ok(())
    }

    fn read_command(&mut self, mut frame: Frame) -> Result<Option<Command>, WireError> {
        match frame.command.as_str() {
            "CONNECTED" => self.read_connected(frame).map(Some),
            "RECEIPT" => match unmarshal::read_receipt(&mut frame)? {
                Some(response) => Ok(Some(Command::Response(response))),
                None => {
                    tracing::error!("RECEIPT frame without receipt-id, skipping");
                    Ok(None)
                }
            },
            "ERROR" => Ok(Some(unmarshal::read_error(&mut frame))),
            "MESSAGE" => unmarshal::read_message(frame)
                .map(Command::MessageDispatch)
                .map(Some),
            verb => {
                tracing::error!(verb, "unknown STOMP frame, skipping");
                Ok(None)
            }
        }
    }

    fn read_connected(&mut self, mut frame: Frame) -> Result<Command, WireError> {
        let info = unmarshal::read_connected(&mut frame)?;
        if info.version > 1.0 {
            self.encode_headers = true;
        }
        self.remote_wire_info = Some(info.clone());

        match self.pending_connect_id.take() {
            Some(correlation_id) => {
                self.state = SessionState::Connected;
                self.send_to_transport(Command::Response(Response { correlation_id }));
            }
            None => {
                return Err(WireError::Protocol(
                    "CONNECTED received without a pending CONNECT".to_string(),
                ));
            }
        }

        Ok(Command::WireFormatInfo(info))
    }

    fn send_to_transport(&self, command: Command) {
        match &self.transport_tx {
            Some(tx) => {
                if tx.send(command).is_err() {
                    tracing::warn!("transport channel closed, dropping synthesized command");
                }
            }
            None => {
                tracing::debug!(command = ?command, "no transport wired, dropping synthesized command");
            }
        }
    }
}

impl Default for StompWireFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder<Command> for StompWireFormat {
    type Error = WireError;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.marshal(&item, dst)
    }
}

impl Decoder for StompWireFormat {
    type Item = Command;
    type Error = WireError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.unmarshal(src)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.unmarshal(src)? {
            Some(command) => Ok(Some(command)),
            None if src.is_empty() => Ok(None),
            None => Err(WireError::MalformedFrame(
                "stream ended in the middle of a frame".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{ExceptionResponse, BrokerError, ShutdownInfo};

    fn connect_info() -> ConnectionInfo {
        ConnectionInfo {
            client_id: "client".into(),
            user_name: None,
            password: None,
            host: "localhost".into(),
            command_id: 1,
        }
    }

    #[test]
    fn check_intervals_derive_from_inactivity_duration() {
        let codec = StompWireFormat::new();
        assert_eq!(codec.read_check_interval(), 30_000);
        assert_eq!(codec.write_check_interval(), 10_000);

        let codec = StompWireFormat::new().with_max_inactivity_duration(2);
        assert_eq!(codec.write_check_interval(), 1);

        let codec = StompWireFormat::new().with_max_inactivity_duration(0);
        assert_eq!(codec.write_check_interval(), 0);
    }

    #[test]
    fn second_connect_while_pending_is_rejected() {
        let mut codec = StompWireFormat::new();
        let mut buf = BytesMut::new();
        codec
            .marshal(&Command::Connect(connect_info()), &mut buf)
            .unwrap();
        assert_eq!(codec.state(), SessionState::ConnectPending);

        let err = codec
            .marshal(&Command::Connect(connect_info()), &mut buf)
            .unwrap_err();
        assert!(matches!(err, WireError::Protocol(_)));
    }

    #[test]
    fn disconnect_with_response_required_is_rejected() {
        let mut codec = StompWireFormat::new();
        let mut buf = BytesMut::new();
        let err = codec
            .marshal(
                &Command::Shutdown(ShutdownInfo {
                    command_id: 2,
                    response_required: true,
                }),
                &mut buf,
            )
            .unwrap_err();
        assert!(matches!(err, WireError::Protocol(_)));
        assert!(buf.is_empty());
    }

    #[test]
    fn keepalive_is_a_single_lf() {
        let mut codec = StompWireFormat::new();
        let mut buf = BytesMut::new();
        codec
            .marshal(&Command::KeepAlive(KeepAliveInfo), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"\n");
    }

    #[test]
    fn unmapped_command_without_response_writes_nothing() {
        let mut codec = StompWireFormat::new();
        let mut buf = BytesMut::new();
        codec
            .marshal(
                &Command::ExceptionResponse(ExceptionResponse {
                    correlation_id: 1,
                    exception: BrokerError::default(),
                }),
                &mut buf,
            )
            .unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn connected_without_pending_connect_errors() {
        let mut codec = StompWireFormat::new();
        let mut buf = BytesMut::from(&b"CONNECTED\nversion:1.1\n\n\0"[..]);
        let err = codec.unmarshal(&mut buf).unwrap_err();
        assert!(matches!(err, WireError::Protocol(_)));
    }

    #[test]
    fn unknown_verb_is_skipped_and_next_frame_delivered() {
        let mut codec = StompWireFormat::new();
        let mut buf = BytesMut::from(
            &b"WIBBLE\nx:y\n\n\0ERROR\nmessage:boom\n\n\0"[..],
        );
        match codec.unmarshal(&mut buf).unwrap() {
            Some(Command::ExceptionResponse(response)) => {
                assert_eq!(response.exception.message, "boom");
            }
            other => panic!("expected ExceptionResponse, got {:?}", other),
        }
    }
}
