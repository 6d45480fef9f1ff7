//! The command object model.
//!
//! Commands are the in-memory counterpart of STOMP frames: one logical
//! operation per variant. Outbound variants are produced by the session
//! layer above this crate and marshalled to frames; inbound variants are
//! reconstructed from broker frames by the unmarshaller. The mapping is
//! asymmetric on purpose: a single `Message` marshals to a SEND frame but
//! comes back wrapped in a `MessageDispatch`, and broker receipts/errors
//! come back as `Response`/`ExceptionResponse` rather than raw frames.

use crate::destination::Destination;

/// Message priority assumed when no `priority` header travels on the wire.
pub const DEFAULT_PRIORITY: u8 = 4;

/// Subscription acknowledgement modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckMode {
    Auto,
    Client,
    ClientIndividual,
}

impl AckMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AckMode::Auto => "auto",
            AckMode::Client => "client",
            AckMode::ClientIndividual => "client-individual",
        }
    }
}

/// Transaction operations, each with its own frame verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Begin,
    Commit,
    Rollback,
}

impl TransactionType {
    pub fn verb(&self) -> &'static str {
        match self {
            TransactionType::Begin => "BEGIN",
            TransactionType::Commit => "COMMIT",
            TransactionType::Rollback => "ABORT",
        }
    }
}

/// Identifier of the object a `RemoveInfo` tears down. Only consumer
/// removals have a STOMP frame (UNSUBSCRIBE); the rest are purely local.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectId {
    Consumer(String),
    Session(String),
    Connection(String),
}

/// Connection handshake parameters for the CONNECT frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionInfo {
    pub client_id: String,
    pub user_name: Option<String>,
    pub password: Option<String>,
    pub host: String,
    pub command_id: i32,
}

/// Body of an outbound or inbound message.
///
/// The kind decides wire treatment: binary bodies get a `content-length`
/// header (and `transformation: jms-byte` outbound); text bodies are
/// NUL-terminated UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Bytes(Vec<u8>),
}

impl MessageBody {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            MessageBody::Text(text) => text.as_bytes(),
            MessageBody::Bytes(bytes) => bytes,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, MessageBody::Bytes(_))
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl Default for MessageBody {
    fn default() -> Self {
        MessageBody::Text(String::new())
    }
}

/// A message, outbound (SEND) or inbound (inside a `MessageDispatch`).
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub destination: Option<Destination>,
    pub reply_to: Option<Destination>,
    pub correlation_id: Option<String>,
    /// Broker-assigned id; only populated on inbound messages.
    pub message_id: Option<String>,
    pub expiration: i64,
    pub timestamp: i64,
    pub priority: u8,
    pub msg_type: Option<String>,
    pub transaction_id: Option<String>,
    pub persistent: bool,
    pub group_id: Option<String>,
    pub group_sequence: i32,
    pub content: MessageBody,
    /// Application-supplied headers, copied verbatim after the reserved ones.
    pub headers: Vec<(String, String)>,
    pub command_id: i32,
    pub response_required: bool,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            destination: None,
            reply_to: None,
            correlation_id: None,
            message_id: None,
            expiration: 0,
            timestamp: 0,
            priority: DEFAULT_PRIORITY,
            msg_type: None,
            transaction_id: None,
            persistent: false,
            group_id: None,
            group_sequence: 0,
            content: MessageBody::default(),
            headers: Vec::new(),
            command_id: 0,
            response_required: false,
        }
    }
}

/// Subscription parameters for the SUBSCRIBE frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerInfo {
    pub consumer_id: String,
    pub destination: Option<Destination>,
    pub subscription_name: Option<String>,
    pub selector: Option<String>,
    pub ack_mode: AckMode,
    pub no_local: bool,
    pub dispatch_async: bool,
    pub exclusive: bool,
    pub maximum_pending_message_limit: i32,
    pub prefetch_size: i32,
    pub priority: u8,
    pub retroactive: bool,
    pub transformation: Option<String>,
    pub command_id: i32,
    pub response_required: bool,
}

impl Default for ConsumerInfo {
    fn default() -> Self {
        Self {
            consumer_id: String::new(),
            destination: None,
            subscription_name: None,
            selector: None,
            ack_mode: AckMode::Auto,
            no_local: false,
            dispatch_async: false,
            exclusive: false,
            maximum_pending_message_limit: 0,
            prefetch_size: 1000,
            priority: 0,
            retroactive: false,
            transformation: None,
            command_id: 0,
            response_required: false,
        }
    }
}

/// Acknowledgement of a consumed message (ACK frame).
#[derive(Debug, Clone, PartialEq)]
pub struct MessageAck {
    pub consumer_id: String,
    pub last_message_id: String,
    pub transaction_id: Option<String>,
    pub command_id: i32,
    pub response_required: bool,
}

/// Transaction demarcation (BEGIN / COMMIT / ABORT frames).
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionInfo {
    pub transaction_id: String,
    pub transaction_type: TransactionType,
    pub command_id: i32,
    pub response_required: bool,
}

/// Removal of a broker-side object; marshals to UNSUBSCRIBE for consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveInfo {
    pub object_id: ObjectId,
    pub command_id: i32,
    pub response_required: bool,
}

/// Orderly shutdown (DISCONNECT frame). May never require a response: the
/// peer is about to go away.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShutdownInfo {
    pub command_id: i32,
    pub response_required: bool,
}

/// Keep-alive pulse; a single LF on the wire in either direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeepAliveInfo;

/// Correlated acknowledgement of an earlier command, either read off a
/// RECEIPT frame or synthesized locally by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub correlation_id: i32,
}

/// Error reported by the broker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrokerError {
    pub message: String,
}

/// Correlated broker failure, built from an ERROR frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionResponse {
    pub correlation_id: i32,
    pub exception: BrokerError,
}

/// The peer's view of the connection, reconstructed from CONNECTED.
#[derive(Debug, Clone, PartialEq)]
pub struct WireFormatInfo {
    pub version: f32,
    pub session: Option<String>,
    /// How often the peer will write, i.e. our read-check interval (ms).
    pub write_check_interval: u32,
    /// How often the peer expects to read, i.e. our write-check interval (ms).
    pub read_check_interval: u32,
}

impl Default for WireFormatInfo {
    fn default() -> Self {
        Self {
            version: 1.0,
            session: None,
            write_check_interval: 0,
            read_check_interval: 0,
        }
    }
}

/// Envelope delivered to the consumer subsystem for each MESSAGE frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDispatch {
    pub consumer_id: String,
    pub destination: Option<Destination>,
    pub message: Message,
    pub redelivery_counter: i32,
}

/// One logical operation, in either direction.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Connect(ConnectionInfo),
    Message(Message),
    Subscribe(ConsumerInfo),
    Ack(MessageAck),
    Transaction(TransactionInfo),
    Remove(RemoveInfo),
    Shutdown(ShutdownInfo),
    KeepAlive(KeepAliveInfo),
    Response(Response),
    ExceptionResponse(ExceptionResponse),
    WireFormatInfo(WireFormatInfo),
    MessageDispatch(MessageDispatch),
}

impl Command {
    /// Whether the sender expects a correlated `Response` for this command.
    pub fn response_required(&self) -> bool {
        match self {
            Command::Message(message) => message.response_required,
            Command::Subscribe(info) => info.response_required,
            Command::Ack(ack) => ack.response_required,
            Command::Transaction(info) => info.response_required,
            Command::Remove(info) => info.response_required,
            Command::Shutdown(info) => info.response_required,
            _ => false,
        }
    }

    /// The sender-assigned id used for receipt correlation.
    pub fn command_id(&self) -> i32 {
        match self {
            Command::Connect(info) => info.command_id,
            Command::Message(message) => message.command_id,
            Command::Subscribe(info) => info.command_id,
            Command::Ack(ack) => ack.command_id,
            Command::Transaction(info) => info.command_id,
            Command::Remove(info) => info.command_id,
            Command::Shutdown(info) => info.command_id,
            _ => 0,
        }
    }
}
