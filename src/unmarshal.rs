//! Readers that turn inbound frames into commands.
//!
//! These are pure frame transformations; session-state effects (toggling
//! header escaping, resolving the pending CONNECT) live on the session.

use crate::command::{
    BrokerError, Command, ExceptionResponse, Message, MessageBody, MessageDispatch, Response,
    WireFormatInfo,
};
use crate::destination::Destination;
use crate::error::WireError;
use crate::frame::Frame;

/// Prefix marking a receipt the application never asked to see.
pub(crate) const IGNORE_PREFIX: &str = "ignore:";

fn parse_numeric<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, WireError> {
    value
        .trim()
        .parse()
        .map_err(|_| WireError::MalformedFrame(format!("invalid {} header '{}'", name, value)))
}

/// Read a CONNECTED frame into the peer's wire-format info.
///
/// A missing `version` header means a 1.0 peer with no heart-beating; the
/// `session` and `heart-beat` headers are only meaningful alongside an
/// explicit version.
pub(crate) fn read_connected(frame: &mut Frame) -> Result<WireFormatInfo, WireError> {
    let mut info = WireFormatInfo::default();
    let Some(version) = frame.remove_header("version") else {
        return Ok(info);
    };
    info.version = parse_numeric("version", &version)?;
    if info.version > 1.0 {
        info.session = frame.remove_header("session");
    }
    if let Some(heart_beat) = frame.remove_header("heart-beat") {
        let mut parts = heart_beat.split(',');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(write), Some(read), None) => {
                info.write_check_interval = parse_numeric("heart-beat", write)?;
                info.read_check_interval = parse_numeric("heart-beat", read)?;
            }
            _ => {
                return Err(WireError::MalformedFrame(format!(
                    "malformed heart-beat header '{}'",
                    heart_beat
                )));
            }
        }
    }
    Ok(info)
}

/// Read a RECEIPT frame into a `Response`.
///
/// Returns `Ok(None)` when the frame has no `receipt-id`; the caller treats
/// that like an unknown frame. The `ignore:` prefix is stripped either way,
/// since the correlation id behind it is the same.
pub(crate) fn read_receipt(frame: &mut Frame) -> Result<Option<Response>, WireError> {
    let Some(receipt_id) = frame.remove_header("receipt-id") else {
        return Ok(None);
    };
    let text = receipt_id.strip_prefix(IGNORE_PREFIX).unwrap_or(&receipt_id);
    let correlation_id = parse_numeric("receipt-id", text)?;
    Ok(Some(Response { correlation_id }))
}

/// Read an ERROR frame.
///
/// Errors correlated to an `ignore:` receipt are downgraded to plain
/// responses; the caller asked for the receipt to stay invisible and an
/// error outcome does not change that. Everything else becomes an
/// `ExceptionResponse` carrying the broker's message.
pub(crate) fn read_error(frame: &mut Frame) -> Command {
    let receipt_id = frame.remove_header("receipt-id");
    if let Some(id) = &receipt_id {
        if let Some(text) = id.strip_prefix(IGNORE_PREFIX) {
            let correlation_id = text.trim().parse().unwrap_or(0);
            return Command::Response(Response { correlation_id });
        }
    }
    let correlation_id = receipt_id
        .as_deref()
        .and_then(|id| id.trim().parse().ok())
        .unwrap_or(0);
    let message = frame.remove_header("message").unwrap_or_default();
    Command::ExceptionResponse(ExceptionResponse {
        correlation_id,
        exception: BrokerError { message },
    })
}

/// Read a MESSAGE frame into the dispatch envelope for the consumer layer.
///
/// A `content-length` header marks the body as binary; without it the body
/// is text, decoded as UTF-8 with replacement. Reserved headers map to typed
/// fields, everything left over becomes application headers.
pub(crate) fn read_message(mut frame: Frame) -> Result<MessageDispatch, WireError> {
    let binary = frame.get_header("content-length").is_some();
    frame.remove_header("transformation");
    frame.remove_header("receipt");
    frame.remove_header("content-length");

    let mut message = Message {
        content: if binary {
            MessageBody::Bytes(std::mem::take(&mut frame.body))
        } else {
            MessageBody::Text(String::from_utf8_lossy(&frame.body).into_owned())
        },
        ..Message::default()
    };

    message.msg_type = frame.remove_header("type");
    message.destination = frame
        .remove_header("destination")
        .and_then(|d| Destination::from_wire(&d));
    message.reply_to = frame
        .remove_header("reply-to")
        .and_then(|d| Destination::from_wire(&d));
    let consumer_id = frame.remove_header("subscription").unwrap_or_default();
    message.correlation_id = frame.remove_header("correlation-id");
    message.message_id = frame.remove_header("message-id");
    if let Some(persistent) = frame.remove_header("persistent") {
        message.persistent = persistent.eq_ignore_ascii_case("true");
    }
    if let Some(mode) = frame.remove_header("NMSXDeliveryMode") {
        message.persistent = mode.eq_ignore_ascii_case("true");
    }
    if let Some(priority) = frame.remove_header("priority") {
        message.priority = parse_numeric("priority", &priority)?;
    }
    if let Some(timestamp) = frame.remove_header("timestamp") {
        message.timestamp = parse_numeric("timestamp", &timestamp)?;
    }
    if let Some(expires) = frame.remove_header("expires") {
        message.expiration = parse_numeric("expires", &expires)?;
    }
    let redelivered = frame.remove_header("redelivered").is_some();

    message.headers = std::mem::take(&mut frame.headers);

    Ok(MessageDispatch {
        consumer_id,
        destination: message.destination.clone(),
        message,
        redelivery_counter: if redelivered { 1 } else { 0 },
    })
}
