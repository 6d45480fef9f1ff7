//! Frame builders for outbound commands.
//!
//! Each function maps one command variant to its STOMP frame. Header order
//! matters: reserved headers go first, application headers last, so user
//! data can never clobber a reserved name. CONNECT and DISCONNECT are built
//! by the session itself because they touch negotiation state.

use crate::command::{
    ConsumerInfo, Message, MessageAck, ObjectId, RemoveInfo, TransactionInfo, TransactionType,
    DEFAULT_PRIORITY,
};
use crate::error::WireError;
use crate::frame::Frame;

fn bool_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Build the SEND frame for a message.
pub(crate) fn send_frame(message: &Message) -> Result<Frame, WireError> {
    let destination = message
        .destination
        .as_ref()
        .ok_or_else(|| WireError::Protocol("cannot SEND a message without a destination".into()))?;

    let mut frame = Frame::new("SEND");
    if message.response_required {
        frame = frame.header("receipt", message.command_id.to_string());
    }
    frame = frame.header("destination", destination.to_wire());
    if let Some(reply_to) = &message.reply_to {
        frame = frame.header("reply-to", reply_to.to_wire());
    }
    if let Some(correlation_id) = &message.correlation_id {
        frame = frame.header("correlation-id", correlation_id.clone());
    }
    if message.expiration != 0 {
        frame = frame.header("expires", message.expiration.to_string());
    }
    if message.timestamp != 0 {
        frame = frame.header("timestamp", message.timestamp.to_string());
    }
    if message.priority != DEFAULT_PRIORITY {
        frame = frame.header("priority", message.priority.to_string());
    }
    if let Some(msg_type) = &message.msg_type {
        frame = frame.header("type", msg_type.clone());
    }
    if let Some(transaction_id) = &message.transaction_id {
        frame = frame.header("transaction", transaction_id.clone());
    }
    frame = frame.header("persistent", bool_text(message.persistent));
    frame = frame.header("NMSXDeliveryMode", bool_text(message.persistent));
    if let Some(group_id) = &message.group_id {
        let seq = message.group_sequence.to_string();
        frame = frame
            .header("JMSXGroupID", group_id.clone())
            .header("NMSXGroupID", group_id.clone())
            .header("JMSXGroupSeq", seq.clone())
            .header("NMSXGroupSeq", seq);
    }

    let body = message.content.as_bytes().to_vec();
    if message.content.is_binary() && !body.is_empty() {
        frame = frame
            .header("content-length", body.len().to_string())
            .header("transformation", "jms-byte");
    }

    for (key, value) in &message.headers {
        frame = frame.header(key.clone(), value.clone());
    }

    Ok(frame.set_body(body))
}

/// Build the SUBSCRIBE frame for a consumer.
pub(crate) fn subscribe_frame(info: &ConsumerInfo) -> Result<Frame, WireError> {
    let destination = info.destination.as_ref().ok_or_else(|| {
        WireError::Protocol("cannot SUBSCRIBE a consumer without a destination".into())
    })?;

    let mut frame = Frame::new("SUBSCRIBE");
    if info.response_required {
        frame = frame.header("receipt", info.command_id.to_string());
    }
    frame = frame
        .header("destination", destination.to_wire())
        .header("id", info.consumer_id.clone());
    if let Some(name) = &info.subscription_name {
        frame = frame.header("durable-subscriber-name", name.clone());
    }
    if let Some(selector) = &info.selector {
        frame = frame.header("selector", selector.clone());
    }
    frame = frame.header("ack", info.ack_mode.as_str());
    if info.no_local {
        // Capitalized on purpose; the broker dialect grew up with this form.
        frame = frame.header("no-local", "True");
    }
    frame = frame.header(
        "transformation",
        info.transformation.as_deref().unwrap_or("jms-xml"),
    );
    frame = frame.header("activemq.dispatchAsync", bool_text(info.dispatch_async));
    if info.exclusive {
        frame = frame.header("activemq.exclusive", "true");
    }
    if let Some(name) = &info.subscription_name {
        // The misspelled twin is a legacy broker compatibility header.
        frame = frame
            .header("activemq.subscriptionName", name.clone())
            .header("activemq.subcriptionName", name.clone());
    }
    frame = frame
        .header(
            "activemq.maximumPendingMessageLimit",
            info.maximum_pending_message_limit.to_string(),
        )
        .header("activemq.prefetchSize", info.prefetch_size.to_string())
        .header("activemq.priority", info.priority.to_string());
    if info.retroactive {
        frame = frame.header("activemq.retroactive", "true");
    }

    Ok(frame)
}

/// Build the UNSUBSCRIBE frame for a removal, or `None` when the removed
/// object is not a consumer (nothing to say on the wire for those).
pub(crate) fn unsubscribe_frame(info: &RemoveInfo) -> Option<Frame> {
    let ObjectId::Consumer(consumer_id) = &info.object_id else {
        return None;
    };
    let mut frame = Frame::new("UNSUBSCRIBE");
    if info.response_required {
        frame = frame.header("receipt", info.command_id.to_string());
    }
    Some(frame.header("id", consumer_id.clone()))
}

/// Build the ACK frame for a message acknowledgement.
///
/// Receipts for ACKs use the `ignore:` prefix so the inbound path converts
/// the broker's reply into a plain `Response` instead of surfacing it.
pub(crate) fn ack_frame(ack: &MessageAck) -> Frame {
    let mut frame = Frame::new("ACK");
    if ack.response_required {
        frame = frame.header("receipt", format!("ignore:{}", ack.command_id));
    }
    frame = frame
        .header("message-id", ack.last_message_id.clone())
        .header("subscription", ack.consumer_id.clone());
    if let Some(transaction_id) = &ack.transaction_id {
        frame = frame.header("transaction", transaction_id.clone());
    }
    frame
}

/// Build the BEGIN / COMMIT / ABORT frame for a transaction operation.
///
/// Commit and rollback always request a receipt: losing one of those on the
/// wire must not go unnoticed.
pub(crate) fn transaction_frame(info: &TransactionInfo) -> Frame {
    let response_required = info.response_required
        || matches!(
            info.transaction_type,
            TransactionType::Commit | TransactionType::Rollback
        );
    let mut frame = Frame::new(info.transaction_type.verb());
    if response_required {
        frame = frame.header("receipt", info.command_id.to_string());
    }
    frame.header("transaction", info.transaction_id.clone())
}
