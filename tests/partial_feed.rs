//! Incremental decoding: frames arriving in arbitrary chunks must come out
//! whole, and a stream ending mid-frame must be reported.

use bytes::BytesMut;
use rhodium_stomp::{Command, MessageBody, StompWireFormat, WireError};
use tokio_util::codec::Decoder;

#[test]
fn frame_fed_byte_by_byte() {
    let raw: &[u8] = b"MESSAGE\ndestination:/queue/Q\nmessage-id:m1\n\nhello\0";
    let mut codec = StompWireFormat::new();
    let mut buf = BytesMut::new();

    for &byte in &raw[..raw.len() - 1] {
        buf.extend_from_slice(&[byte]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    buf.extend_from_slice(&raw[raw.len() - 1..]);
    match codec.decode(&mut buf).unwrap() {
        Some(Command::MessageDispatch(dispatch)) => {
            assert_eq!(dispatch.message.content, MessageBody::Text("hello".into()));
        }
        other => panic!("expected MessageDispatch, got {:?}", other),
    }
    assert!(buf.is_empty());
}

#[test]
fn content_length_body_waits_for_terminator() {
    let mut codec = StompWireFormat::new();
    let mut buf = BytesMut::from(&b"MESSAGE\ndestination:/queue/Q\ncontent-length:3\n\nAB"[..]);
    assert!(codec.decode(&mut buf).unwrap().is_none());

    buf.extend_from_slice(b"C");
    // Body bytes are all present but the NUL is still missing.
    assert!(codec.decode(&mut buf).unwrap().is_none());

    buf.extend_from_slice(b"\0");
    match codec.decode(&mut buf).unwrap() {
        Some(Command::MessageDispatch(dispatch)) => {
            assert_eq!(
                dispatch.message.content,
                MessageBody::Bytes(b"ABC".to_vec())
            );
        }
        other => panic!("expected MessageDispatch, got {:?}", other),
    }
}

#[test]
fn two_frames_in_one_chunk_come_out_in_order() {
    let mut codec = StompWireFormat::new();
    let mut buf = BytesMut::from(
        &b"RECEIPT\nreceipt-id:1\n\n\0RECEIPT\nreceipt-id:2\n\n\0"[..],
    );

    let ids: Vec<i32> = std::iter::from_fn(|| match codec.decode(&mut buf).unwrap() {
        Some(Command::Response(response)) => Some(response.correlation_id),
        _ => None,
    })
    .collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn keepalives_interleaved_with_frames() {
    let mut codec = StompWireFormat::new();
    let mut buf = BytesMut::from(&b"\n\nRECEIPT\nreceipt-id:5\n\n\0\n"[..]);

    assert!(matches!(
        codec.decode(&mut buf).unwrap(),
        Some(Command::KeepAlive(_))
    ));
    assert!(matches!(
        codec.decode(&mut buf).unwrap(),
        Some(Command::KeepAlive(_))
    ));
    assert!(matches!(
        codec.decode(&mut buf).unwrap(),
        Some(Command::Response(_))
    ));
    assert!(matches!(
        codec.decode(&mut buf).unwrap(),
        Some(Command::KeepAlive(_))
    ));
    assert!(codec.decode(&mut buf).unwrap().is_none());
}

#[test]
fn eof_mid_frame_is_malformed() {
    let mut codec = StompWireFormat::new();
    let mut buf = BytesMut::from(&b"MESSAGE\ndestination:/queue/Q\n\nno terminator"[..]);
    assert!(codec.decode(&mut buf).unwrap().is_none());

    let err = codec.decode_eof(&mut buf).unwrap_err();
    assert!(matches!(err, WireError::MalformedFrame(_)));
}

#[test]
fn eof_on_empty_buffer_is_clean() {
    let mut codec = StompWireFormat::new();
    let mut buf = BytesMut::new();
    assert!(codec.decode_eof(&mut buf).unwrap().is_none());
}
