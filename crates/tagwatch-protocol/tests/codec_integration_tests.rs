//! Integration tests for UhfCodec with Tokio streams.
//!
//! A duplex stream stands in for the serial link: the host side writes
//! requests through the codec, the reader side answers with raw bytes,
//! sometimes split across writes.

mod common;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio_util::codec::Framed;
use tagwatch_core::{DeviceStatus, Error, Timestamp};
use tagwatch_protocol::{CodecError, InventoryRequest, ResponseFrame, UhfCodec, validate_and_parse};

fn host_and_reader(buffer_size: usize) -> (Framed<DuplexStream, UhfCodec>, DuplexStream) {
    let (host, reader) = tokio::io::duplex(buffer_size);
    (Framed::new(host, UhfCodec::new()), reader)
}

#[tokio::test]
async fn test_request_reaches_reader() {
    let (mut host, mut reader) = host_and_reader(64);

    host.send(InventoryRequest::default()).await.unwrap();

    let mut received = [0u8; 7];
    reader.read_exact(&mut received).await.unwrap();
    assert_eq!(received, [0x06, 0x00, 0x01, 0x03, 0x03, 0x3F, 0x49]);
}

#[tokio::test]
async fn test_response_roundtrip() {
    let (mut host, mut reader) = host_and_reader(256);
    let frame = common::inventory(&[&[0xE2, 0x00, 0x34, 0x12, 0x01, 0x6E]]);

    reader.write_all(&frame).await.unwrap();

    let received = host.next().await.unwrap().unwrap();
    assert_eq!(&received[..], &frame[..]);

    let batch = validate_and_parse(&received, Timestamp::from_millis(10)).unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].id.to_hex(), "E2003412016E");
}

#[tokio::test]
async fn test_frame_split_across_writes() {
    let (mut host, mut reader) = host_and_reader(256);
    let frame = common::inventory(&[&[0xAA, 0xBB], &[0xCC]]);

    let reader_task = tokio::spawn(async move {
        for chunk in frame.chunks(3) {
            reader.write_all(chunk).await.unwrap();
            tokio::task::yield_now().await;
        }
        reader
    });

    let received = host.next().await.unwrap().unwrap();
    let _reader = reader_task.await.unwrap();

    let parsed = ResponseFrame::parse(&received).unwrap();
    assert_eq!(parsed.status(), DeviceStatus::Success);
    assert_eq!(parsed.inventory(Timestamp::default()).unwrap().len(), 2);
}

#[tokio::test]
async fn test_back_to_back_frames() {
    let (mut host, mut reader) = host_and_reader(256);
    let mut burst = common::no_tag();
    burst.extend_from_slice(&common::inventory(&[&[0x01]]));

    reader.write_all(&burst).await.unwrap();

    let first = host.next().await.unwrap().unwrap();
    let err = validate_and_parse(&first, Timestamp::default()).unwrap_err();
    assert_eq!(err, Error::Device(DeviceStatus::NoTagInRange));

    let second = host.next().await.unwrap().unwrap();
    assert_eq!(validate_and_parse(&second, Timestamp::default()).unwrap().len(), 1);
}

#[tokio::test]
async fn test_corrupted_frame_is_framed_then_rejected() {
    let (mut host, mut reader) = host_and_reader(256);
    let mut frame = common::inventory(&[&[0x10, 0x20, 0x30]]);
    frame[6] ^= 0xFF;

    reader.write_all(&frame).await.unwrap();

    let received = host.next().await.unwrap().unwrap();
    assert!(matches!(
        ResponseFrame::parse(&received),
        Err(Error::CrcMismatch { .. })
    ));
}

#[tokio::test]
async fn test_bogus_length_byte_surfaces_as_error() {
    let (mut host, mut reader) = host_and_reader(64);

    reader.write_all(&[0x02, 0x00, 0x01]).await.unwrap();

    let result = host.next().await.unwrap();
    assert!(matches!(
        result,
        Err(CodecError::Protocol(Error::MalformedFrame { .. }))
    ));
}

#[tokio::test]
async fn test_stream_ends_cleanly() {
    let (mut host, reader) = host_and_reader(64);
    drop(reader);

    assert!(host.next().await.is_none());
}
