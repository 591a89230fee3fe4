//! DAP message writer.
//!
//! [`DapWriter`] is a typed wrapper around a framed async writer for sending
//! responses and events back to the client.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Sink;
use pin_project_lite::pin_project;
use tokio::io::AsyncWrite;
use tokio_util::codec::FramedWrite;

use crate::codec::DapCodec;
use crate::error::CodecError;
use crate::message::OutgoingMessage;

pin_project! {
    /// An async sink for outgoing DAP messages.
    ///
    /// `DapWriter` wraps an [`AsyncWrite`] destination and encodes responses
    /// and events to the wire format. [`DapWriter::send`] handles the full
    /// feed/flush cycle.
    pub struct DapWriter<W> {
        #[pin]
        inner: FramedWrite<W, DapCodec>,
    }
}

impl<W> DapWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Create a new DAP writer from an async write destination.
    pub fn new(writer: W) -> Self {
        Self {
            inner: FramedWrite::new(writer, DapCodec::new()),
        }
    }

    /// Create a new DAP writer with a custom codec.
    pub fn with_codec(writer: W, codec: DapCodec) -> Self {
        Self {
            inner: FramedWrite::new(writer, codec),
        }
    }

    /// Send a message to the client, flushing the underlying stream.
    pub async fn send(&mut self, msg: OutgoingMessage) -> Result<(), CodecError> {
        use futures::SinkExt;
        SinkExt::send(&mut self.inner, msg).await
    }

    /// Consume the writer and return the underlying destination.
    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

impl<W> Sink<OutgoingMessage> for DapWriter<W>
where
    W: AsyncWrite + Unpin,
{
    type Error = CodecError;

    fn poll_ready(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.project().inner.poll_ready(cx)
    }

    fn start_send(self: Pin<&mut Self>, item: OutgoingMessage) -> Result<(), Self::Error> {
        self.project().inner.start_send(item)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.project().inner.poll_flush(cx)
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.project().inner.poll_close(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{OutgoingEvent, OutgoingResponse};
    use std::io::Cursor;

    #[tokio::test]
    async fn write_response() {
        let mut writer = DapWriter::new(Cursor::new(Vec::new()));

        let msg = OutgoingMessage::Response(OutgoingResponse {
            seq: 1,
            request_seq: 1,
            success: true,
            command: "initialize".to_string(),
            message: None,
            body: None,
        });
        writer.send(msg).await.unwrap();

        let output = writer.into_inner().into_inner();
        let output_str = String::from_utf8(output).unwrap();

        assert!(output_str.starts_with("Content-Length: "));
        assert!(output_str.contains("\r\n\r\n"));
        assert!(output_str.contains(r#""command":"initialize""#));
    }

    #[tokio::test]
    async fn write_interleaved_messages() {
        let mut writer = DapWriter::new(Cursor::new(Vec::new()));

        writer
            .send(OutgoingMessage::Response(OutgoingResponse {
                seq: 1,
                request_seq: 1,
                success: true,
                command: "continue".to_string(),
                message: None,
                body: None,
            }))
            .await
            .unwrap();
        writer
            .send(OutgoingMessage::Event(OutgoingEvent {
                seq: 2,
                event: "stopped".to_string(),
                body: Some(serde_json::json!({"reason": "step", "threadId": 1})),
            }))
            .await
            .unwrap();

        let output = writer.into_inner().into_inner();
        let output_str = String::from_utf8(output).unwrap();

        let response_at = output_str.find(r#""type":"response""#).unwrap();
        let event_at = output_str.find(r#""type":"event""#).unwrap();
        assert!(response_at < event_at);
    }
}
