//! DAP message reader.
//!
//! [`DapReader`] is a typed wrapper around a framed async reader that
//! produces a stream of incoming DAP messages.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use pin_project_lite::pin_project;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;

use crate::codec::DapCodec;
use crate::error::CodecError;
use crate::message::Message;

pin_project! {
    /// An async stream of incoming DAP messages.
    ///
    /// `DapReader` wraps an [`AsyncRead`] source and decodes DAP messages
    /// from the byte stream. It implements [`Stream`], allowing it to be
    /// used with async iteration patterns:
    ///
    /// ```ignore
    /// use futures::StreamExt;
    ///
    /// while let Some(result) = reader.next().await {
    ///     match result? {
    ///         Message::Request(r) => { /* dispatch */ }
    ///         _ => {}
    ///     }
    /// }
    /// ```
    pub struct DapReader<R> {
        #[pin]
        inner: FramedRead<R, DapCodec>,
    }
}

impl<R> DapReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Create a new DAP reader from an async read source.
    pub fn new(reader: R) -> Self {
        Self {
            inner: FramedRead::new(reader, DapCodec::new()),
        }
    }

    /// Create a new DAP reader with a custom codec.
    pub fn with_codec(reader: R, codec: DapCodec) -> Self {
        Self {
            inner: FramedRead::new(reader, codec),
        }
    }

    /// Consume the reader and return the underlying source.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R> Stream for DapReader<R>
where
    R: AsyncRead + Unpin,
{
    type Item = Result<Message, CodecError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::io::Cursor;

    fn make_frame(json: &str) -> Vec<u8> {
        format!("Content-Length: {}\r\n\r\n{}", json.len(), json).into_bytes()
    }

    #[tokio::test]
    async fn read_single_request() {
        let json = r#"{"seq":1,"type":"request","command":"threads"}"#;
        let mut reader = DapReader::new(Cursor::new(make_frame(json)));

        let msg = reader.next().await.unwrap().unwrap();
        assert!(matches!(msg, Message::Request(r) if r.command == "threads"));
    }

    #[tokio::test]
    async fn read_multiple_requests() {
        let json1 = r#"{"seq":1,"type":"request","command":"initialize"}"#;
        let json2 = r#"{"seq":2,"type":"request","command":"configurationDone"}"#;

        let mut data = make_frame(json1);
        data.extend(make_frame(json2));

        let mut reader = DapReader::new(Cursor::new(data));

        let msg1 = reader.next().await.unwrap().unwrap();
        assert!(matches!(msg1, Message::Request(r) if r.seq == 1));

        let msg2 = reader.next().await.unwrap().unwrap();
        assert!(matches!(msg2, Message::Request(r) if r.seq == 2));
    }

    #[tokio::test]
    async fn read_eof() {
        let mut reader = DapReader::new(Cursor::new(Vec::new()));
        assert!(reader.next().await.is_none());
    }
}
