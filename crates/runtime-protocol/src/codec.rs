//! Framing for the JSON-RPC connection.
//!
//! The runtime connection uses the same Content-Length header framing as the
//! IDE side, carrying JSON-RPC payloads instead of DAP messages.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::RpcError;
use crate::message::RpcMessage;

/// Default maximum payload size (16 MB). Runtime state trees can be large.
const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Codec for Content-Length framed JSON-RPC messages.
#[derive(Debug, Clone)]
pub struct RpcCodec {
    max_message_size: usize,
}

impl RpcCodec {
    pub fn new() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl Default for RpcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for RpcCodec {
    type Item = RpcMessage;
    type Error = RpcError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(header_end) = src.windows(4).position(|w| w == b"\r\n\r\n") else {
            return Ok(None);
        };

        let content_length = content_length(&src[..header_end])?;
        if content_length > self.max_message_size {
            return Err(RpcError::MessageTooLarge {
                size: content_length,
                max: self.max_message_size,
            });
        }

        let total_length = header_end + 4 + content_length;
        if src.len() < total_length {
            src.reserve(total_length - src.len());
            return Ok(None);
        }

        let body_start = header_end + 4;
        let message: RpcMessage = serde_json::from_slice(&src[body_start..total_length])
            .map_err(RpcError::Deserialize)?;

        src.advance(total_length);

        Ok(Some(message))
    }
}

impl Encoder<RpcMessage> for RpcCodec {
    type Error = RpcError;

    fn encode(&mut self, item: RpcMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_vec(&item).map_err(RpcError::Serialize)?;

        dst.reserve(32 + json.len());
        dst.put_slice(b"Content-Length: ");
        dst.put_slice(json.len().to_string().as_bytes());
        dst.put_slice(b"\r\n\r\n");
        dst.put_slice(&json);

        Ok(())
    }
}

fn content_length(header: &[u8]) -> Result<usize, RpcError> {
    let header_str = std::str::from_utf8(header).map_err(|_| RpcError::MalformedHeader)?;

    for line in header_str.split("\r\n") {
        if let Some(value) = line.strip_prefix("Content-Length:") {
            return value.trim().parse().map_err(|_| RpcError::MalformedHeader);
        }
    }

    Err(RpcError::MalformedHeader)
}
