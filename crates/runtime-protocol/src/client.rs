//! Sequential JSON-RPC client.

use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::codec::RpcCodec;
use crate::error::RpcError;
use crate::message::{RpcMessage, RpcRequest};

/// A JSON-RPC client with strictly sequential request/response flow.
///
/// The debug session issues runtime requests in program order and consumes
/// the responses in that same order, so the client keeps exactly one request
/// in flight: [`RpcClient::call`] sends and then reads until the matching
/// response arrives. A response with an unexpected id is a protocol
/// violation and poisons the connection.
pub struct RpcClient<T> {
    framed: Framed<T, RpcCodec>,
    next_id: i64,
}

impl RpcClient<TcpStream> {
    /// Connect to a language runtime listening on `addr`.
    pub async fn connect(addr: impl tokio::net::ToSocketAddrs) -> Result<Self, RpcError> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }
}

impl<T> RpcClient<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Create a client over an existing stream.
    pub fn new(stream: T) -> Self {
        Self {
            framed: Framed::new(stream, RpcCodec::new()),
            next_id: 0,
        }
    }

    /// Send `method` with `params` and wait for its result.
    pub async fn call(
        &mut self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError> {
        let id = self.next_id;
        self.next_id += 1;

        tracing::debug!(method, id, "sending runtime request");
        self.framed
            .send(RpcMessage::Request(RpcRequest::new(id, method, Some(params))))
            .await?;

        loop {
            let Some(message) = self.framed.next().await else {
                return Err(RpcError::ConnectionClosed);
            };

            match message? {
                RpcMessage::Response(response) => {
                    if response.id != id {
                        return Err(RpcError::OutOfOrderResponse {
                            expected: id,
                            actual: response.id,
                        });
                    }
                    if let Some(error) = response.error {
                        return Err(RpcError::Runtime {
                            code: error.code,
                            message: error.message,
                        });
                    }
                    tracing::trace!(method, id, "received runtime response");
                    return Ok(response.result.unwrap_or(serde_json::Value::Null));
                }
                RpcMessage::Request(request) => {
                    // The runtime never calls back into the adapter.
                    tracing::warn!(method = %request.method, "ignoring request from runtime");
                }
            }
        }
    }

    /// [`RpcClient::call`] with typed parameters and result.
    ///
    /// A result that fails to parse surfaces as [`RpcError::Deserialize`],
    /// which callers with a safe fallback may tolerate.
    pub async fn call_typed<P, R>(&mut self, method: &str, params: &P) -> Result<R, RpcError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let params = serde_json::to_value(params).map_err(RpcError::Serialize)?;
        let result = self.call(method, params).await?;
        serde_json::from_value(result).map_err(RpcError::Deserialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::RpcResponse;

    #[tokio::test]
    async fn call_matches_response_by_id() {
        let (ours, theirs) = tokio::io::duplex(4096);
        let mut client = RpcClient::new(ours);

        let responder = tokio::spawn(async move {
            let mut framed = Framed::new(theirs, RpcCodec::new());
            let Some(Ok(RpcMessage::Request(request))) = framed.next().await else {
                panic!("expected request");
            };
            assert_eq!(request.method, "parse");
            framed
                .send(RpcMessage::Response(RpcResponse::result(
                    request.id,
                    serde_json::json!({"ok": true}),
                )))
                .await
                .unwrap();
        });

        let result = client
            .call("parse", serde_json::json!({"sourceFile": "p"}))
            .await
            .unwrap();
        assert_eq!(result["ok"], true);

        responder.await.unwrap();
    }

    #[tokio::test]
    async fn error_object_becomes_runtime_error() {
        let (ours, theirs) = tokio::io::duplex(4096);
        let mut client = RpcClient::new(ours);

        tokio::spawn(async move {
            let mut framed = Framed::new(theirs, RpcCodec::new());
            let Some(Ok(RpcMessage::Request(request))) = framed.next().await else {
                panic!("expected request");
            };
            framed
                .send(RpcMessage::Response(RpcResponse {
                    jsonrpc: "2.0".to_string(),
                    id: request.id,
                    result: None,
                    error: Some(crate::message::ErrorObject {
                        code: -32601,
                        message: "unknown method".to_string(),
                        data: None,
                    }),
                }))
                .await
                .unwrap();
        });

        let err = client.call("bogus", serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, RpcError::Runtime { code: -32601, .. }));
    }

    #[tokio::test]
    async fn closed_connection_is_reported() {
        let (ours, theirs) = tokio::io::duplex(4096);
        let mut client = RpcClient::new(ours);
        drop(theirs);

        let err = client.call("parse", serde_json::json!({})).await.unwrap_err();
        assert!(matches!(
            err,
            RpcError::ConnectionClosed | RpcError::Io(_)
        ));
    }
}
