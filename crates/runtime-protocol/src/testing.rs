//! Test support for the runtime connection.

use futures::{SinkExt, StreamExt};
use tokio::io::DuplexStream;
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;

use crate::codec::RpcCodec;
use crate::message::{RpcMessage, RpcResponse};

/// A scripted JSON-RPC responder over an in-memory stream.
///
/// Answers requests in order with the scripted `(method, result)` pairs,
/// asserting that the incoming method names match the script. Useful for
/// exercising the client and proxy without a real runtime process.
pub struct ScriptedRuntimeServer {
    handle: JoinHandle<()>,
}

impl ScriptedRuntimeServer {
    /// Start the responder; returns the client end of the stream and the
    /// running server.
    pub fn start(
        script: Vec<(&'static str, serde_json::Value)>,
    ) -> (DuplexStream, ScriptedRuntimeServer) {
        let (client_end, server_end) = tokio::io::duplex(64 * 1024);

        let handle = tokio::spawn(async move {
            let mut framed = Framed::new(server_end, RpcCodec::new());
            for (expected_method, result) in script {
                let Some(Ok(RpcMessage::Request(request))) = framed.next().await else {
                    panic!("scripted server: expected a request for {expected_method}");
                };
                assert_eq!(
                    request.method, expected_method,
                    "scripted server: method order mismatch"
                );
                framed
                    .send(RpcMessage::Response(RpcResponse::result(request.id, result)))
                    .await
                    .expect("scripted server: sending response");
            }
        });

        (client_end, ScriptedRuntimeServer { handle })
    }

    /// Wait for the script to run to completion.
    pub async fn finish(self) {
        self.handle.await.expect("scripted server task panicked");
    }
}
