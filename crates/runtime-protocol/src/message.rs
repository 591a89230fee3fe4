//! JSON-RPC 2.0 message shapes.

use serde::{Deserialize, Serialize};

/// A JSON-RPC request or notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    /// Request id. Never reused within a connection.
    pub id: i64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl RpcRequest {
    pub fn new(id: i64, method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC response, carrying either a result or an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl RpcResponse {
    /// A successful response for `id` carrying `result`.
    pub fn result(id: i64, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }
}

/// The error member of a failed JSON-RPC response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Either side of the JSON-RPC conversation.
///
/// Distinguished structurally: requests have a `method` member, responses do
/// not. The client only ever decodes responses; the test responder decodes
/// requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcMessage {
    Request(RpcRequest),
    Response(RpcResponse),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_and_response_are_distinguished() {
        let req = r#"{"jsonrpc":"2.0","id":1,"method":"parse","params":{"sourceFile":"a"}}"#;
        let msg: RpcMessage = serde_json::from_str(req).unwrap();
        assert!(matches!(msg, RpcMessage::Request(r) if r.method == "parse"));

        let resp = r#"{"jsonrpc":"2.0","id":1,"result":{}}"#;
        let msg: RpcMessage = serde_json::from_str(resp).unwrap();
        assert!(matches!(msg, RpcMessage::Response(r) if r.id == 1));
    }

    #[test]
    fn error_response_deserializes() {
        let resp = r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32601,"message":"no such method"}}"#;
        let msg: RpcMessage = serde_json::from_str(resp).unwrap();
        let RpcMessage::Response(response) = msg else {
            panic!("expected response");
        };
        assert_eq!(response.error.unwrap().code, -32601);
    }
}
