//! Raw DAP message types.
//!
//! These are the wire shapes below the typed request/response layer. Incoming
//! messages keep their `arguments`/`body` as raw JSON so the session can route
//! extension commands and validate argument shapes before deserializing.

use serde::{Deserialize, Serialize};

/// Sequence number used for message ordering and request/response
/// correlation.
pub type Seq = i64;

/// An incoming DAP message from the client.
///
/// A client ordinarily sends only requests; responses and events are accepted
/// so that the decoder also serves mock clients in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    /// A request from the IDE.
    Request(Request),
    /// A response to a reverse request (unused by this adapter).
    Response(IncomingResponse),
    /// An event (only ever seen by mock clients in tests).
    Event(IncomingEvent),
}

/// A request message from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Sequence number assigned by the client.
    pub seq: Seq,
    /// The command to execute.
    pub command: String,
    /// Command arguments (command-specific, absent for argument-less
    /// commands).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,
}

/// A response message as decoded from the wire (used by test clients).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingResponse {
    pub seq: Seq,
    #[serde(rename = "request_seq")]
    pub request_seq: Seq,
    pub success: bool,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// An event message as decoded from the wire (used by test clients).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingEvent {
    pub seq: Seq,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// A response message sent by the adapter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingResponse {
    /// Sequence number of this response.
    pub seq: Seq,
    /// Sequence number of the request this response answers.
    #[serde(rename = "request_seq")]
    pub request_seq: Seq,
    /// Whether the request succeeded.
    pub success: bool,
    /// The command that was requested.
    pub command: String,
    /// Short error description when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response body (command-specific).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// An event message sent by the adapter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingEvent {
    /// Sequence number of this event.
    pub seq: Seq,
    /// The event name.
    pub event: String,
    /// Event body (event-specific).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// An outgoing message to send over the transport.
///
/// The `Request` variant exists for mock clients in tests; the adapter
/// itself only ever sends responses and events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutgoingMessage {
    /// A response to a client request.
    Response(OutgoingResponse),
    /// An asynchronous event notification.
    Event(OutgoingEvent),
    /// A request (from a mock client in tests).
    Request(Request),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_request() {
        let json = r#"{
            "seq": 1,
            "type": "request",
            "command": "initialize",
            "arguments": {"adapterID": "test"}
        }"#;

        let msg: Message = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, Message::Request(r) if r.command == "initialize"));
    }

    #[test]
    fn deserialize_request_without_arguments() {
        let json = r#"{"seq": 4, "type": "request", "command": "threads"}"#;

        let msg: Message = serde_json::from_str(json).unwrap();
        let Message::Request(request) = msg else {
            panic!("expected request");
        };
        assert!(request.arguments.is_none());
    }

    #[test]
    fn serialize_response() {
        let msg = OutgoingMessage::Response(OutgoingResponse {
            seq: 2,
            request_seq: 1,
            success: true,
            command: "initialize".to_string(),
            message: None,
            body: Some(serde_json::json!({"supportsConfigurationDoneRequest": true})),
        });

        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"response""#));
        assert!(json.contains(r#""request_seq":1"#));
        assert!(!json.contains(r#""message""#));
    }

    #[test]
    fn serialize_event() {
        let msg = OutgoingMessage::Event(OutgoingEvent {
            seq: 3,
            event: "stopped".to_string(),
            body: Some(serde_json::json!({"reason": "breakpoint", "threadId": 1})),
        });

        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"event""#));
        assert!(json.contains(r#""event":"stopped""#));
    }
}
