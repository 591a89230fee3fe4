//! Integration tests for the in-memory transport.
//!
//! These exercise a full client/adapter conversation over the duplex pair,
//! without real TCP sockets: a mock client sends requests, a mock adapter
//! answers them and pushes events.

use futures::StreamExt;

use transport::testing::MemoryTransport;
use transport::{split, Message, OutgoingEvent, OutgoingMessage, OutgoingResponse, Request};

#[tokio::test]
async fn request_response_event_conversation() {
    let (client_transport, adapter_transport) = MemoryTransport::pair();
    let (mut client_reader, mut client_writer) = split(client_transport);
    let (mut adapter_reader, mut adapter_writer) = split(adapter_transport);

    // Mock adapter: answer every request, push an event after the first.
    let adapter = tokio::spawn(async move {
        let mut next_seq = 1;
        let mut first = true;
        while let Some(message) = adapter_reader.next().await {
            let Ok(Message::Request(request)) = message else {
                panic!("adapter expected a request");
            };
            let done = request.command == "disconnect";

            adapter_writer
                .send(OutgoingMessage::Response(OutgoingResponse {
                    seq: next_seq,
                    request_seq: request.seq,
                    success: true,
                    command: request.command,
                    message: None,
                    body: None,
                }))
                .await
                .unwrap();
            next_seq += 1;

            if first {
                first = false;
                adapter_writer
                    .send(OutgoingMessage::Event(OutgoingEvent {
                        seq: next_seq,
                        event: "initialized".to_string(),
                        body: None,
                    }))
                    .await
                    .unwrap();
                next_seq += 1;
            }

            if done {
                break;
            }
        }
    });

    // Client: initialize, observe the event, disconnect.
    client_writer
        .send(OutgoingMessage::Request(Request {
            seq: 1,
            command: "initialize".to_string(),
            arguments: Some(serde_json::json!({"adapterID": "mock"})),
        }))
        .await
        .unwrap();

    let Some(Ok(Message::Response(response))) = client_reader.next().await else {
        panic!("expected the initialize response first");
    };
    assert_eq!(response.request_seq, 1);
    assert!(response.success);

    let Some(Ok(Message::Event(event))) = client_reader.next().await else {
        panic!("expected the initialized event");
    };
    assert_eq!(event.event, "initialized");

    client_writer
        .send(OutgoingMessage::Request(Request {
            seq: 2,
            command: "disconnect".to_string(),
            arguments: None,
        }))
        .await
        .unwrap();

    let Some(Ok(Message::Response(response))) = client_reader.next().await else {
        panic!("expected the disconnect response");
    };
    assert_eq!(response.request_seq, 2);

    adapter.await.unwrap();

    // the adapter is gone, the stream ends
    drop(client_writer);
    assert!(client_reader.next().await.is_none());
}

#[tokio::test]
async fn many_requests_in_order() {
    let (client_transport, adapter_transport) = MemoryTransport::pair();
    let (mut client_reader, mut client_writer) = split(client_transport);
    let (mut adapter_reader, mut adapter_writer) = split(adapter_transport);

    let adapter = tokio::spawn(async move {
        for expected_seq in 1..=20 {
            let Some(Ok(Message::Request(request))) = adapter_reader.next().await else {
                panic!("adapter expected request {expected_seq}");
            };
            assert_eq!(request.seq, expected_seq);
            adapter_writer
                .send(OutgoingMessage::Response(OutgoingResponse {
                    seq: expected_seq,
                    request_seq: request.seq,
                    success: true,
                    command: request.command,
                    message: None,
                    body: None,
                }))
                .await
                .unwrap();
        }
    });

    for seq in 1..=20 {
        client_writer
            .send(OutgoingMessage::Request(Request {
                seq,
                command: "threads".to_string(),
                arguments: None,
            }))
            .await
            .unwrap();
    }

    for seq in 1..=20 {
        let Some(Ok(Message::Response(response))) = client_reader.next().await else {
            panic!("expected response {seq}");
        };
        assert_eq!(response.request_seq, seq);
    }

    adapter.await.unwrap();
}
