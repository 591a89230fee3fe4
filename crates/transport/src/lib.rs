//! Adapter-side DAP transport layer using tokio.
//!
//! This crate provides the transport layer for the debug adapter protocol as
//! seen from the adapter: the IDE connects to us, sends requests, and receives
//! responses and events.
//!
//! # Architecture
//!
//! The crate is designed around the tokio-util codec pattern:
//!
//! - [`DapCodec`] implements both `Encoder` and `Decoder` for DAP messages
//! - [`DapReader`] wraps an `AsyncRead` to produce a `Stream` of incoming
//!   [`Message`]s
//! - [`DapWriter`] wraps an `AsyncWrite` to provide a `Sink` for outgoing
//!   responses and events
//!
//! Above the framing layer, [`requests`], [`responses`], [`events`] and
//! [`types`] define the typed payloads of the supported command set. The
//! framing layer itself stays untyped (`serde_json::Value` bodies) so that
//! unknown and extension commands can be routed before being parsed.

mod codec;
mod error;
mod message;
mod reader;
pub mod testing;
mod transport;
mod writer;

pub mod events;
pub mod requests;
pub mod responses;
pub mod types;

pub use codec::DapCodec;
pub use error::CodecError;
pub use message::{
    IncomingEvent, IncomingResponse, Message, OutgoingEvent, OutgoingMessage, OutgoingResponse,
    Request, Seq,
};
pub use reader::DapReader;
pub use transport::{split, DapTransport};
pub use writer::DapWriter;

/// Error code for requests the adapter does not implement, unknown commands
/// and malformed arguments.
pub const ERROR_NOT_IMPLEMENTED: i64 = 100;
/// Error code for requests that need a launched debug runtime.
pub const ERROR_NOT_INITIALIZED: i64 = 200;
/// Error code for a second `launch` on the same session.
pub const ERROR_ALREADY_INITIALIZED: i64 = 201;
