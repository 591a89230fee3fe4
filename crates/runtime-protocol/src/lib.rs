//! Client for the language-runtime protocol.
//!
//! The debug adapter owns no language semantics; everything it knows about
//! the debuggee it learns from a language runtime process over a JSON-RPC
//! connection. This crate provides:
//!
//! - the Content-Length framed JSON-RPC codec and [`RpcClient`],
//! - the model types exchanged with the runtime ([`types`]),
//! - the [`LanguageRuntime`] trait (one method per wire operation) and
//!   [`RuntimeProxy`], its implementation over an [`RpcClient`].
//!
//! The trait is the seam the execution engine is generic over: production
//! code drives a [`RuntimeProxy`] over TCP, tests drive a scripted mock.

mod client;
mod codec;
mod error;
mod message;
mod proxy;
pub mod testing;
pub mod types;

pub use client::RpcClient;
pub use codec::RpcCodec;
pub use error::RpcError;
pub use message::{ErrorObject, RpcMessage, RpcRequest, RpcResponse};
pub use proxy::{LanguageRuntime, RuntimeProxy};
