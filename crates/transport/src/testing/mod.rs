//! Test support for the transport layer.

mod memory;

pub use memory::MemoryTransport;
