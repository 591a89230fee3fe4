//! In-memory transport for testing.

use tokio::io::{duplex, DuplexStream};

use crate::transport::DapTransport;

/// An in-memory transport for testing DAP communication.
///
/// `MemoryTransport` uses tokio's [`DuplexStream`] to provide a bidirectional
/// in-memory channel that can be split into read and write halves. One side
/// of the pair plays the IDE, the other the adapter:
///
/// ```
/// use transport::testing::MemoryTransport;
/// use transport::split;
///
/// let (client_transport, adapter_transport) = MemoryTransport::pair();
///
/// let (client_reader, client_writer) = split(client_transport);
/// let (adapter_reader, adapter_writer) = split(adapter_transport);
/// // client_writer -> adapter_reader and adapter_writer -> client_reader
/// ```
pub struct MemoryTransport {
    read: DuplexStream,
    write: DuplexStream,
}

impl MemoryTransport {
    /// Create a connected pair of in-memory transports.
    ///
    /// Uses a default buffer size of 64KB for each direction.
    pub fn pair() -> (Self, Self) {
        Self::pair_with_buffer_size(64 * 1024)
    }

    /// Create a connected pair with a custom buffer size.
    ///
    /// Smaller buffers can be useful for testing backpressure behavior.
    pub fn pair_with_buffer_size(buffer_size: usize) -> (Self, Self) {
        let (a_to_b_write, a_to_b_read) = duplex(buffer_size);
        let (b_to_a_write, b_to_a_read) = duplex(buffer_size);

        let transport_a = MemoryTransport {
            read: b_to_a_read,
            write: a_to_b_write,
        };

        let transport_b = MemoryTransport {
            read: a_to_b_read,
            write: b_to_a_write,
        };

        (transport_a, transport_b)
    }
}

impl DapTransport for MemoryTransport {
    type Read = DuplexStream;
    type Write = DuplexStream;

    fn into_split(self) -> (Self::Read, Self::Write) {
        (self.read, self.write)
    }
}
