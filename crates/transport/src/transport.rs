//! Transport abstraction and split functionality.
//!
//! The [`DapTransport`] trait abstracts over async byte streams so the
//! session layer can run over TCP in production and over in-memory duplex
//! pairs in tests.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::reader::DapReader;
use crate::writer::DapWriter;

/// A transport that can be split into separate read and write halves.
pub trait DapTransport: Send + 'static {
    /// The read half type.
    type Read: AsyncRead + Unpin + Send + 'static;
    /// The write half type.
    type Write: AsyncWrite + Unpin + Send + 'static;

    /// Split the transport into separate read and write halves.
    fn into_split(self) -> (Self::Read, Self::Write);
}

impl DapTransport for TcpStream {
    type Read = OwnedReadHalf;
    type Write = OwnedWriteHalf;

    fn into_split(self) -> (Self::Read, Self::Write) {
        TcpStream::into_split(self)
    }
}

/// Split a transport into a DAP reader and writer pair.
///
/// This is the primary entry point for the session layer: the returned
/// reader and writer can be used independently and concurrently.
pub fn split<T: DapTransport>(transport: T) -> (DapReader<T::Read>, DapWriter<T::Write>) {
    let (read, write) = transport.into_split();
    (DapReader::new(read), DapWriter::new(write))
}
