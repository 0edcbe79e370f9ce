//! Connection and pool abstractions consumed by the executor.
//!
//! The dispatch core only ever talks to these two traits. [`TcpConnection`]
//! and [`TcpPool`] are the shipped implementations; tests substitute
//! in-memory ones.

pub mod pool;
pub mod tcp;

pub use pool::TcpPool;
pub use tcp::TcpConnection;

use bytes::Bytes;

use crate::error::Result;
use crate::resp::types::RawReply;

/// A single request/response channel to the server.
///
/// At most one command is in flight per connection. After
/// [`disconnect`](Connection::disconnect) the next
/// [`send`](Connection::send) re-establishes the session.
pub trait Connection: Send {
    /// Send one command and its positional arguments.
    fn send(&mut self, command: &str, args: &[Bytes]) -> Result<()>;

    /// Read the reply to the last command sent.
    fn read_reply(&mut self) -> Result<RawReply>;

    /// Drop the underlying transport; the next `send` reconnects.
    fn disconnect(&mut self);
}

/// Hands out connections and takes them back.
pub trait ConnectionPool: Send + Sync {
    type Conn: Connection;

    /// Check out a connection for `command`. Implementations may route on
    /// the name; the executor treats it as opaque.
    fn acquire(&self, command: &str) -> Result<Self::Conn>;

    /// Return a connection previously obtained from [`acquire`](Self::acquire).
    fn release(&self, conn: Self::Conn);
}
