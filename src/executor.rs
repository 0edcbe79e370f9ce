//! Single-call dispatch with one retry on connection faults.

use bytes::Bytes;
use tracing::{trace, warn};

use crate::callbacks::{CallbackTable, Options};
use crate::config::RetryPolicy;
use crate::connection::Connection;
use crate::error::{LedisError, Result};
use crate::resp::types::RawReply;
use crate::types::Value;

/// Anything that can run a command and decode its reply.
///
/// The pooled [`Ledis`](crate::Ledis) client and an active
/// [`Transaction`](crate::Transaction) both implement this; the command
/// traits in [`commands`](crate::commands) are built on top of it.
pub trait Executor {
    fn execute_command(&self, command: &str, args: Vec<Bytes>, options: &Options) -> Result<Value>;
}

fn round_trip<C: Connection + ?Sized>(conn: &mut C, command: &str, args: &[Bytes]) -> Result<RawReply> {
    conn.send(command, args)?;
    conn.read_reply()
}

/// Send `command` on `conn`, read the reply and decode it.
///
/// A connection fault on the first attempt disconnects `conn` and, when
/// `retry` allows it, re-sends once on the same connection (which
/// reconnects on send). A fault on the final attempt leaves `conn`
/// disconnected. Server error replies are never retried.
pub fn dispatch<C: Connection + ?Sized>(
    conn: &mut C,
    command: &str,
    args: &[Bytes],
    options: &Options,
    callbacks: &CallbackTable,
    retry: &RetryPolicy,
) -> Result<Value> {
    trace!(command, args = args.len(), "dispatch");
    let reply = match round_trip(conn, command, args) {
        Ok(reply) => reply,
        Err(e) if e.is_connection_error() => {
            conn.disconnect();
            if !retry.allows(command) {
                warn!(command, error = %e, "connection fault, retry disabled for command");
                return Err(e);
            }
            warn!(command, error = %e, "connection fault, retrying once");
            match round_trip(conn, command, args) {
                Ok(reply) => reply,
                Err(e) => {
                    if e.is_connection_error() || matches!(e, LedisError::Protocol(_)) {
                        conn.disconnect();
                    }
                    return Err(e);
                }
            }
        }
        Err(e) => {
            // Protocol desync: the stream can no longer be trusted.
            if matches!(e, LedisError::Protocol(_)) {
                conn.disconnect();
            }
            return Err(e);
        }
    };
    callbacks.decode(command, reply, options)
}

// ── Tests ──────────────────────────────────────────────────────────
