//! Transaction session pinned to one pooled connection.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::callbacks::{CallbackTable, Options};
use crate::config::RetryPolicy;
use crate::connection::{Connection, ConnectionPool};
use crate::error::{LedisError, Result};
use crate::executor::{dispatch, Executor};
use crate::resp::types::RawReply;
use crate::types::Value;

/// The pinned connection plus whether it has been reset since `BEGIN`.
struct Pinned<C> {
    conn: C,
    reset: bool,
}

impl<C: Connection> Connection for Pinned<C> {
    fn send(&mut self, command: &str, args: &[Bytes]) -> Result<()> {
        self.conn.send(command, args)
    }

    fn read_reply(&mut self) -> Result<RawReply> {
        self.conn.read_reply()
    }

    fn disconnect(&mut self) {
        self.reset = true;
        self.conn.disconnect();
    }
}

/// A `BEGIN` … `COMMIT`/`ROLLBACK` session.
///
/// While active the session owns one connection taken from the pool; every
/// command issued through it runs on that connection and nothing else can
/// use it. Commands issued before [`begin`](Self::begin) fail with
/// [`LedisError::TxNotBegin`].
///
/// The one-retry rule applies inside the session too. A retry reconnects,
/// and the server does not carry the open transaction over to the new
/// socket. Once the pinned connection has been reset the session is
/// aborted: the command that triggered the reset returns its own result,
/// every later command as well as `commit`/`rollback` fails with
/// [`LedisError::TxAborted`], and [`is_active`](Self::is_active) reports
/// false. `commit`/`rollback` still hand the connection back to the pool.
pub struct Transaction<P: ConnectionPool> {
    pool: Arc<P>,
    callbacks: Arc<CallbackTable>,
    retry: RetryPolicy,
    conn: Mutex<Option<Pinned<P::Conn>>>,
}

impl<P: ConnectionPool> Transaction<P> {
    pub(crate) fn new(pool: Arc<P>, callbacks: Arc<CallbackTable>, retry: RetryPolicy) -> Self {
        Self {
            pool,
            callbacks,
            retry,
            conn: Mutex::new(None),
        }
    }

    /// Pin a connection and send `BEGIN`.
    ///
    /// On failure the connection goes back to the pool and the session
    /// stays idle. An aborted session gives its connection back first.
    pub fn begin(&self) -> Result<Value> {
        let mut slot = self.conn.lock();
        match slot.take() {
            Some(pinned) if !pinned.reset => {
                *slot = Some(pinned);
                return Err(LedisError::TxAlreadyActive);
            }
            Some(pinned) => self.pool.release(pinned.conn),
            None => {}
        }
        let mut pinned = Pinned {
            conn: self.pool.acquire("BEGIN")?,
            reset: false,
        };
        match dispatch(&mut pinned, "BEGIN", &[], &Options::new(), &self.callbacks, &self.retry) {
            Ok(value) => {
                // A retried BEGIN opens the transaction on the new socket
                pinned.reset = false;
                *slot = Some(pinned);
                debug!("transaction begun");
                Ok(value)
            }
            Err(e) => {
                self.pool.release(pinned.conn);
                Err(e)
            }
        }
    }

    /// Send `COMMIT` and release the connection.
    pub fn commit(&self) -> Result<Value> {
        self.finish("COMMIT")
    }

    /// Send `ROLLBACK` and release the connection.
    pub fn rollback(&self) -> Result<Value> {
        self.finish("ROLLBACK")
    }

    /// Whether a connection is pinned and the transaction is still open on it.
    pub fn is_active(&self) -> bool {
        self.conn.lock().as_ref().is_some_and(|p| !p.reset)
    }

    fn finish(&self, verb: &str) -> Result<Value> {
        let mut pinned = self.conn.lock().take().ok_or(LedisError::TxNotBegin)?;
        if pinned.reset {
            self.pool.release(pinned.conn);
            debug!(verb, "aborted transaction released");
            return Err(LedisError::TxAborted);
        }
        let result = dispatch(&mut pinned, verb, &[], &Options::new(), &self.callbacks, &self.retry);
        self.pool.release(pinned.conn);
        debug!(verb, ok = result.is_ok(), "transaction finished");
        result
    }
}

impl<P: ConnectionPool> Executor for Transaction<P> {
    fn execute_command(&self, command: &str, args: Vec<Bytes>, options: &Options) -> Result<Value> {
        let mut slot = self.conn.lock();
        let pinned = slot.as_mut().ok_or(LedisError::TxNotBegin)?;
        if pinned.reset {
            return Err(LedisError::TxAborted);
        }
        let result = dispatch(pinned, command, &args, options, &self.callbacks, &self.retry);
        if pinned.reset {
            warn!(command, "connection reset inside transaction, session aborted");
        }
        result
    }
}

impl<P: ConnectionPool> Drop for Transaction<P> {
    fn drop(&mut self) {
        let Some(mut pinned) = self.conn.get_mut().take() else {
            return;
        };
        if pinned.reset {
            self.pool.release(pinned.conn);
            return;
        }
        warn!("transaction dropped while active, rolling back");
        match dispatch(
            &mut pinned,
            "ROLLBACK",
            &[],
            &Options::new(),
            &self.callbacks,
            &RetryPolicy::Never,
        ) {
            Ok(_) => self.pool.release(pinned.conn),
            Err(e) => debug!(error = %e, "rollback on drop failed, discarding connection"),
        }
    }
}

impl<P: ConnectionPool> fmt::Debug for Transaction<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("active", &self.is_active())
            .finish()
    }
}

// ── Tests ──────────────────────────────────────────────────────────
