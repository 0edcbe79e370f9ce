//! The pooled LedisDB client.
//!
//! Every call checks a connection out of the pool, runs the command through
//! [`dispatch`](crate::executor::dispatch) and returns the connection,
//! whether the call succeeded or not.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::callbacks::{CallbackTable, Decoder, Options};
use crate::config::{ConnectionConfig, RetryPolicy};
use crate::connection::{ConnectionPool, TcpPool};
use crate::error::Result;
use crate::executor::{dispatch, Executor};
use crate::transaction::Transaction;
use crate::types::Value;

/// A synchronous LedisDB client backed by a connection pool.
///
/// Cheap to clone: clones share the pool and the callback table. A clone
/// that overrides a callback gets its own copy of the table.
pub struct Ledis<P: ConnectionPool = TcpPool> {
    pool: Arc<P>,
    callbacks: Arc<CallbackTable>,
    retry: RetryPolicy,
}

impl Ledis<TcpPool> {
    /// Create a client for `config`. No connection is opened until the
    /// first command.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_pool(TcpPool::new(config)))
    }

    /// Client for `host:port` on database 0.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        Self::new(ConnectionConfig::new(host, port))
    }
}

impl<P: ConnectionPool> Ledis<P> {
    /// Client over a caller-provided pool, with the default table and
    /// retry policy.
    pub fn with_pool(pool: P) -> Self {
        Self {
            pool: Arc::new(pool),
            callbacks: Arc::new(CallbackTable::default()),
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the callback table.
    pub fn with_callbacks(mut self, callbacks: CallbackTable) -> Self {
        self.callbacks = Arc::new(callbacks);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the decoder for one command on this client.
    ///
    /// Other clients sharing the table (clones made earlier) keep theirs.
    pub fn set_response_callback(&mut self, command: &str, decoder: impl Into<Decoder>) {
        Arc::make_mut(&mut self.callbacks).register(command, decoder);
    }

    pub fn callbacks(&self) -> &CallbackTable {
        &self.callbacks
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// A new, idle transaction session sharing this client's pool and table.
    pub fn tx(&self) -> Transaction<P> {
        Transaction::new(
            Arc::clone(&self.pool),
            Arc::clone(&self.callbacks),
            self.retry.clone(),
        )
    }
}

impl<P: ConnectionPool> Executor for Ledis<P> {
    fn execute_command(&self, command: &str, args: Vec<Bytes>, options: &Options) -> Result<Value> {
        let mut conn = self.pool.acquire(command)?;
        let result = dispatch(&mut conn, command, &args, options, &self.callbacks, &self.retry);
        self.pool.release(conn);
        result
    }
}

impl<P: ConnectionPool> Clone for Ledis<P> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
            callbacks: Arc::clone(&self.callbacks),
            retry: self.retry.clone(),
        }
    }
}

impl<P: ConnectionPool> fmt::Debug for Ledis<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledis")
            .field("callbacks", &self.callbacks.len())
            .field("retry", &self.retry)
            .finish()
    }
}

// ── Tests ──────────────────────────────────────────────────────────
