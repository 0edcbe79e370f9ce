//! Blocking connection pool for LedisDB connections.
//!
//! Idle connections sit in a LIFO deque behind a `parking_lot::Mutex` held
//! only for push/pop. There is no cap on checked-out connections: `acquire`
//! creates a fresh (lazily connecting) connection whenever the idle queue is
//! empty.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex as SyncMutex;
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::connection::tcp::TcpConnection;
use crate::connection::ConnectionPool;
use crate::error::Result;

/// A TCP connection pool.
pub struct TcpPool {
    /// Idle connections ready for reuse.
    idle: SyncMutex<VecDeque<TcpConnection>>,
    config: ConnectionConfig,
    /// How long a connection can be idle before being dropped.
    idle_timeout: Duration,
}

impl TcpPool {
    /// Create a new pool from config. No connection is opened yet.
    pub fn new(config: ConnectionConfig) -> Self {
        let idle_timeout = Duration::from_millis(config.idle_timeout_ms);
        Self {
            idle: SyncMutex::new(VecDeque::with_capacity(config.max_idle)),
            config,
            idle_timeout,
        }
    }

    /// Return the number of currently idle connections.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }

    /// Return the configured idle cap.
    pub fn max_idle(&self) -> usize {
        self.config.max_idle
    }

    /// The configuration new connections are built from.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Drop every idle connection.
    pub fn clear(&self) {
        self.idle.lock().clear();
    }

    /// Take a healthy connection from the idle queue (LIFO for cache warmth).
    fn take_healthy_connection(&self, idle: &mut VecDeque<TcpConnection>) -> Option<TcpConnection> {
        while let Some(conn) = idle.pop_back() {
            if !conn.is_connected() || conn.last_used.elapsed() > self.idle_timeout {
                continue; // Drop stale connection
            }
            return Some(conn);
        }
        None
    }
}

impl ConnectionPool for TcpPool {
    type Conn = TcpConnection;

    fn acquire(&self, _command: &str) -> Result<TcpConnection> {
        let reused = {
            let mut idle = self.idle.lock();
            self.take_healthy_connection(&mut idle)
        };
        Ok(match reused {
            Some(conn) => conn,
            None => {
                debug!(addr = %self.config.primary_addr(), "pool: new connection");
                TcpConnection::new(&self.config)
            }
        })
    }

    fn release(&self, conn: TcpConnection) {
        if !conn.is_connected() || conn.last_used.elapsed() > self.idle_timeout {
            return; // Drop stale connection
        }
        let mut idle = self.idle.lock();
        if idle.len() < self.config.max_idle {
            idle.push_back(conn);
        } else {
            debug!(max_idle = self.config.max_idle, "pool: full, dropping connection");
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
