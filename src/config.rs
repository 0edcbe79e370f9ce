//! Connection configuration and retry policy.
//!
//! A client is built from a [`ConnectionConfig`] value or from a custom
//! pool; there is no URL form.

use std::collections::HashSet;

use crate::error::{LedisError, Result};

/// Default LedisDB port.
pub const DEFAULT_PORT: u16 = 6380;

/// Number of databases a LedisDB server exposes (`SELECT 0..=15`).
pub const MAX_DATABASES: u8 = 16;

/// Full connection configuration for the TCP pool.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database index (0-15), selected on every (re)connect.
    pub db: u8,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Read/response timeout in milliseconds (0 = no timeout).
    pub read_timeout_ms: u64,
    /// Idle timeout in milliseconds (connections idle longer are dropped).
    pub idle_timeout_ms: u64,
    /// Maximum number of idle connections kept by the pool.
    pub max_idle: usize,
    /// Maximum read buffer size per connection in bytes.
    pub max_buffer_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            db: 0,
            connect_timeout_ms: 5000,
            read_timeout_ms: 30_000,
            idle_timeout_ms: 300_000, // 5 minutes
            max_idle: 8,
            max_buffer_size: crate::connection::tcp::DEFAULT_MAX_BUF_SIZE,
        }
    }
}

impl ConnectionConfig {
    /// Config for `host:port` with every other field defaulted.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Return the primary address as "host:port".
    pub fn primary_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Reject settings the server or pool cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(LedisError::Data("host must not be empty".into()));
        }
        if self.db >= MAX_DATABASES {
            return Err(LedisError::Data(format!(
                "invalid db index {}, must be below {MAX_DATABASES}",
                self.db
            )));
        }
        if self.max_idle == 0 {
            return Err(LedisError::Data("max_idle must be > 0".into()));
        }
        Ok(())
    }
}

/// Whether a command may be re-sent after a connection fault.
///
/// The retry re-sends the exact command on a freshly reconnected socket. If
/// the first attempt reached the server before the fault was observed, a
/// non-idempotent command (`INCRBY`, `LPUSH`, …) is applied twice: the
/// guarantee is at most one retry, not exactly-once execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Retry every command once.
    #[default]
    Once,
    /// Never retry; the first connection fault propagates.
    Never,
    /// Retry once, except for the listed command names (case-insensitive).
    OnceExcept(HashSet<String>),
}

impl RetryPolicy {
    /// Retry once for everything but `commands`.
    pub fn once_except<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::OnceExcept(
            commands
                .into_iter()
                .map(|c| c.as_ref().to_ascii_uppercase())
                .collect(),
        )
    }

    /// Whether `command` may be retried after a connection fault.
    pub fn allows(&self, command: &str) -> bool {
        match self {
            Self::Once => true,
            Self::Never => false,
            Self::OnceExcept(excluded) => !excluded.contains(&command.to_ascii_uppercase()),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
