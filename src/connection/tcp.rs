//! Blocking TCP connection to a LedisDB server.
//!
//! Wraps a `tokio::net::TcpStream` with an integrated read buffer and RESP
//! parser. Socket I/O runs on the crate runtime; the [`Connection`] impl
//! blocks the calling thread until each send or read completes.

use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::connection::Connection;
use crate::error::{LedisError, Result};
use crate::resp::parser::parse;
use crate::resp::types::RawReply;
use crate::resp::writer::encode_command;
use crate::runtime;

/// Default initial read buffer capacity (64 KB).
const DEFAULT_BUF_CAPACITY: usize = 64 * 1024;

/// Default maximum read buffer size (512 MB).
pub const DEFAULT_MAX_BUF_SIZE: usize = 512 * 1024 * 1024;

fn not_connected() -> LedisError {
    LedisError::Connection(std::io::Error::new(
        std::io::ErrorKind::NotConnected,
        "connection is not open",
    ))
}

/// A single connection to a LedisDB server.
///
/// The socket is opened lazily by the first [`send`](Connection::send) and
/// re-opened by the first `send` after [`disconnect`](Connection::disconnect).
/// Every (re)connect re-selects the configured database.
pub struct TcpConnection {
    addr: String,
    db: u8,
    connect_timeout: Duration,
    read_timeout: Option<Duration>,
    max_buf_size: usize,
    stream: Option<TcpStream>,
    /// Read buffer (data read from socket but not yet consumed by parser).
    buf: BytesMut,
    /// Timestamp of last successful I/O (for idle checks).
    pub last_used: Instant,
}

impl TcpConnection {
    /// Create an unconnected connection for `config`.
    pub fn new(config: &ConnectionConfig) -> Self {
        let read_timeout = match config.read_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };
        Self {
            addr: config.primary_addr(),
            db: config.db,
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            read_timeout,
            max_buf_size: config.max_buffer_size,
            stream: None,
            buf: BytesMut::new(),
            last_used: Instant::now(),
        }
    }

    /// Create and connect eagerly.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let mut conn = Self::new(config);
        runtime::run(conn.open())?;
        Ok(conn)
    }

    /// Whether a socket is currently open.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Server address as "host:port".
    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn open(&mut self) -> Result<()> {
        let stream = match tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.addr))
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(LedisError::Timeout(format!(
                    "connection to {} timed out after {:?}",
                    self.addr, self.connect_timeout
                )))
            }
        };
        stream.set_nodelay(true).ok(); // Disable Nagle for low latency
        self.stream = Some(stream);
        self.buf.clear();
        if self.buf.capacity() < DEFAULT_BUF_CAPACITY {
            self.buf.reserve(DEFAULT_BUF_CAPACITY);
        }
        debug!(addr = %self.addr, db = self.db, "connected");

        if let Err(e) = self.select_db().await {
            self.stream = None;
            return Err(e);
        }
        Ok(())
    }

    async fn select_db(&mut self) -> Result<()> {
        if self.db == 0 {
            return Ok(()); // Default, no need to send
        }
        let cmd = encode_command("SELECT", &[Bytes::from(self.db.to_string())]);
        self.write_frame(&cmd).await?;
        match self.read_frame().await? {
            RawReply::Status(ref s) if s == "OK" => Ok(()),
            RawReply::Error(msg) => Err(LedisError::response(msg)),
            other => Err(LedisError::Protocol(format!(
                "unexpected SELECT reply: {}",
                other.type_name()
            ))),
        }
    }

    async fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        if self.stream.is_none() {
            self.open().await?;
        }
        self.write_frame(frame).await
    }

    async fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        stream.write_all(frame).await?;
        self.last_used = Instant::now();
        Ok(())
    }

    async fn read_frame(&mut self) -> Result<RawReply> {
        match self.read_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.read_frame_untimed()).await {
                Ok(result) => result,
                Err(_) => Err(LedisError::Timeout(format!(
                    "no reply from {} within {limit:?}",
                    self.addr
                ))),
            },
            None => self.read_frame_untimed().await,
        }
    }

    /// Read and parse one complete reply from the server.
    async fn read_frame_untimed(&mut self) -> Result<RawReply> {
        loop {
            if !self.buf.is_empty() {
                // Parse from a frozen view so bulk strings slice without copying;
                // unconsumed bytes go back into the buffer.
                let snapshot = self.buf.split().freeze();
                match parse(&snapshot) {
                    Ok((value, consumed)) => {
                        if consumed < snapshot.len() {
                            self.buf.extend_from_slice(&snapshot[consumed..]);
                        }
                        self.last_used = Instant::now();
                        return Ok(value);
                    }
                    Err(LedisError::Incomplete) => {
                        self.buf.extend_from_slice(&snapshot);
                    }
                    Err(e) => {
                        self.buf.extend_from_slice(&snapshot);
                        return Err(e);
                    }
                }
            }

            if self.buf.capacity() - self.buf.len() < 4096 {
                let new_cap = (self.buf.capacity() * 2).max(DEFAULT_BUF_CAPACITY);
                if new_cap > self.max_buf_size {
                    if self.buf.capacity() >= self.max_buf_size {
                        return Err(LedisError::Protocol(format!(
                            "reply too large: buffer would exceed {} bytes",
                            self.max_buf_size
                        )));
                    }
                    self.buf.reserve(self.max_buf_size - self.buf.capacity());
                } else {
                    self.buf.reserve(new_cap - self.buf.capacity());
                }
            }

            let n = match self.stream.as_mut() {
                Some(stream) => stream.read_buf(&mut self.buf).await?,
                None => return Err(not_connected()),
            };
            if n == 0 {
                return Err(LedisError::Connection(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed by server",
                )));
            }
        }
    }
}

impl Connection for TcpConnection {
    fn send(&mut self, command: &str, args: &[Bytes]) -> Result<()> {
        let frame = encode_command(command, args);
        runtime::run(self.send_frame(&frame))
    }

    fn read_reply(&mut self) -> Result<RawReply> {
        if self.stream.is_none() {
            return Err(not_connected());
        }
        runtime::run(self.read_frame())
    }

    fn disconnect(&mut self) {
        if self.stream.take().is_some() {
            debug!(addr = %self.addr, "disconnected");
        }
        self.buf.clear();
    }
}

// ── Tests ──────────────────────────────────────────────────────────
