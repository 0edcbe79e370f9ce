//! Server command builders (PING, ECHO, INFO, SELECT, FLUSHDB, FLUSHALL).

use std::collections::HashMap;

use bytes::Bytes;

use crate::commands::{arg, exec};
use crate::config::MAX_DATABASES;
use crate::error::{LedisError, Result};
use crate::executor::Executor;
use crate::types::{ToArg, Value};

pub trait ServerCommands: Executor {
    fn echo(&self, message: impl ToArg) -> Result<Bytes> {
        exec(self, "ECHO", vec![arg(message)])?.into_bytes()
    }

    /// PING: true on `PONG`.
    fn ping(&self) -> Result<bool> {
        exec(self, "PING", Vec::new())?.into_bool()
    }

    /// INFO [section]: parsed `key → value` map.
    fn info(&self, section: Option<&str>) -> Result<HashMap<String, Value>> {
        let args = section.map(arg).into_iter().collect();
        exec(self, "INFO", args)?.into_info()
    }

    /// SELECT db
    ///
    /// Switches only the connection that runs it. On the pooled client that
    /// is whichever connection the pool hands out; inside a transaction it
    /// is the pinned one.
    fn select(&self, db: u8) -> Result<bool> {
        if db >= MAX_DATABASES {
            return Err(LedisError::Data(format!(
                "invalid db index {db}, must be below {MAX_DATABASES}"
            )));
        }
        exec(self, "SELECT", vec![arg(u32::from(db))])?.into_bool()
    }

    fn flushdb(&self) -> Result<bool> {
        exec(self, "FLUSHDB", Vec::new())?.into_bool()
    }

    fn flushall(&self) -> Result<bool> {
        exec(self, "FLUSHALL", Vec::new())?.into_bool()
    }
}

impl<T: Executor + ?Sized> ServerCommands for T {}

// ── Tests ──────────────────────────────────────────────────────────
