//! Blocking client for LedisDB.
//!
//! ```no_run
//! use ledis::prelude::*;
//!
//! # fn main() -> ledis::Result<()> {
//! let client = Ledis::new(ConnectionConfig::default())?;
//! client.set("greeting", "hello")?;
//! assert_eq!(client.get("greeting")?.as_deref(), Some(&b"hello"[..]));
//!
//! let tx = client.tx();
//! tx.begin()?;
//! tx.incrby("counter", 5)?;
//! tx.commit()?;
//! # Ok(())
//! # }
//! ```

pub mod callbacks;
pub mod client;
pub mod commands;
pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod resp;
pub mod runtime;
pub mod transaction;
pub mod types;

pub use callbacks::{CallbackTable, Decoder, Options, Rule, ScoreCast};
pub use client::Ledis;
pub use config::{ConnectionConfig, RetryPolicy};
pub use connection::{Connection, ConnectionPool, TcpConnection, TcpPool};
pub use error::{LedisError, ResponseErrorKind, Result};
pub use executor::Executor;
pub use resp::RawReply;
pub use transaction::Transaction;
pub use types::{BitOp, ScanKind, ScanPage, ToArg, Value};

/// Client types plus every command trait.
pub mod prelude {
    pub use crate::commands::{
        BitCommands, HashCommands, KeyCommands, ListCommands, ScriptCommands, ServerCommands,
        SetCommands, SortedSetCommands,
    };
    pub use crate::{
        BitOp, ConnectionConfig, Executor, Ledis, LedisError, Options, RetryPolicy, ScanKind,
        ScanPage, ToArg, Transaction, Value,
    };
}
