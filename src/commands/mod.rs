//! Command builder traits.
//!
//! Each sub-module provides one trait per command family (keys, lists,
//! hashes, sets, sorted sets, bitmaps, scripting, server). The traits are
//! blanket-implemented for every [`Executor`], so the same builders work on
//! the pooled client and on an active transaction. Bring them into scope
//! with `use ledis::prelude::*`.

pub mod bits;
pub mod hashes;
pub mod keys;
pub mod lists;
pub mod scan;
pub mod scripting;
pub mod server;
pub mod sets;
pub mod sorted_sets;

pub use bits::BitCommands;
pub use hashes::HashCommands;
pub use keys::KeyCommands;
pub use lists::ListCommands;
pub use scan::ScanIter;
pub use scripting::ScriptCommands;
pub use server::ServerCommands;
pub use sets::SetCommands;
pub use sorted_sets::SortedSetCommands;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use crate::callbacks::Options;
use crate::error::{LedisError, Result};
use crate::executor::Executor;
use crate::types::{ToArg, Value};

/// Execute `command` with default options.
#[inline]
pub(crate) fn exec<E: Executor + ?Sized>(e: &E, command: &str, args: Vec<Bytes>) -> Result<Value> {
    e.execute_command(command, args, &Options::new())
}

/// Helper to create a Bytes arg from anything that implements ToArg.
#[inline]
pub(crate) fn arg<T: ToArg>(val: T) -> Bytes {
    val.to_arg()
}

/// `head` followed by every element of `rest`.
pub(crate) fn args_with<T: ToArg>(head: Vec<Bytes>, rest: &[T]) -> Vec<Bytes> {
    let mut args = head;
    args.reserve(rest.len());
    args.extend(rest.iter().map(ToArg::to_arg));
    args
}

/// Reject an empty multi-value argument before any I/O.
pub(crate) fn require_nonempty(command: &str, len: usize) -> Result<()> {
    if len == 0 {
        return Err(LedisError::Data(format!(
            "{command} requires at least one argument"
        )));
    }
    Ok(())
}

/// Whole seconds in `ttl`.
pub(crate) fn seconds(ttl: Duration) -> u64 {
    ttl.as_secs()
}

/// Unix timestamp in seconds; times before the epoch are rejected.
pub(crate) fn unix_seconds(when: SystemTime) -> Result<u64> {
    when.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| LedisError::Data("expire time is before the Unix epoch".into()))
}

// Shared shapes for the per-type `*EXPIRE`, `*TTL`, `*PERSIST` and `*CLEAR`
// commands that every LedisDB data type exposes.

pub(crate) fn expire_in<E: Executor + ?Sized>(
    e: &E,
    command: &str,
    key: impl ToArg,
    ttl: Duration,
) -> Result<bool> {
    exec(e, command, vec![arg(key), arg(seconds(ttl))])?.into_bool()
}

pub(crate) fn expire_at<E: Executor + ?Sized>(
    e: &E,
    command: &str,
    key: impl ToArg,
    when: SystemTime,
) -> Result<bool> {
    let ts = unix_seconds(when)?;
    exec(e, command, vec![arg(key), arg(ts)])?.into_bool()
}

pub(crate) fn key_int<E: Executor + ?Sized>(e: &E, command: &str, key: impl ToArg) -> Result<i64> {
    exec(e, command, vec![arg(key)])?.into_int()
}

pub(crate) fn key_bool<E: Executor + ?Sized>(e: &E, command: &str, key: impl ToArg) -> Result<bool> {
    exec(e, command, vec![arg(key)])?.into_bool()
}

pub(crate) fn multi_key_int<E: Executor + ?Sized, K: ToArg>(
    e: &E,
    command: &str,
    keys: &[K],
) -> Result<i64> {
    require_nonempty(command, keys.len())?;
    exec(e, command, args_with(Vec::new(), keys))?.into_int()
}

// ── Tests ──────────────────────────────────────────────────────────
