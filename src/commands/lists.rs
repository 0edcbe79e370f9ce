//! List command builders (LPUSH, RPUSH, LPOP, RPOP, LRANGE, LLEN, etc.).

use std::time::{Duration, SystemTime};

use bytes::Bytes;

use crate::commands::scan::scan_generic;
use crate::commands::{
    arg, args_with, exec, expire_at, expire_in, key_bool, key_int, multi_key_int, require_nonempty,
};
use crate::error::Result;
use crate::executor::Executor;
use crate::types::{ScanKind, ScanPage, ToArg, Value};

pub trait ListCommands: Executor {
    /// LINDEX key index: negative indexes count from the tail.
    fn lindex(&self, key: impl ToArg, index: i64) -> Result<Option<Bytes>> {
        exec(self, "LINDEX", vec![arg(key), arg(index)])?.into_opt_bytes()
    }

    fn llen(&self, key: impl ToArg) -> Result<i64> {
        key_int(self, "LLEN", key)
    }

    fn lpop(&self, key: impl ToArg) -> Result<Option<Bytes>> {
        exec(self, "LPOP", vec![arg(key)])?.into_opt_bytes()
    }

    fn rpop(&self, key: impl ToArg) -> Result<Option<Bytes>> {
        exec(self, "RPOP", vec![arg(key)])?.into_opt_bytes()
    }

    /// LPUSH key value [value ...]
    ///
    /// Returns the new length as `Value::Int`, or `Value::Bool` when the
    /// server answers with a status.
    fn lpush<V: ToArg>(&self, key: impl ToArg, values: &[V]) -> Result<Value> {
        require_nonempty("LPUSH", values.len())?;
        exec(self, "LPUSH", args_with(vec![arg(key)], values))
    }

    /// RPUSH key value [value ...], see [`lpush`](Self::lpush).
    fn rpush<V: ToArg>(&self, key: impl ToArg, values: &[V]) -> Result<Value> {
        require_nonempty("RPUSH", values.len())?;
        exec(self, "RPUSH", args_with(vec![arg(key)], values))
    }

    /// LRANGE key start stop: both ends inclusive.
    fn lrange(&self, key: impl ToArg, start: i64, stop: i64) -> Result<Vec<Bytes>> {
        exec(self, "LRANGE", vec![arg(key), arg(start), arg(stop)])?.into_bytes_list()
    }

    /// LCLEAR key: number of elements removed.
    fn lclear(&self, key: impl ToArg) -> Result<i64> {
        key_int(self, "LCLEAR", key)
    }

    fn lmclear<K: ToArg>(&self, keys: &[K]) -> Result<i64> {
        multi_key_int(self, "LMCLEAR", keys)
    }

    fn lexpire(&self, key: impl ToArg, ttl: Duration) -> Result<bool> {
        expire_in(self, "LEXPIRE", key, ttl)
    }

    fn lexpireat(&self, key: impl ToArg, when: SystemTime) -> Result<bool> {
        expire_at(self, "LEXPIREAT", key, when)
    }

    fn lttl(&self, key: impl ToArg) -> Result<i64> {
        key_int(self, "LTTL", key)
    }

    fn lpersist(&self, key: impl ToArg) -> Result<bool> {
        key_bool(self, "LPERSIST", key)
    }

    fn lxscan(&self, cursor: impl ToArg, pattern: Option<&str>, count: usize) -> Result<ScanPage> {
        scan_generic(self, ScanKind::List, cursor, pattern, count)
    }
}

impl<T: Executor + ?Sized> ListCommands for T {}

// ── Tests ──────────────────────────────────────────────────────────
