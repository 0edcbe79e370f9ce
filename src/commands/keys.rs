//! KV command builders (GET, SET, DEL, INCRBY, EXPIRE, XSCAN, etc.).

use std::time::{Duration, SystemTime};

use bytes::Bytes;

use crate::commands::scan::{scan_generic, ScanIter};
use crate::commands::{
    arg, exec, expire_at, expire_in, key_bool, key_int, multi_key_int, require_nonempty,
};
use crate::error::Result;
use crate::executor::Executor;
use crate::types::{ScanKind, ScanPage, ToArg};

pub trait KeyCommands: Executor {
    /// GET key: value at `key`, or `None`.
    fn get(&self, key: impl ToArg) -> Result<Option<Bytes>> {
        exec(self, "GET", vec![arg(key)])?.into_opt_bytes()
    }

    /// SET key value
    fn set(&self, key: impl ToArg, value: impl ToArg) -> Result<bool> {
        exec(self, "SET", vec![arg(key), arg(value)])?.into_bool()
    }

    /// SETNX key value: set only if `key` does not exist.
    fn setnx(&self, key: impl ToArg, value: impl ToArg) -> Result<bool> {
        exec(self, "SETNX", vec![arg(key), arg(value)])?.into_bool()
    }

    /// GETSET key value: set and return the old value.
    fn getset(&self, key: impl ToArg, value: impl ToArg) -> Result<Option<Bytes>> {
        exec(self, "GETSET", vec![arg(key), arg(value)])?.into_opt_bytes()
    }

    /// DEL key [key ...]: number of keys removed.
    fn delete<K: ToArg>(&self, keys: &[K]) -> Result<i64> {
        multi_key_int(self, "DEL", keys)
    }

    fn exists(&self, key: impl ToArg) -> Result<bool> {
        key_bool(self, "EXISTS", key)
    }

    /// Increment by one (sent as `INCRBY key 1`).
    fn incr(&self, key: impl ToArg) -> Result<i64> {
        self.incrby(key, 1)
    }

    /// INCRBY key amount: the new value.
    fn incrby(&self, key: impl ToArg, amount: i64) -> Result<i64> {
        exec(self, "INCRBY", vec![arg(key), arg(amount)])?.into_int()
    }

    /// Decrement by one (sent as `DECRBY key 1`).
    fn decr(&self, key: impl ToArg) -> Result<i64> {
        self.decrby(key, 1)
    }

    fn decrby(&self, key: impl ToArg, amount: i64) -> Result<i64> {
        exec(self, "DECRBY", vec![arg(key), arg(amount)])?.into_int()
    }

    /// MGET key [key ...]: values in key order, `None` for missing keys.
    fn mget<K: ToArg>(&self, keys: &[K]) -> Result<Vec<Option<Bytes>>> {
        require_nonempty("MGET", keys.len())?;
        let args = keys.iter().map(ToArg::to_arg).collect();
        exec(self, "MGET", args)?.into_opt_bytes_list()
    }

    /// MSET key value [key value ...]
    fn mset<K: ToArg, V: ToArg>(&self, pairs: &[(K, V)]) -> Result<bool> {
        require_nonempty("MSET", pairs.len())?;
        let mut args = Vec::with_capacity(pairs.len() * 2);
        for (key, value) in pairs {
            args.push(key.to_arg());
            args.push(value.to_arg());
        }
        exec(self, "MSET", args)?.into_bool()
    }

    /// EXPIRE key seconds: `false` if the key does not exist.
    fn expire(&self, key: impl ToArg, ttl: Duration) -> Result<bool> {
        expire_in(self, "EXPIRE", key, ttl)
    }

    /// EXPIREAT key timestamp
    fn expireat(&self, key: impl ToArg, when: SystemTime) -> Result<bool> {
        expire_at(self, "EXPIREAT", key, when)
    }

    /// TTL key: seconds left, `-1` without expiry.
    fn ttl(&self, key: impl ToArg) -> Result<i64> {
        key_int(self, "TTL", key)
    }

    /// PERSIST key: drop the expiry.
    fn persist(&self, key: impl ToArg) -> Result<bool> {
        key_bool(self, "PERSIST", key)
    }

    /// XSCAN cursor [MATCH pattern] COUNT count
    fn xscan(&self, cursor: impl ToArg, pattern: Option<&str>, count: usize) -> Result<ScanPage> {
        scan_generic(self, ScanKind::Kv, cursor, pattern, count)
    }

    /// Iterate every key of `kind`, `count` per round trip.
    fn scan_iter(&self, kind: ScanKind, pattern: Option<&str>, count: usize) -> ScanIter<'_, Self> {
        ScanIter::new(self, kind, pattern, count)
    }
}

impl<T: Executor + ?Sized> KeyCommands for T {}

// ── Tests ──────────────────────────────────────────────────────────
