//! Hash command builders (HSET, HGET, HGETALL, HMSET, HDEL, etc.).

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use bytes::Bytes;

use crate::commands::scan::scan_generic;
use crate::commands::{
    arg, args_with, exec, expire_at, expire_in, key_bool, key_int, multi_key_int, require_nonempty,
};
use crate::error::Result;
use crate::executor::Executor;
use crate::types::{ScanKind, ScanPage, ToArg};

pub trait HashCommands: Executor {
    /// HDEL key field [field ...]: number of fields removed.
    fn hdel<F: ToArg>(&self, key: impl ToArg, fields: &[F]) -> Result<i64> {
        require_nonempty("HDEL", fields.len())?;
        exec(self, "HDEL", args_with(vec![arg(key)], fields))?.into_int()
    }

    fn hexists(&self, key: impl ToArg, field: impl ToArg) -> Result<bool> {
        exec(self, "HEXISTS", vec![arg(key), arg(field)])?.into_bool()
    }

    fn hget(&self, key: impl ToArg, field: impl ToArg) -> Result<Option<Bytes>> {
        exec(self, "HGET", vec![arg(key), arg(field)])?.into_opt_bytes()
    }

    /// HGETALL key: empty map for a missing hash.
    fn hgetall(&self, key: impl ToArg) -> Result<HashMap<Bytes, Bytes>> {
        exec(self, "HGETALL", vec![arg(key)])?.into_map()
    }

    /// HINCRBY key field amount: the new value.
    fn hincrby(&self, key: impl ToArg, field: impl ToArg, amount: i64) -> Result<i64> {
        exec(self, "HINCRBY", vec![arg(key), arg(field), arg(amount)])?.into_int()
    }

    fn hkeys(&self, key: impl ToArg) -> Result<Vec<Bytes>> {
        exec(self, "HKEYS", vec![arg(key)])?.into_bytes_list()
    }

    fn hlen(&self, key: impl ToArg) -> Result<i64> {
        key_int(self, "HLEN", key)
    }

    /// HMGET key field [field ...]: values in field order.
    fn hmget<F: ToArg>(&self, key: impl ToArg, fields: &[F]) -> Result<Vec<Option<Bytes>>> {
        require_nonempty("HMGET", fields.len())?;
        exec(self, "HMGET", args_with(vec![arg(key)], fields))?.into_opt_bytes_list()
    }

    /// HMSET key field value [field value ...]
    fn hmset<F: ToArg, V: ToArg>(&self, key: impl ToArg, pairs: &[(F, V)]) -> Result<bool> {
        require_nonempty("HMSET", pairs.len())?;
        let mut args = Vec::with_capacity(1 + pairs.len() * 2);
        args.push(arg(key));
        for (field, value) in pairs {
            args.push(field.to_arg());
            args.push(value.to_arg());
        }
        exec(self, "HMSET", args)?.into_bool()
    }

    /// HSET key field value: 1 if the field is new, else 0.
    fn hset(&self, key: impl ToArg, field: impl ToArg, value: impl ToArg) -> Result<i64> {
        exec(self, "HSET", vec![arg(key), arg(field), arg(value)])?.into_int()
    }

    fn hvals(&self, key: impl ToArg) -> Result<Vec<Bytes>> {
        exec(self, "HVALS", vec![arg(key)])?.into_bytes_list()
    }

    fn hclear(&self, key: impl ToArg) -> Result<i64> {
        key_int(self, "HCLEAR", key)
    }

    fn hmclear<K: ToArg>(&self, keys: &[K]) -> Result<i64> {
        multi_key_int(self, "HMCLEAR", keys)
    }

    fn hexpire(&self, key: impl ToArg, ttl: Duration) -> Result<bool> {
        expire_in(self, "HEXPIRE", key, ttl)
    }

    fn hexpireat(&self, key: impl ToArg, when: SystemTime) -> Result<bool> {
        expire_at(self, "HEXPIREAT", key, when)
    }

    fn httl(&self, key: impl ToArg) -> Result<i64> {
        key_int(self, "HTTL", key)
    }

    fn hpersist(&self, key: impl ToArg) -> Result<bool> {
        key_bool(self, "HPERSIST", key)
    }

    fn hxscan(&self, cursor: impl ToArg, pattern: Option<&str>, count: usize) -> Result<ScanPage> {
        scan_generic(self, ScanKind::Hash, cursor, pattern, count)
    }
}

impl<T: Executor + ?Sized> HashCommands for T {}

// ── Tests ──────────────────────────────────────────────────────────
