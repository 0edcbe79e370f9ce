//! Set command builders (SADD, SREM, SMEMBERS, SUNION, SINTER, etc.).

use std::collections::HashSet;
use std::time::{Duration, SystemTime};

use bytes::Bytes;

use crate::commands::scan::scan_generic;
use crate::commands::{
    arg, args_with, exec, expire_at, expire_in, key_bool, key_int, multi_key_int, require_nonempty,
};
use crate::error::Result;
use crate::executor::Executor;
use crate::types::{ScanKind, ScanPage, ToArg};

/// Shared shape of SDIFF / SINTER / SUNION.
fn combine<E: Executor + ?Sized, K: ToArg>(e: &E, command: &str, keys: &[K]) -> Result<HashSet<Bytes>> {
    require_nonempty(command, keys.len())?;
    exec(e, command, args_with(Vec::new(), keys))?.into_set()
}

/// Shared shape of SDIFFSTORE / SINTERSTORE / SUNIONSTORE.
fn combine_store<E: Executor + ?Sized, K: ToArg>(
    e: &E,
    command: &str,
    dest: impl ToArg,
    keys: &[K],
) -> Result<i64> {
    require_nonempty(command, keys.len())?;
    exec(e, command, args_with(vec![arg(dest)], keys))?.into_int()
}

pub trait SetCommands: Executor {
    /// SADD key member [member ...]: number of members added.
    fn sadd<M: ToArg>(&self, key: impl ToArg, members: &[M]) -> Result<i64> {
        require_nonempty("SADD", members.len())?;
        exec(self, "SADD", args_with(vec![arg(key)], members))?.into_int()
    }

    fn scard(&self, key: impl ToArg) -> Result<i64> {
        key_int(self, "SCARD", key)
    }

    /// SDIFF key [key ...]: members of the first set not in the others.
    fn sdiff<K: ToArg>(&self, keys: &[K]) -> Result<HashSet<Bytes>> {
        combine(self, "SDIFF", keys)
    }

    /// SDIFFSTORE dest key [key ...]: size of the stored set.
    fn sdiffstore<K: ToArg>(&self, dest: impl ToArg, keys: &[K]) -> Result<i64> {
        combine_store(self, "SDIFFSTORE", dest, keys)
    }

    fn sinter<K: ToArg>(&self, keys: &[K]) -> Result<HashSet<Bytes>> {
        combine(self, "SINTER", keys)
    }

    fn sinterstore<K: ToArg>(&self, dest: impl ToArg, keys: &[K]) -> Result<i64> {
        combine_store(self, "SINTERSTORE", dest, keys)
    }

    fn sismember(&self, key: impl ToArg, member: impl ToArg) -> Result<bool> {
        exec(self, "SISMEMBER", vec![arg(key), arg(member)])?.into_bool()
    }

    /// SMEMBERS key: never nil; a missing set is empty.
    fn smembers(&self, key: impl ToArg) -> Result<HashSet<Bytes>> {
        exec(self, "SMEMBERS", vec![arg(key)])?.into_set()
    }

    fn srem<M: ToArg>(&self, key: impl ToArg, members: &[M]) -> Result<i64> {
        require_nonempty("SREM", members.len())?;
        exec(self, "SREM", args_with(vec![arg(key)], members))?.into_int()
    }

    fn sunion<K: ToArg>(&self, keys: &[K]) -> Result<HashSet<Bytes>> {
        combine(self, "SUNION", keys)
    }

    fn sunionstore<K: ToArg>(&self, dest: impl ToArg, keys: &[K]) -> Result<i64> {
        combine_store(self, "SUNIONSTORE", dest, keys)
    }

    fn sclear(&self, key: impl ToArg) -> Result<i64> {
        key_int(self, "SCLEAR", key)
    }

    fn smclear<K: ToArg>(&self, keys: &[K]) -> Result<i64> {
        multi_key_int(self, "SMCLEAR", keys)
    }

    fn sexpire(&self, key: impl ToArg, ttl: Duration) -> Result<bool> {
        expire_in(self, "SEXPIRE", key, ttl)
    }

    fn sexpireat(&self, key: impl ToArg, when: SystemTime) -> Result<bool> {
        expire_at(self, "SEXPIREAT", key, when)
    }

    fn sttl(&self, key: impl ToArg) -> Result<i64> {
        key_int(self, "STTL", key)
    }

    fn spersist(&self, key: impl ToArg) -> Result<bool> {
        key_bool(self, "SPERSIST", key)
    }

    fn sxscan(&self, cursor: impl ToArg, pattern: Option<&str>, count: usize) -> Result<ScanPage> {
        scan_generic(self, ScanKind::Set, cursor, pattern, count)
    }
}

impl<T: Executor + ?Sized> SetCommands for T {}

// ── Tests ──────────────────────────────────────────────────────────
