//! Sorted set command builders (ZADD, ZREM, ZRANGE, ZSCORE, ZCARD, etc.).
//!
//! The `*_withscores` variants send `WITHSCORES` and decode the reply into
//! `(member, score)` pairs using the client's score cast.

use std::time::{Duration, SystemTime};

use bytes::Bytes;

use crate::callbacks::Options;
use crate::commands::scan::scan_generic;
use crate::commands::{
    arg, args_with, exec, expire_at, expire_in, key_bool, key_int, multi_key_int, require_nonempty,
};
use crate::error::{LedisError, Result};
use crate::executor::Executor;
use crate::types::{ScanKind, ScanPage, ToArg, Value};

fn range_args(key: impl ToArg, lo: impl ToArg, hi: impl ToArg, limit: Option<(i64, i64)>) -> Vec<Bytes> {
    let mut args = vec![arg(key), arg(lo), arg(hi)];
    if let Some((offset, count)) = limit {
        args.push(Bytes::from_static(b"LIMIT"));
        args.push(arg(offset));
        args.push(arg(count));
    }
    args
}

fn members<E: Executor + ?Sized>(e: &E, command: &str, args: Vec<Bytes>) -> Result<Vec<Bytes>> {
    exec(e, command, args)?.into_bytes_list()
}

fn scored<E: Executor + ?Sized>(e: &E, command: &str, mut args: Vec<Bytes>) -> Result<Vec<(Bytes, Value)>> {
    args.push(Bytes::from_static(b"WITHSCORES"));
    e.execute_command(command, args, &Options::with_scores())?
        .into_scored()
}

pub trait SortedSetCommands: Executor {
    /// ZADD key score member [score member ...]: number of new members.
    fn zadd<S: ToArg, M: ToArg>(&self, key: impl ToArg, members: &[(S, M)]) -> Result<i64> {
        require_nonempty("ZADD", members.len())?;
        let mut args = Vec::with_capacity(1 + members.len() * 2);
        args.push(arg(key));
        for (score, member) in members {
            args.push(score.to_arg());
            args.push(member.to_arg());
        }
        exec(self, "ZADD", args)?.into_int()
    }

    /// ZADD with a flat `score, member, score, member, ...` list.
    fn zadd_flat<A: ToArg>(&self, key: impl ToArg, items: &[A]) -> Result<i64> {
        require_nonempty("ZADD", items.len())?;
        if items.len() % 2 != 0 {
            return Err(LedisError::Data(
                "ZADD requires an equal number of values and scores".into(),
            ));
        }
        exec(self, "ZADD", args_with(vec![arg(key)], items))?.into_int()
    }

    fn zcard(&self, key: impl ToArg) -> Result<i64> {
        key_int(self, "ZCARD", key)
    }

    /// ZCOUNT key min max: `min`/`max` accept `-inf`, `+inf` and `(` bounds.
    fn zcount(&self, key: impl ToArg, min: impl ToArg, max: impl ToArg) -> Result<i64> {
        exec(self, "ZCOUNT", vec![arg(key), arg(min), arg(max)])?.into_int()
    }

    /// ZINCRBY key amount member: the new score.
    fn zincrby(&self, key: impl ToArg, member: impl ToArg, amount: i64) -> Result<Value> {
        exec(self, "ZINCRBY", vec![arg(key), arg(amount), arg(member)])
    }

    /// ZRANGE key start stop
    fn zrange(&self, key: impl ToArg, start: i64, stop: i64) -> Result<Vec<Bytes>> {
        members(self, "ZRANGE", range_args(key, start, stop, None))
    }

    fn zrange_withscores(&self, key: impl ToArg, start: i64, stop: i64) -> Result<Vec<(Bytes, Value)>> {
        scored(self, "ZRANGE", range_args(key, start, stop, None))
    }

    /// ZRANGEBYSCORE key min max [LIMIT offset count]
    fn zrangebyscore(
        &self,
        key: impl ToArg,
        min: impl ToArg,
        max: impl ToArg,
        limit: Option<(i64, i64)>,
    ) -> Result<Vec<Bytes>> {
        members(self, "ZRANGEBYSCORE", range_args(key, min, max, limit))
    }

    fn zrangebyscore_withscores(
        &self,
        key: impl ToArg,
        min: impl ToArg,
        max: impl ToArg,
        limit: Option<(i64, i64)>,
    ) -> Result<Vec<(Bytes, Value)>> {
        scored(self, "ZRANGEBYSCORE", range_args(key, min, max, limit))
    }

    /// ZREVRANGE key start stop: highest score first.
    fn zrevrange(&self, key: impl ToArg, start: i64, stop: i64) -> Result<Vec<Bytes>> {
        members(self, "ZREVRANGE", range_args(key, start, stop, None))
    }

    fn zrevrange_withscores(&self, key: impl ToArg, start: i64, stop: i64) -> Result<Vec<(Bytes, Value)>> {
        scored(self, "ZREVRANGE", range_args(key, start, stop, None))
    }

    /// ZREVRANGEBYSCORE key max min [LIMIT offset count]
    fn zrevrangebyscore(
        &self,
        key: impl ToArg,
        max: impl ToArg,
        min: impl ToArg,
        limit: Option<(i64, i64)>,
    ) -> Result<Vec<Bytes>> {
        members(self, "ZREVRANGEBYSCORE", range_args(key, max, min, limit))
    }

    fn zrevrangebyscore_withscores(
        &self,
        key: impl ToArg,
        max: impl ToArg,
        min: impl ToArg,
        limit: Option<(i64, i64)>,
    ) -> Result<Vec<(Bytes, Value)>> {
        scored(self, "ZREVRANGEBYSCORE", range_args(key, max, min, limit))
    }

    /// ZRANK key member: 0-based rank, `None` if absent.
    fn zrank(&self, key: impl ToArg, member: impl ToArg) -> Result<Option<i64>> {
        exec(self, "ZRANK", vec![arg(key), arg(member)])?.into_opt_int()
    }

    fn zrevrank(&self, key: impl ToArg, member: impl ToArg) -> Result<Option<i64>> {
        exec(self, "ZREVRANK", vec![arg(key), arg(member)])?.into_opt_int()
    }

    /// ZSCORE key member: `Value::Nil` if absent, else the cast score.
    fn zscore(&self, key: impl ToArg, member: impl ToArg) -> Result<Value> {
        exec(self, "ZSCORE", vec![arg(key), arg(member)])
    }

    fn zrem<M: ToArg>(&self, key: impl ToArg, members: &[M]) -> Result<i64> {
        require_nonempty("ZREM", members.len())?;
        exec(self, "ZREM", args_with(vec![arg(key)], members))?.into_int()
    }

    fn zremrangebyrank(&self, key: impl ToArg, start: i64, stop: i64) -> Result<i64> {
        exec(self, "ZREMRANGEBYRANK", vec![arg(key), arg(start), arg(stop)])?.into_int()
    }

    fn zremrangebyscore(&self, key: impl ToArg, min: impl ToArg, max: impl ToArg) -> Result<i64> {
        exec(self, "ZREMRANGEBYSCORE", vec![arg(key), arg(min), arg(max)])?.into_int()
    }

    fn zclear(&self, key: impl ToArg) -> Result<i64> {
        key_int(self, "ZCLEAR", key)
    }

    fn zmclear<K: ToArg>(&self, keys: &[K]) -> Result<i64> {
        multi_key_int(self, "ZMCLEAR", keys)
    }

    fn zexpire(&self, key: impl ToArg, ttl: Duration) -> Result<bool> {
        expire_in(self, "ZEXPIRE", key, ttl)
    }

    fn zexpireat(&self, key: impl ToArg, when: SystemTime) -> Result<bool> {
        expire_at(self, "ZEXPIREAT", key, when)
    }

    fn zttl(&self, key: impl ToArg) -> Result<i64> {
        key_int(self, "ZTTL", key)
    }

    fn zpersist(&self, key: impl ToArg) -> Result<bool> {
        key_bool(self, "ZPERSIST", key)
    }

    fn zxscan(&self, cursor: impl ToArg, pattern: Option<&str>, count: usize) -> Result<ScanPage> {
        scan_generic(self, ScanKind::ZSet, cursor, pattern, count)
    }
}

impl<T: Executor + ?Sized> SortedSetCommands for T {}

// ── Tests ──────────────────────────────────────────────────────────
