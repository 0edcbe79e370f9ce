//! Bitmap command builders (BGET, BSETBIT, BGETBIT, BMSETBIT, BCOUNT, BOPT).

use std::time::{Duration, SystemTime};

use bytes::Bytes;

use crate::commands::scan::scan_generic;
use crate::commands::{
    arg, args_with, exec, expire_at, expire_in, key_bool, key_int, require_nonempty,
};
use crate::error::Result;
use crate::executor::Executor;
use crate::types::{BitOp, ScanKind, ScanPage, ToArg};

pub trait BitCommands: Executor {
    /// BGET key: the raw bitmap.
    fn bget(&self, key: impl ToArg) -> Result<Option<Bytes>> {
        exec(self, "BGET", vec![arg(key)])?.into_opt_bytes()
    }

    fn bdelete(&self, key: impl ToArg) -> Result<i64> {
        key_int(self, "BDELETE", key)
    }

    /// BSETBIT key offset 0|1: the previous bit.
    fn bsetbit(&self, key: impl ToArg, offset: i64, value: bool) -> Result<i64> {
        exec(self, "BSETBIT", vec![arg(key), arg(offset), arg(value)])?.into_int()
    }

    fn bgetbit(&self, key: impl ToArg, offset: i64) -> Result<i64> {
        exec(self, "BGETBIT", vec![arg(key), arg(offset)])?.into_int()
    }

    /// BMSETBIT key offset value [offset value ...]
    fn bmsetbit(&self, key: impl ToArg, bits: &[(i64, bool)]) -> Result<i64> {
        require_nonempty("BMSETBIT", bits.len())?;
        let mut args = Vec::with_capacity(1 + bits.len() * 2);
        args.push(arg(key));
        for (offset, value) in bits {
            args.push(arg(offset));
            args.push(arg(value));
        }
        exec(self, "BMSETBIT", args)?.into_int()
    }

    /// BCOUNT key [start end]: number of set bits.
    fn bcount(&self, key: impl ToArg, range: Option<(i64, i64)>) -> Result<i64> {
        let mut args = vec![arg(key)];
        if let Some((start, end)) = range {
            args.push(arg(start));
            args.push(arg(end));
        }
        exec(self, "BCOUNT", args)?.into_int()
    }

    /// BOPT op dest key [key ...]: length of the stored result.
    fn bopt<K: ToArg>(&self, op: BitOp, dest: impl ToArg, keys: &[K]) -> Result<i64> {
        require_nonempty("BOPT", keys.len())?;
        exec(self, "BOPT", args_with(vec![arg(op), arg(dest)], keys))?.into_int()
    }

    fn bexpire(&self, key: impl ToArg, ttl: Duration) -> Result<bool> {
        expire_in(self, "BEXPIRE", key, ttl)
    }

    fn bexpireat(&self, key: impl ToArg, when: SystemTime) -> Result<bool> {
        expire_at(self, "BEXPIREAT", key, when)
    }

    fn bttl(&self, key: impl ToArg) -> Result<i64> {
        key_int(self, "BTTL", key)
    }

    fn bpersist(&self, key: impl ToArg) -> Result<bool> {
        key_bool(self, "BPERSIST", key)
    }

    fn bxscan(&self, cursor: impl ToArg, pattern: Option<&str>, count: usize) -> Result<ScanPage> {
        scan_generic(self, ScanKind::Bit, cursor, pattern, count)
    }
}

impl<T: Executor + ?Sized> BitCommands for T {}

// ── Tests ──────────────────────────────────────────────────────────
