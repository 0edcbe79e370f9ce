//! Lua scripting builders (EVAL, EVALSHA, SCRIPT LOAD/EXISTS/FLUSH).

use bytes::Bytes;

use crate::commands::{arg, args_with, exec, require_nonempty};
use crate::error::Result;
use crate::executor::Executor;
use crate::types::{ToArg, Value};

/// `head numkeys key... arg...`
fn script_args<K: ToArg, A: ToArg>(head: Bytes, keys: &[K], args: &[A]) -> Vec<Bytes> {
    let out = vec![head, arg(keys.len())];
    args_with(args_with(out, keys), args)
}

pub trait ScriptCommands: Executor {
    /// EVAL script numkeys key [key ...] arg [arg ...]
    fn eval<K: ToArg, A: ToArg>(&self, script: impl ToArg, keys: &[K], args: &[A]) -> Result<Value> {
        exec(self, "EVAL", script_args(arg(script), keys, args))
    }

    /// EVALSHA sha1 numkeys key [key ...] arg [arg ...]
    fn evalsha<K: ToArg, A: ToArg>(&self, sha1: impl ToArg, keys: &[K], args: &[A]) -> Result<Value> {
        exec(self, "EVALSHA", script_args(arg(sha1), keys, args))
    }

    /// SCRIPT LOAD script: the script's SHA1.
    fn script_load(&self, script: impl ToArg) -> Result<String> {
        exec(self, "SCRIPT", vec![Bytes::from_static(b"LOAD"), arg(script)])?.into_string()
    }

    /// SCRIPT EXISTS sha1 [sha1 ...]: one flag per digest.
    fn script_exists<S: ToArg>(&self, sha1s: &[S]) -> Result<Vec<bool>> {
        require_nonempty("SCRIPT EXISTS", sha1s.len())?;
        exec(self, "SCRIPT", args_with(vec![Bytes::from_static(b"EXISTS")], sha1s))?
            .into_list()?
            .into_iter()
            .map(Value::into_bool)
            .collect()
    }

    fn script_flush(&self) -> Result<bool> {
        exec(self, "SCRIPT", vec![Bytes::from_static(b"FLUSH")])?.into_bool()
    }
}

impl<T: Executor + ?Sized> ScriptCommands for T {}

// ── Tests ──────────────────────────────────────────────────────────
