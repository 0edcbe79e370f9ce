//! Global tokio runtime management.
//!
//! The client API is blocking; socket I/O for [`TcpConnection`] runs on a
//! shared multi-threaded runtime that lives for the rest of the process.
//!
//! [`TcpConnection`]: crate::connection::TcpConnection

use std::future::Future;
use std::io;
use std::sync::OnceLock;

use tokio::runtime::{Handle, Runtime};

use crate::error::{LedisError, Result};

/// Worker thread override.
const THREADS_ENV: &str = "LEDIS_RUNTIME_THREADS";

/// Built once on first use. A build failure is remembered so every later
/// call reports it instead of retrying.
static RUNTIME: OnceLock<std::result::Result<Runtime, String>> = OnceLock::new();

fn worker_threads() -> Option<usize> {
    std::env::var(THREADS_ENV)
        .ok()?
        .parse::<usize>()
        .ok()
        .filter(|&n| n > 0)
}

fn build() -> io::Result<Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all().thread_name("ledis-rt");
    if let Some(n) = worker_threads() {
        builder.worker_threads(n);
    }
    builder.build()
}

/// The global runtime, built on first use, or the error that prevented
/// building it.
pub fn try_runtime() -> Result<&'static Runtime> {
    match RUNTIME.get_or_init(|| build().map_err(|e| e.to_string())) {
        Ok(rt) => Ok(rt),
        Err(msg) => Err(LedisError::Runtime(format!("tokio runtime unavailable: {msg}"))),
    }
}

/// Drive one blocking client operation to completion.
///
/// A call made from a thread that is already inside a tokio runtime fails
/// with [`LedisError::Runtime`] instead of panicking.
pub(crate) fn run<T>(future: impl Future<Output = Result<T>>) -> Result<T> {
    if Handle::try_current().is_ok() {
        return Err(LedisError::Runtime(
            "blocking ledis call made from inside an async runtime".into(),
        ));
    }
    try_runtime()?.block_on(future)
}

// ── Tests ──────────────────────────────────────────────────────────
