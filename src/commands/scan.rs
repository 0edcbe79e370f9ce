//! XSCAN-family cursor scanning.

use std::collections::VecDeque;

use bytes::Bytes;

use crate::commands::{arg, exec};
use crate::error::Result;
use crate::executor::Executor;
use crate::types::{ScanKind, ScanPage, ToArg};

/// Send `<kind> cursor [MATCH pattern] COUNT count`.
pub fn scan_generic<E: Executor + ?Sized>(
    e: &E,
    kind: ScanKind,
    cursor: impl ToArg,
    pattern: Option<&str>,
    count: usize,
) -> Result<ScanPage> {
    let mut args = vec![arg(cursor)];
    if let Some(pattern) = pattern {
        args.push(Bytes::from_static(b"MATCH"));
        args.push(arg(pattern));
    }
    args.push(Bytes::from_static(b"COUNT"));
    args.push(arg(count));
    exec(e, kind.command(), args)?.into_scan()
}

/// Iterator over every key of one keyspace, fetching a page at a time.
///
/// Yields `Err` once and then stops if a page request fails.
pub struct ScanIter<'a, E: Executor + ?Sized> {
    executor: &'a E,
    kind: ScanKind,
    pattern: Option<String>,
    count: usize,
    cursor: Bytes,
    buffered: VecDeque<Bytes>,
    done: bool,
}

impl<'a, E: Executor + ?Sized> ScanIter<'a, E> {
    pub(crate) fn new(executor: &'a E, kind: ScanKind, pattern: Option<&str>, count: usize) -> Self {
        Self {
            executor,
            kind,
            pattern: pattern.map(str::to_string),
            count,
            cursor: Bytes::new(),
            buffered: VecDeque::new(),
            done: false,
        }
    }

    fn fetch(&mut self) -> Result<()> {
        let ScanPage { cursor, items } = scan_generic(
            self.executor,
            self.kind,
            &self.cursor,
            self.pattern.as_deref(),
            self.count,
        )?;
        self.done = cursor.is_empty() || cursor == self.cursor;
        self.cursor = cursor;
        self.buffered.extend(items);
        Ok(())
    }
}

impl<E: Executor + ?Sized> Iterator for ScanIter<'_, E> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }
            if let Err(e) = self.fetch() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
