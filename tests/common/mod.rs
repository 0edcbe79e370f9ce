//! Shared helpers for integration tests.
//!
//! No external server is needed. Two in-process pools stand in for one:
//!
//! * [`MemoryPool`] runs a small LedisDB-like store (KV, lists, hashes,
//!   sets, sorted sets, XSCAN, BEGIN/COMMIT/ROLLBACK) and can inject
//!   connection faults.
//! * [`ScriptedPool`] replays canned replies and records every request.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

use ledis::{Connection, ConnectionPool, Ledis, LedisError, RawReply, Result};

/// Shorthand for a `Bytes` literal.
pub fn b(s: &str) -> Bytes {
    Bytes::copy_from_slice(s.as_bytes())
}

fn reset() -> LedisError {
    LedisError::Connection(io::Error::new(io::ErrorKind::ConnectionReset, "injected fault"))
}

// ── In-memory store ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Str(Bytes),
    List(VecDeque<Bytes>),
    Hash(BTreeMap<Bytes, Bytes>),
    Set(BTreeSet<Bytes>),
    ZSet(BTreeMap<Bytes, i64>),
}

pub type Db = BTreeMap<Bytes, Entry>;

/// Shared server state plus counters the tests assert on.
#[derive(Default)]
pub struct Server {
    pub db: Mutex<Db>,
    /// Upcoming reads that fail before the command is applied.
    faults_before: AtomicUsize,
    /// Upcoming reads that fail after the command is applied.
    faults_after: AtomicUsize,
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
    pub log: Mutex<Vec<String>>,
}

impl Server {
    /// Fail the next `n` replies without applying the command.
    pub fn fail_next(&self, n: usize) {
        self.faults_before.store(n, Ordering::SeqCst);
    }

    /// Apply the next `n` commands but lose their replies.
    pub fn lose_next_replies(&self, n: usize) {
        self.faults_after.store(n, Ordering::SeqCst);
    }

    pub fn count(&self, counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    /// Commands received so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    fn take_fault(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

pub struct MemoryPool {
    server: Arc<Server>,
}

struct TxState {
    db: Db,
    touched: BTreeSet<Bytes>,
}

pub struct MemoryConn {
    server: Arc<Server>,
    connected: bool,
    tx: Option<TxState>,
    pending: Option<(String, Vec<Bytes>)>,
}

impl ConnectionPool for MemoryPool {
    type Conn = MemoryConn;

    fn acquire(&self, _command: &str) -> Result<MemoryConn> {
        self.server.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryConn {
            server: Arc::clone(&self.server),
            connected: false,
            tx: None,
            pending: None,
        })
    }

    fn release(&self, _conn: MemoryConn) {
        self.server.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl Connection for MemoryConn {
    fn send(&mut self, command: &str, args: &[Bytes]) -> Result<()> {
        if !self.connected {
            self.connected = true;
            self.server.connects.fetch_add(1, Ordering::SeqCst);
        }
        self.server.log.lock().push(command.to_ascii_uppercase());
        self.pending = Some((command.to_ascii_uppercase(), args.to_vec()));
        Ok(())
    }

    fn read_reply(&mut self) -> Result<RawReply> {
        let (command, args) = self.pending.take().ok_or_else(reset)?;
        if Server::take_fault(&self.server.faults_before) {
            return Err(reset());
        }
        let reply = self.run(&command, &args);
        if Server::take_fault(&self.server.faults_after) {
            return Err(reset());
        }
        Ok(reply)
    }

    fn disconnect(&mut self) {
        // The server drops an open transaction with the socket
        self.connected = false;
        self.tx = None;
        self.pending = None;
        self.server.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

impl MemoryConn {
    fn run(&mut self, command: &str, args: &[Bytes]) -> RawReply {
        match command {
            "BEGIN" => {
                if self.tx.is_some() {
                    return err("ERR transaction already begun");
                }
                let db = self.server.db.lock().clone();
                self.tx = Some(TxState {
                    db,
                    touched: BTreeSet::new(),
                });
                ok()
            }
            "COMMIT" => match self.tx.take() {
                Some(tx) => {
                    let mut db = self.server.db.lock();
                    for key in tx.touched {
                        match tx.db.get(&key) {
                            Some(entry) => db.insert(key, entry.clone()),
                            None => db.remove(&key),
                        };
                    }
                    ok()
                }
                None => err("ERR not in transaction"),
            },
            "ROLLBACK" => match self.tx.take() {
                Some(_) => ok(),
                None => err("ERR not in transaction"),
            },
            _ => match self.tx.as_mut() {
                Some(tx) => {
                    let mut touched = Vec::new();
                    let reply = apply(&mut tx.db, command, args, &mut touched);
                    tx.touched.extend(touched);
                    reply
                }
                None => {
                    let mut db = self.server.db.lock();
                    apply(&mut db, command, args, &mut Vec::new())
                }
            },
        }
    }
}

fn ok() -> RawReply {
    RawReply::Status("OK".into())
}

fn err(msg: &str) -> RawReply {
    RawReply::Error(msg.into())
}

fn int(i: usize) -> RawReply {
    RawReply::Integer(i as i64)
}

fn wrong_type() -> RawReply {
    err("WRONGTYPE Operation against a key holding the wrong kind of value")
}

fn num(arg: &Bytes) -> Option<i64> {
    std::str::from_utf8(arg).ok()?.parse().ok()
}

fn bulk_array<'a>(items: impl IntoIterator<Item = &'a Bytes>) -> RawReply {
    RawReply::Array(items.into_iter().cloned().map(RawReply::Bulk).collect())
}

/// Glob match supporting `*` and `?`.
pub fn glob(pattern: &[u8], text: &[u8]) -> bool {
    match (pattern.first(), text.first()) {
        (None, None) => true,
        (Some(b'*'), _) => glob(&pattern[1..], text) || (!text.is_empty() && glob(pattern, &text[1..])),
        (Some(b'?'), Some(_)) => glob(&pattern[1..], &text[1..]),
        (Some(p), Some(t)) if p == t => glob(&pattern[1..], &text[1..]),
        _ => false,
    }
}

/// Inclusive `[start, stop]` with negative indexes, clamped to `len`.
fn index_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if start > stop || start >= len {
        None
    } else {
        Some((start as usize, stop as usize))
    }
}

macro_rules! arity {
    ($args:expr, $n:expr) => {
        if $args.len() < $n {
            return err("ERR wrong number of arguments");
        }
    };
}

macro_rules! typed {
    ($db:expr, $key:expr, $variant:ident) => {
        match $db.get($key) {
            None => None,
            Some(Entry::$variant(v)) => Some(v),
            Some(_) => return wrong_type(),
        }
    };
}

macro_rules! typed_mut {
    ($db:expr, $key:expr, $variant:ident, $empty:expr) => {
        match $db.entry($key.clone()).or_insert_with(|| Entry::$variant($empty)) {
            Entry::$variant(v) => v,
            _ => return wrong_type(),
        }
    };
}

fn scan(db: &Db, args: &[Bytes], keep: fn(&Entry) -> bool) -> RawReply {
    arity!(args, 1);
    let cursor = &args[0];
    let mut pattern: Option<&Bytes> = None;
    let mut count = 10usize;
    let mut i = 1;
    while i + 1 < args.len() {
        match args[i].to_ascii_uppercase().as_slice() {
            b"MATCH" => pattern = Some(&args[i + 1]),
            b"COUNT" => count = num(&args[i + 1]).unwrap_or(10).max(1) as usize,
            _ => return err("ERR syntax error"),
        }
        i += 2;
    }
    let mut matching = db
        .iter()
        .filter(|(key, entry)| keep(entry) && (cursor.is_empty() || *key > cursor))
        .filter(|(key, _)| pattern.map_or(true, |p| glob(p, key)))
        .map(|(key, _)| key.clone());
    let page: Vec<Bytes> = matching.by_ref().take(count).collect();
    let next = if matching.next().is_some() {
        page.last().cloned().unwrap_or_default()
    } else {
        Bytes::new()
    };
    RawReply::Array(vec![RawReply::Bulk(next), bulk_array(&page)])
}

fn set_members(db: &Db, key: &Bytes) -> std::result::Result<BTreeSet<Bytes>, RawReply> {
    match db.get(key) {
        None => Ok(BTreeSet::new()),
        Some(Entry::Set(s)) => Ok(s.clone()),
        Some(_) => Err(wrong_type()),
    }
}

fn apply(db: &mut Db, command: &str, args: &[Bytes], touched: &mut Vec<Bytes>) -> RawReply {
    match command {
        "PING" => RawReply::Status("PONG".into()),
        "ECHO" => {
            arity!(args, 1);
            RawReply::Bulk(args[0].clone())
        }
        "SELECT" => ok(),
        "INFO" => RawReply::Bulk(Bytes::from_static(
            b"# Server\r\nledis_version:0.4\r\nos:linux\r\n\r\n# Clients\r\nconnected_clients:1\r\n",
        )),
        "FLUSHDB" | "FLUSHALL" => {
            touched.extend(db.keys().cloned());
            db.clear();
            ok()
        }

        // ── KV ──
        "GET" => {
            arity!(args, 1);
            match typed!(db, &args[0], Str) {
                Some(v) => RawReply::Bulk(v.clone()),
                None => RawReply::Nil,
            }
        }
        "SET" => {
            arity!(args, 2);
            db.insert(args[0].clone(), Entry::Str(args[1].clone()));
            touched.push(args[0].clone());
            ok()
        }
        "SETNX" => {
            arity!(args, 2);
            if db.contains_key(&args[0]) {
                return int(0);
            }
            db.insert(args[0].clone(), Entry::Str(args[1].clone()));
            touched.push(args[0].clone());
            int(1)
        }
        "GETSET" => {
            arity!(args, 2);
            let old = typed!(db, &args[0], Str).cloned();
            db.insert(args[0].clone(), Entry::Str(args[1].clone()));
            touched.push(args[0].clone());
            old.map_or(RawReply::Nil, RawReply::Bulk)
        }
        "DEL" => {
            let removed = args.iter().filter(|k| db.remove(*k).is_some()).count();
            touched.extend(args.iter().cloned());
            int(removed)
        }
        "EXISTS" => {
            arity!(args, 1);
            int(usize::from(db.contains_key(&args[0])))
        }
        "INCRBY" | "DECRBY" => {
            arity!(args, 2);
            let Some(delta) = num(&args[1]) else {
                return err("ERR value is not an integer or out of range");
            };
            let delta = if command == "DECRBY" { -delta } else { delta };
            let current = match typed!(db, &args[0], Str) {
                Some(v) => match num(v) {
                    Some(n) => n,
                    None => return err("ERR value is not an integer or out of range"),
                },
                None => 0,
            };
            let next = current + delta;
            db.insert(args[0].clone(), Entry::Str(Bytes::from(next.to_string())));
            touched.push(args[0].clone());
            RawReply::Integer(next)
        }
        "MGET" => RawReply::Array(
            args.iter()
                .map(|k| match db.get(k) {
                    Some(Entry::Str(v)) => RawReply::Bulk(v.clone()),
                    _ => RawReply::Nil,
                })
                .collect(),
        ),
        "MSET" => {
            if args.is_empty() || args.len() % 2 != 0 {
                return err("ERR wrong number of arguments for MSET");
            }
            for pair in args.chunks_exact(2) {
                db.insert(pair[0].clone(), Entry::Str(pair[1].clone()));
                touched.push(pair[0].clone());
            }
            ok()
        }
        "XSCAN" => scan(db, args, |e| matches!(e, Entry::Str(_))),
        "LXSCAN" => scan(db, args, |e| matches!(e, Entry::List(_))),
        "HXSCAN" => scan(db, args, |e| matches!(e, Entry::Hash(_))),
        "SXSCAN" => scan(db, args, |e| matches!(e, Entry::Set(_))),
        "ZXSCAN" => scan(db, args, |e| matches!(e, Entry::ZSet(_))),

        // ── Lists ──
        "LPUSH" | "RPUSH" => {
            arity!(args, 2);
            let list = typed_mut!(db, &args[0], List, VecDeque::new());
            for value in &args[1..] {
                if command == "LPUSH" {
                    list.push_front(value.clone());
                } else {
                    list.push_back(value.clone());
                }
            }
            let len = list.len();
            touched.push(args[0].clone());
            int(len)
        }
        "LPOP" | "RPOP" => {
            arity!(args, 1);
            let popped = match db.get_mut(&args[0]) {
                None => None,
                Some(Entry::List(list)) if command == "LPOP" => list.pop_front(),
                Some(Entry::List(list)) => list.pop_back(),
                Some(_) => return wrong_type(),
            };
            if matches!(db.get(&args[0]), Some(Entry::List(l)) if l.is_empty()) {
                db.remove(&args[0]);
            }
            touched.push(args[0].clone());
            popped.map_or(RawReply::Nil, RawReply::Bulk)
        }
        "LLEN" => {
            arity!(args, 1);
            int(typed!(db, &args[0], List).map_or(0, VecDeque::len))
        }
        "LRANGE" => {
            arity!(args, 3);
            let (Some(start), Some(stop)) = (num(&args[1]), num(&args[2])) else {
                return err("ERR value is not an integer");
            };
            let Some(list) = typed!(db, &args[0], List) else {
                return RawReply::Array(vec![]);
            };
            match index_range(list.len(), start, stop) {
                Some((s, e)) => bulk_array(list.range(s..=e)),
                None => RawReply::Array(vec![]),
            }
        }

        // ── Hashes ──
        "HSET" => {
            arity!(args, 3);
            let hash = typed_mut!(db, &args[0], Hash, BTreeMap::new());
            let created = hash.insert(args[1].clone(), args[2].clone()).is_none();
            touched.push(args[0].clone());
            int(usize::from(created))
        }
        "HMSET" => {
            if args.len() < 3 || args.len() % 2 == 0 {
                return err("ERR wrong number of arguments for HMSET");
            }
            let hash = typed_mut!(db, &args[0], Hash, BTreeMap::new());
            for pair in args[1..].chunks_exact(2) {
                hash.insert(pair[0].clone(), pair[1].clone());
            }
            touched.push(args[0].clone());
            ok()
        }
        "HGET" => {
            arity!(args, 2);
            match typed!(db, &args[0], Hash).and_then(|h| h.get(&args[1])) {
                Some(v) => RawReply::Bulk(v.clone()),
                None => RawReply::Nil,
            }
        }
        "HGETALL" => {
            arity!(args, 1);
            let Some(hash) = typed!(db, &args[0], Hash) else {
                return RawReply::Array(vec![]);
            };
            RawReply::Array(
                hash.iter()
                    .flat_map(|(f, v)| [RawReply::Bulk(f.clone()), RawReply::Bulk(v.clone())])
                    .collect(),
            )
        }
        "HDEL" => {
            arity!(args, 2);
            let removed = match db.get_mut(&args[0]) {
                None => 0,
                Some(Entry::Hash(h)) => args[1..].iter().filter(|f| h.remove(*f).is_some()).count(),
                Some(_) => return wrong_type(),
            };
            touched.push(args[0].clone());
            int(removed)
        }
        "HLEN" => {
            arity!(args, 1);
            int(typed!(db, &args[0], Hash).map_or(0, BTreeMap::len))
        }

        // ── Sets ──
        "SADD" => {
            arity!(args, 2);
            let set = typed_mut!(db, &args[0], Set, BTreeSet::new());
            let added = args[1..].iter().filter(|m| set.insert((*m).clone())).count();
            touched.push(args[0].clone());
            int(added)
        }
        "SMEMBERS" => {
            arity!(args, 1);
            match typed!(db, &args[0], Set) {
                Some(set) => bulk_array(set),
                None => RawReply::Array(vec![]),
            }
        }
        "SCARD" => {
            arity!(args, 1);
            int(typed!(db, &args[0], Set).map_or(0, BTreeSet::len))
        }
        "SISMEMBER" => {
            arity!(args, 2);
            int(usize::from(
                typed!(db, &args[0], Set).is_some_and(|s| s.contains(&args[1])),
            ))
        }
        "SINTER" | "SUNION" | "SDIFF" => {
            arity!(args, 1);
            let mut acc = match set_members(db, &args[0]) {
                Ok(s) => s,
                Err(reply) => return reply,
            };
            for key in &args[1..] {
                let other = match set_members(db, key) {
                    Ok(s) => s,
                    Err(reply) => return reply,
                };
                acc = match command {
                    "SINTER" => acc.intersection(&other).cloned().collect(),
                    "SUNION" => acc.union(&other).cloned().collect(),
                    _ => acc.difference(&other).cloned().collect(),
                };
            }
            bulk_array(&acc)
        }

        // ── Sorted sets ──
        "ZADD" => {
            if args.len() < 3 || args.len() % 2 == 0 {
                return err("ERR wrong number of arguments for ZADD");
            }
            let mut pairs = Vec::new();
            for pair in args[1..].chunks_exact(2) {
                let Some(score) = num(&pair[0]) else {
                    return err("ERR value is not an integer or out of range");
                };
                pairs.push((score, pair[1].clone()));
            }
            let zset = typed_mut!(db, &args[0], ZSet, BTreeMap::new());
            let added = pairs
                .into_iter()
                .filter(|(score, member)| zset.insert(member.clone(), *score).is_none())
                .count();
            touched.push(args[0].clone());
            int(added)
        }
        "ZCARD" => {
            arity!(args, 1);
            int(typed!(db, &args[0], ZSet).map_or(0, BTreeMap::len))
        }
        "ZSCORE" => {
            arity!(args, 2);
            match typed!(db, &args[0], ZSet).and_then(|z| z.get(&args[1])) {
                Some(score) => RawReply::Bulk(Bytes::from(score.to_string())),
                None => RawReply::Nil,
            }
        }
        "ZRANK" | "ZREVRANK" | "ZRANGE" | "ZREVRANGE" => {
            arity!(args, 2);
            let Some(zset) = typed!(db, &args[0], ZSet) else {
                return if command.ends_with("RANK") {
                    RawReply::Nil
                } else {
                    RawReply::Array(vec![])
                };
            };
            let mut ordered: Vec<(&Bytes, i64)> = zset.iter().map(|(m, s)| (m, *s)).collect();
            ordered.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
            if command.starts_with("ZREV") {
                ordered.reverse();
            }
            if command.ends_with("RANK") {
                return match ordered.iter().position(|(m, _)| **m == args[1]) {
                    Some(rank) => int(rank),
                    None => RawReply::Nil,
                };
            }
            arity!(args, 3);
            let (Some(start), Some(stop)) = (num(&args[1]), num(&args[2])) else {
                return err("ERR value is not an integer");
            };
            let with_scores = args
                .get(3)
                .is_some_and(|a| a.eq_ignore_ascii_case(b"WITHSCORES"));
            let Some((s, e)) = index_range(ordered.len(), start, stop) else {
                return RawReply::Array(vec![]);
            };
            let mut out = Vec::new();
            for (member, score) in &ordered[s..=e] {
                out.push(RawReply::Bulk((*member).clone()));
                if with_scores {
                    out.push(RawReply::Bulk(Bytes::from(score.to_string())));
                }
            }
            RawReply::Array(out)
        }

        other => err(&format!("ERR unknown command '{}'", other.to_ascii_lowercase())),
    }
}

/// A client over a fresh in-memory store.
pub fn memory_client() -> (Ledis<MemoryPool>, Arc<Server>) {
    let server = Arc::new(Server::default());
    let pool = MemoryPool {
        server: Arc::clone(&server),
    };
    (Ledis::with_pool(pool), server)
}

// ── Scripted pool ──────────────────────────────────────────────────

/// One scripted round trip.
#[derive(Debug, Clone)]
pub enum Step {
    Reply(RawReply),
    Fault,
}

#[derive(Default)]
pub struct Script {
    steps: Mutex<VecDeque<Step>>,
    /// Every request as `[command, args...]`.
    pub requests: Mutex<Vec<Vec<String>>>,
    pub disconnects: AtomicUsize,
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
}

impl Script {
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Vec<String> {
        self.requests.lock().last().cloned().unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.steps.lock().len()
    }
}

pub struct ScriptedPool {
    script: Arc<Script>,
}

pub struct ScriptedConn {
    script: Arc<Script>,
    sent: bool,
}

impl ConnectionPool for ScriptedPool {
    type Conn = ScriptedConn;

    fn acquire(&self, _command: &str) -> Result<ScriptedConn> {
        self.script.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedConn {
            script: Arc::clone(&self.script),
            sent: false,
        })
    }

    fn release(&self, _conn: ScriptedConn) {
        self.script.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl Connection for ScriptedConn {
    fn send(&mut self, command: &str, args: &[Bytes]) -> Result<()> {
        let mut request = vec![command.to_string()];
        request.extend(args.iter().map(|a| String::from_utf8_lossy(a).into_owned()));
        self.script.requests.lock().push(request);
        self.sent = true;
        Ok(())
    }

    fn read_reply(&mut self) -> Result<RawReply> {
        if !std::mem::take(&mut self.sent) {
            return Err(reset());
        }
        match self.script.steps.lock().pop_front() {
            Some(Step::Reply(reply)) => Ok(reply),
            Some(Step::Fault) => Err(reset()),
            None => Err(LedisError::Protocol("script exhausted".into())),
        }
    }

    fn disconnect(&mut self) {
        self.script.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

/// A client whose round trips follow `steps` in order.
pub fn scripted_client(steps: Vec<Step>) -> (Ledis<ScriptedPool>, Arc<Script>) {
    let script = Arc::new(Script {
        steps: Mutex::new(steps.into()),
        ..Script::default()
    });
    let pool = ScriptedPool {
        script: Arc::clone(&script),
    };
    (Ledis::with_pool(pool), script)
}

/// Shorthand for a scripted reply.
pub fn reply(r: RawReply) -> Step {
    Step::Reply(r)
}

pub fn bulk(s: &str) -> RawReply {
    RawReply::Bulk(b(s))
}

pub fn status(s: &str) -> RawReply {
    RawReply::Status(s.into())
}
