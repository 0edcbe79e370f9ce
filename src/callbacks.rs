//! Per-command reply decoding.
//!
//! A [`CallbackTable`] maps a command name to a [`Decoder`]: either one of
//! the built-in [`Rule`]s or a caller-supplied closure. Commands with no
//! entry fall back to a generic pass-through of the raw reply.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{LedisError, Result};
use crate::resp::types::RawReply;
use crate::types::{ScanPage, Value};

/// Converts one sorted-set score from its wire text into a [`Value`].
pub type ScoreCast = fn(&[u8]) -> Result<Value>;

/// Decode-time parameters attached to a single call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Pair range results as `(member, score)`.
    pub with_scores: bool,
    /// Per-call override of the table's score cast.
    pub score_cast: Option<ScoreCast>,
}

impl Options {
    pub const fn new() -> Self {
        Self {
            with_scores: false,
            score_cast: None,
        }
    }

    /// Options for a `WITHSCORES` range call.
    pub const fn with_scores() -> Self {
        Self {
            with_scores: true,
            score_cast: None,
        }
    }

    pub fn score_cast(mut self, cast: ScoreCast) -> Self {
        self.score_cast = Some(cast);
        self
    }
}

/// Default score cast: integer if the text is one, else float.
pub fn parse_score(raw: &[u8]) -> Result<Value> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| LedisError::Protocol("score is not valid UTF-8".into()))?;
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Value::Int(i));
    }
    text.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| LedisError::Protocol(format!("invalid score: {text:?}")))
}

/// Built-in decoding rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Nonzero integer, or an `OK` reply.
    Bool,
    /// Integer reply (or a bulk holding one).
    Int,
    /// Integer if the server sent one, else `OK` → true.
    PushResult,
    /// True iff the status equals the literal; nil → false.
    Literal(&'static str),
    /// Array → set of members; nil → empty set.
    Members,
    /// Range result, zipped into `(member, score)` when scores were requested.
    ScorePairs,
    /// Nil passes through, anything else goes through the score cast.
    NumberOrNil,
    /// Alternating field/value array → map; nil → empty map.
    PairsToMap,
    /// `INFO` body → map of typed values.
    Info,
    /// `[cursor, [items]]` → [`ScanPage`].
    Scan,
}

type DecodeFn = dyn Fn(RawReply, &Options) -> Result<Value> + Send + Sync;

/// How one command's reply is decoded.
#[derive(Clone)]
pub enum Decoder {
    Rule(Rule),
    Custom(Arc<DecodeFn>),
}

impl Decoder {
    /// Wrap a closure as a decoder.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(RawReply, &Options) -> Result<Value> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }
}

impl From<Rule> for Decoder {
    fn from(rule: Rule) -> Self {
        Self::Rule(rule)
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule(rule) => f.debug_tuple("Rule").field(rule).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

const BOOL_COMMANDS: &[&str] = &[
    "EXISTS", "HEXISTS", "SISMEMBER", "HMSET", "SETNX",
    "PERSIST", "HPERSIST", "LPERSIST", "ZPERSIST", "SPERSIST", "BPERSIST",
    "EXPIRE", "LEXPIRE", "HEXPIRE", "SEXPIRE", "ZEXPIRE", "BEXPIRE",
    "EXPIREAT", "LEXPIREAT", "HEXPIREAT", "SEXPIREAT", "ZEXPIREAT", "BEXPIREAT",
];

const INT_COMMANDS: &[&str] = &[
    "DECRBY", "DEL", "HDEL", "HLEN", "INCRBY", "LLEN", "ZADD", "ZCARD", "ZREM",
    "ZREMRANGEBYRANK", "ZREMRANGEBYSCORE", "LMCLEAR", "HMCLEAR", "ZMCLEAR",
    "BCOUNT", "BGETBIT", "BSETBIT", "BOPT", "BMSETBIT",
    "SADD", "SCARD", "SDIFFSTORE", "SINTERSTORE", "SUNIONSTORE", "SREM",
    "SCLEAR", "SMCLEAR", "BDELETE",
    "INCR", "DECR", "TTL", "LTTL", "HTTL", "STTL", "ZTTL", "BTTL",
    "LCLEAR", "HCLEAR", "ZCLEAR", "ZCOUNT", "HSET", "HINCRBY",
];

const OK_COMMANDS: &[&str] = &["MSET", "SELECT", "SET", "FLUSHDB", "FLUSHALL"];

const MEMBER_COMMANDS: &[&str] = &["SDIFF", "SINTER", "SMEMBERS", "SUNION"];

const RANGE_COMMANDS: &[&str] = &["ZRANGE", "ZRANGEBYSCORE", "ZREVRANGE", "ZREVRANGEBYSCORE"];

const SCORE_COMMANDS: &[&str] = &["ZRANK", "ZREVRANK", "ZSCORE", "ZINCRBY"];

const SCAN_COMMANDS: &[&str] = &["XSCAN", "LXSCAN", "HXSCAN", "SXSCAN", "ZXSCAN", "BXSCAN"];

/// Command name → decoder registry.
///
/// Cloning is cheap enough to do per client; custom decoders are shared
/// behind `Arc`.
#[derive(Debug, Clone)]
pub struct CallbackTable {
    entries: HashMap<String, Decoder>,
    score_cast: ScoreCast,
}

impl Default for CallbackTable {
    /// The full table for every command the client knows.
    fn default() -> Self {
        let mut table = Self::empty();
        let groups: [(&[&str], Rule); 7] = [
            (BOOL_COMMANDS, Rule::Bool),
            (INT_COMMANDS, Rule::Int),
            (OK_COMMANDS, Rule::Literal("OK")),
            (MEMBER_COMMANDS, Rule::Members),
            (RANGE_COMMANDS, Rule::ScorePairs),
            (SCORE_COMMANDS, Rule::NumberOrNil),
            (SCAN_COMMANDS, Rule::Scan),
        ];
        for (names, rule) in groups {
            for name in names {
                table.register(name, rule);
            }
        }
        table.register("LPUSH", Rule::PushResult);
        table.register("RPUSH", Rule::PushResult);
        table.register("PING", Rule::Literal("PONG"));
        table.register("HGETALL", Rule::PairsToMap);
        table.register("INFO", Rule::Info);
        table
    }
}

impl CallbackTable {
    /// A table with no entries: every reply passes through.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            score_cast: parse_score,
        }
    }

    /// Register (or replace) the decoder for `name`.
    pub fn register(&mut self, name: &str, decoder: impl Into<Decoder>) {
        self.entries.insert(name.to_ascii_uppercase(), decoder.into());
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, name: &str, decoder: impl Into<Decoder>) -> Self {
        self.register(name, decoder);
        self
    }

    /// Replace the default score cast.
    pub fn with_score_cast(mut self, cast: ScoreCast) -> Self {
        self.score_cast = cast;
        self
    }

    pub fn score_cast(&self) -> ScoreCast {
        self.score_cast
    }

    /// The decoder registered for `name` (case-insensitive).
    pub fn lookup(&self, name: &str) -> Option<&Decoder> {
        self.entries
            .get(name)
            .or_else(|| self.entries.get(&name.to_ascii_uppercase()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode `reply` for `name`.
    ///
    /// Error replies never reach a decoder; they become
    /// [`LedisError::Response`].
    pub fn decode(&self, name: &str, reply: RawReply, options: &Options) -> Result<Value> {
        if let RawReply::Error(msg) = reply {
            return Err(LedisError::response(msg));
        }
        match self.lookup(name) {
            Some(Decoder::Rule(rule)) => {
                let cast = options.score_cast.unwrap_or(self.score_cast);
                apply_rule(*rule, reply, options, cast)
            }
            Some(Decoder::Custom(f)) => f(reply, options),
            None => Value::from_reply(reply),
        }
    }
}

fn unexpected(rule: &str, reply: &RawReply) -> LedisError {
    LedisError::Protocol(format!(
        "unexpected {} reply for {rule} decoding",
        reply.type_name()
    ))
}

/// Bytes of a scalar reply element.
fn scalar_bytes(reply: RawReply) -> Result<Bytes> {
    match reply {
        RawReply::Bulk(b) => Ok(b),
        RawReply::Status(s) => Ok(Bytes::from(s)),
        RawReply::Integer(i) => {
            let mut buf = itoa::Buffer::new();
            Ok(Bytes::copy_from_slice(buf.format(i).as_bytes()))
        }
        other => Err(unexpected("scalar", &other)),
    }
}

fn text_int(raw: &[u8]) -> Option<i64> {
    std::str::from_utf8(raw).ok()?.parse().ok()
}

fn apply_rule(rule: Rule, reply: RawReply, options: &Options, cast: ScoreCast) -> Result<Value> {
    match rule {
        Rule::Bool => to_bool(reply),
        Rule::Int => to_int(reply),
        Rule::PushResult => match reply {
            RawReply::Integer(i) => Ok(Value::Int(i)),
            other => Ok(Value::Bool(other.is_literal("OK"))),
        },
        Rule::Literal(literal) => match reply {
            RawReply::Nil => Ok(Value::Bool(false)),
            other => Ok(Value::Bool(other.is_literal(literal))),
        },
        Rule::Members => to_members(reply),
        Rule::ScorePairs => zip_score_pairs(reply, options, cast),
        Rule::NumberOrNil => match reply {
            RawReply::Nil => Ok(Value::Nil),
            RawReply::Integer(i) => Ok(Value::Int(i)),
            other => cast(&scalar_bytes(other)?),
        },
        Rule::PairsToMap => pairs_to_map(reply),
        Rule::Info => match reply {
            RawReply::Bulk(b) => Ok(parse_info(&String::from_utf8_lossy(&b))),
            RawReply::Status(s) => Ok(parse_info(&s)),
            other => Err(unexpected("INFO", &other)),
        },
        Rule::Scan => to_scan_page(reply),
    }
}

fn to_bool(reply: RawReply) -> Result<Value> {
    let b = match reply {
        RawReply::Integer(i) => i != 0,
        RawReply::Nil => false,
        RawReply::Status(s) => s == "OK" || text_int(s.as_bytes()).is_some_and(|i| i != 0),
        RawReply::Bulk(b) => &b[..] == b"OK" || text_int(&b).is_some_and(|i| i != 0),
        other => return Err(unexpected("bool", &other)),
    };
    Ok(Value::Bool(b))
}

fn to_int(reply: RawReply) -> Result<Value> {
    match reply {
        RawReply::Integer(i) => Ok(Value::Int(i)),
        RawReply::Bulk(ref b) => text_int(b)
            .map(Value::Int)
            .ok_or_else(|| unexpected("int", &reply)),
        other => Err(unexpected("int", &other)),
    }
}

fn to_members(reply: RawReply) -> Result<Value> {
    match reply {
        RawReply::Nil => Ok(Value::Set(HashSet::new())),
        RawReply::Array(items) => Ok(Value::Set(
            items.into_iter().map(scalar_bytes).collect::<Result<_>>()?,
        )),
        other => Err(unexpected("members", &other)),
    }
}

/// Pair consecutive elements as `(member, cast(score))`.
///
/// Without `with_scores`, or for an empty reply, the array passes through
/// unchanged.
pub fn zip_score_pairs(reply: RawReply, options: &Options, cast: ScoreCast) -> Result<Value> {
    let items = match reply {
        RawReply::Array(items) if options.with_scores && !items.is_empty() => items,
        other => return Value::from_reply(other),
    };
    if items.len() % 2 != 0 {
        return Err(LedisError::Protocol(format!(
            "scored range reply has odd length {}",
            items.len()
        )));
    }
    let mut pairs = Vec::with_capacity(items.len() / 2);
    let mut it = items.into_iter();
    while let (Some(member), Some(score)) = (it.next(), it.next()) {
        let score = match score {
            RawReply::Integer(i) => Value::Int(i),
            other => cast(&scalar_bytes(other)?)?,
        };
        pairs.push((scalar_bytes(member)?, score));
    }
    Ok(Value::Scored(pairs))
}

/// Alternating key/value array → map. Nil or empty yields an empty map.
pub fn pairs_to_map(reply: RawReply) -> Result<Value> {
    let items = match reply {
        RawReply::Nil => return Ok(Value::Map(HashMap::new())),
        RawReply::Array(items) => items,
        other => return Err(unexpected("map", &other)),
    };
    if items.len() % 2 != 0 {
        return Err(LedisError::Protocol(format!(
            "key/value reply has odd length {}",
            items.len()
        )));
    }
    let mut map = HashMap::with_capacity(items.len() / 2);
    let mut it = items.into_iter();
    while let (Some(field), Some(value)) = (it.next(), it.next()) {
        map.insert(scalar_bytes(field)?, scalar_bytes(value)?);
    }
    Ok(Value::Map(map))
}

fn info_value(raw: &str) -> Value {
    if raw.contains(',') && raw.contains('=') {
        return Value::Text(raw.to_string());
    }
    if raw.contains('.') {
        if let Ok(f) = raw.parse::<f64>() {
            return Value::Float(f);
        }
    } else if let Ok(i) = raw.parse::<i64>() {
        return Value::Int(i);
    }
    Value::Text(raw.to_string())
}

/// Parse an `INFO` body into `key → value`.
///
/// `#` section headers and blank lines are skipped, as are lines with no
/// `:`. Values are cast to float (if they contain `.`) or integer when
/// they parse cleanly.
pub fn parse_info(body: &str) -> Value {
    let info = body
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .map(|(key, raw)| (key.to_string(), info_value(raw)))
        .collect();
    Value::Info(info)
}

fn to_scan_page(reply: RawReply) -> Result<Value> {
    let mut parts = match reply {
        RawReply::Array(parts) if parts.len() == 2 => parts.into_iter(),
        other => return Err(unexpected("scan", &other)),
    };
    let (Some(cursor), Some(items)) = (parts.next(), parts.next()) else {
        return Err(LedisError::Protocol("scan reply missing parts".into()));
    };
    let cursor = match cursor {
        RawReply::Nil => Bytes::new(),
        other => scalar_bytes(other)?,
    };
    let items = match items {
        RawReply::Nil => Vec::new(),
        RawReply::Array(items) => items.into_iter().map(scalar_bytes).collect::<Result<_>>()?,
        other => return Err(unexpected("scan", &other)),
    };
    Ok(Value::Scan(ScanPage { cursor, items }))
}

// ── Tests ──────────────────────────────────────────────────────────
