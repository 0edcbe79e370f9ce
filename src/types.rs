//! Decoded result values and command argument conversion.

use std::collections::{HashMap, HashSet};

use bytes::Bytes;

use crate::error::{LedisError, Result};
use crate::resp::types::RawReply;

/// The decoded, command-specific value returned to callers.
///
/// The shape depends on the decoding rule registered for the command; see
/// [`CallbackTable`](crate::callbacks::CallbackTable).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing key / nil reply.
    Nil,
    /// Boolean-family result.
    Bool(bool),
    /// Integer-family result.
    Int(i64),
    /// Float (INFO values, float scores).
    Float(f64),
    /// Binary-safe string.
    Bytes(Bytes),
    /// Status reply passed through unchanged (e.g. `OK` from COMMIT).
    Status(String),
    /// Text value that could not be cast to a number (INFO).
    Text(String),
    /// Ordered sequence.
    List(Vec<Value>),
    /// Unordered set of members.
    Set(HashSet<Bytes>),
    /// Field → value mapping (HGETALL).
    Map(HashMap<Bytes, Bytes>),
    /// Ordered `(member, score)` pairs.
    Scored(Vec<(Bytes, Value)>),
    /// Parsed INFO body.
    Info(HashMap<String, Value>),
    /// One page of an XSCAN-family scan.
    Scan(ScanPage),
}

/// One page of keys returned by a scan command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanPage {
    /// Key to resume from; empty when the scan is complete.
    pub cursor: Bytes,
    /// Keys in this page, in server order.
    pub items: Vec<Bytes>,
}

impl ScanPage {
    /// True when no further pages remain.
    pub fn is_last(&self) -> bool {
        self.cursor.is_empty()
    }
}

fn mismatch(expected: &str, got: &Value) -> LedisError {
    LedisError::Type(format!("expected {expected}, got {}", got.type_name()))
}

impl Value {
    /// Generic pass-through of a raw reply.
    ///
    /// Arrays are converted recursively; an error reply anywhere in the tree
    /// becomes a [`LedisError::Response`].
    pub fn from_reply(reply: RawReply) -> Result<Self> {
        Ok(match reply {
            RawReply::Status(s) => Self::Status(s),
            RawReply::Error(msg) => return Err(LedisError::response(msg)),
            RawReply::Integer(i) => Self::Int(i),
            RawReply::Bulk(b) => Self::Bytes(b),
            RawReply::Nil => Self::Nil,
            RawReply::Array(items) => Self::List(
                items
                    .into_iter()
                    .map(Self::from_reply)
                    .collect::<Result<_>>()?,
            ),
        })
    }

    /// Returns true if the value is nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Borrow as bytes, if this is a string-like value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            Self::Status(s) | Self::Text(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Returns a human-readable type name for this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bytes(_) => "bytes",
            Self::Status(_) => "status",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
            Self::Scored(_) => "scored",
            Self::Info(_) => "info",
            Self::Scan(_) => "scan",
        }
    }

    pub fn into_bool(self) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(b),
            Self::Int(i) => Ok(i != 0),
            Self::Status(ref s) if s == "OK" => Ok(true),
            other => Err(mismatch("bool", &other)),
        }
    }

    pub fn into_int(self) -> Result<i64> {
        match self {
            Self::Int(i) => Ok(i),
            other => Err(mismatch("int", &other)),
        }
    }

    pub fn into_opt_int(self) -> Result<Option<i64>> {
        match self {
            Self::Nil => Ok(None),
            other => other.into_int().map(Some),
        }
    }

    pub fn into_bytes(self) -> Result<Bytes> {
        match self {
            Self::Bytes(b) => Ok(b),
            Self::Status(s) | Self::Text(s) => Ok(Bytes::from(s)),
            other => Err(mismatch("bytes", &other)),
        }
    }

    pub fn into_opt_bytes(self) -> Result<Option<Bytes>> {
        match self {
            Self::Nil => Ok(None),
            other => other.into_bytes().map(Some),
        }
    }

    /// Status or UTF-8 bulk string as `String`.
    pub fn into_string(self) -> Result<String> {
        match self {
            Self::Status(s) | Self::Text(s) => Ok(s),
            Self::Bytes(b) => String::from_utf8(b.to_vec())
                .map_err(|e| LedisError::Type(format!("invalid UTF-8 in string value: {e}"))),
            other => Err(mismatch("string", &other)),
        }
    }

    /// Sequence; nil becomes an empty list.
    pub fn into_list(self) -> Result<Vec<Value>> {
        match self {
            Self::List(items) => Ok(items),
            Self::Nil => Ok(Vec::new()),
            other => Err(mismatch("list", &other)),
        }
    }

    pub fn into_bytes_list(self) -> Result<Vec<Bytes>> {
        self.into_list()?.into_iter().map(Value::into_bytes).collect()
    }

    pub fn into_opt_bytes_list(self) -> Result<Vec<Option<Bytes>>> {
        self.into_list()?
            .into_iter()
            .map(Value::into_opt_bytes)
            .collect()
    }

    pub fn into_set(self) -> Result<HashSet<Bytes>> {
        match self {
            Self::Set(s) => Ok(s),
            Self::Nil => Ok(HashSet::new()),
            other => Err(mismatch("set", &other)),
        }
    }

    pub fn into_map(self) -> Result<HashMap<Bytes, Bytes>> {
        match self {
            Self::Map(m) => Ok(m),
            Self::Nil => Ok(HashMap::new()),
            other => Err(mismatch("map", &other)),
        }
    }

    /// `(member, score)` pairs. A plain member list (scores not requested)
    /// is rejected.
    pub fn into_scored(self) -> Result<Vec<(Bytes, Value)>> {
        match self {
            Self::Scored(pairs) => Ok(pairs),
            Self::List(items) if items.is_empty() => Ok(Vec::new()),
            Self::Nil => Ok(Vec::new()),
            other => Err(mismatch("scored pairs", &other)),
        }
    }

    pub fn into_info(self) -> Result<HashMap<String, Value>> {
        match self {
            Self::Info(info) => Ok(info),
            other => Err(mismatch("info", &other)),
        }
    }

    pub fn into_scan(self) -> Result<ScanPage> {
        match self {
            Self::Scan(page) => Ok(page),
            other => Err(mismatch("scan page", &other)),
        }
    }
}

/// Trait for types that can be converted into command arguments.
pub trait ToArg {
    /// Encode this value as a binary-safe argument.
    fn to_arg(&self) -> Bytes;
}

impl<T: ToArg + ?Sized> ToArg for &T {
    fn to_arg(&self) -> Bytes {
        (**self).to_arg()
    }
}

impl ToArg for str {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for String {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for [u8] {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl<const N: usize> ToArg for [u8; N] {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl ToArg for Vec<u8> {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl ToArg for Bytes {
    fn to_arg(&self) -> Bytes {
        self.clone()
    }
}

impl ToArg for bool {
    fn to_arg(&self) -> Bytes {
        Bytes::from_static(if *self { b"1" } else { b"0" })
    }
}

impl ToArg for f64 {
    fn to_arg(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

macro_rules! int_to_arg {
    ($($t:ty),*) => {
        $(
            impl ToArg for $t {
                fn to_arg(&self) -> Bytes {
                    let mut buf = itoa::Buffer::new();
                    Bytes::copy_from_slice(buf.format(*self).as_bytes())
                }
            }
        )*
    };
}

int_to_arg!(i32, i64, u32, u64, usize);

/// Bitwise operation for `BOPT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOp {
    And,
    Or,
    Xor,
    Not,
}

impl BitOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Not => "not",
        }
    }
}

impl ToArg for BitOp {
    fn to_arg(&self) -> Bytes {
        Bytes::from_static(self.as_str().as_bytes())
    }
}

/// Which keyspace an XSCAN-family command walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    Kv,
    List,
    Hash,
    Set,
    ZSet,
    Bit,
}

impl ScanKind {
    /// The command name for this keyspace.
    pub fn command(self) -> &'static str {
        match self {
            Self::Kv => "XSCAN",
            Self::List => "LXSCAN",
            Self::Hash => "HXSCAN",
            Self::Set => "SXSCAN",
            Self::ZSet => "ZXSCAN",
            Self::Bit => "BXSCAN",
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
