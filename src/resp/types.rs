use bytes::Bytes;

/// One undecoded reply as produced by the wire layer (RESP2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawReply {
    /// +OK\r\n
    Status(String),
    /// -ERR message\r\n
    Error(String),
    /// :1000\r\n
    Integer(i64),
    /// $6\r\nfoobar\r\n
    Bulk(Bytes),
    /// $-1\r\n  or  *-1\r\n
    Nil,
    /// *2\r\n…
    Array(Vec<RawReply>),
}

// ── Convenience accessors ──────────────────────────────────────────

impl RawReply {
    /// Try to interpret this reply as a UTF-8 string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Status(s) => Some(s),
            Self::Bulk(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Try to interpret this reply as bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bulk(b) => Some(b),
            Self::Status(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Try to interpret this reply as i64.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// True when the reply is a status or bulk string equal to `literal`.
    pub fn is_literal(&self, literal: &str) -> bool {
        self.as_bytes() == Some(literal.as_bytes())
    }

    /// Returns true when this reply represents nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns true when this is a server error.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the error message if this is an error reply.
    pub fn as_error_msg(&self) -> Option<&str> {
        match self {
            Self::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Returns the type name as a static string (useful for error messages).
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Status(_) => "status",
            Self::Error(_) => "error",
            Self::Integer(_) => "integer",
            Self::Bulk(_) => "bulk",
            Self::Nil => "nil",
            Self::Array(_) => "array",
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
