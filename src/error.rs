use std::io;

// ── Error taxonomy ─────────────────────────────────────────────────
//
//  LedisError
//  ├── Connection / Timeout   transport faults, retried once by the executor
//  ├── Protocol / Incomplete  malformed RESP data (Incomplete is parser control flow)
//  ├── Response               the server answered with an error reply, never retried
//  ├── Data                   caller arguments rejected before any I/O
//  ├── Type                   decoded reply did not have the shape a builder expects
//  ├── TxNotBegin / TxAlreadyActive / TxAborted   transaction state machine
//  └── Runtime                blocking call inside async code, or no runtime

/// Structured server error kinds for programmatic matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseErrorKind {
    /// Generic ERR
    Err,
    /// WRONGTYPE Operation against a key holding the wrong kind of value
    WrongType,
    /// NOSCRIPT No matching script
    NoScript,
    /// BUSY the server is running a script
    Busy,
    /// LOADING the server is loading its dataset
    Loading,
    /// Any other error prefix
    Other(String),
}

impl ResponseErrorKind {
    /// Parse from a server error message (e.g. "WRONGTYPE Operation against…").
    pub fn from_error_msg(msg: &str) -> Self {
        if msg.starts_with("WRONGTYPE") {
            Self::WrongType
        } else if msg.starts_with("NOSCRIPT") {
            Self::NoScript
        } else if msg.starts_with("BUSY") {
            Self::Busy
        } else if msg.starts_with("LOADING") {
            Self::Loading
        } else if msg.starts_with("ERR") {
            Self::Err
        } else {
            // Ledis often replies without a prefix word; keep the first token
            let prefix = msg.split_whitespace().next().unwrap_or("UNKNOWN");
            Self::Other(prefix.to_string())
        }
    }
}

/// All error variants surfaced by the client.
#[derive(Debug, thiserror::Error)]
pub enum LedisError {
    /// TCP / IO level errors
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),
    /// Connect or read timed out
    #[error("timeout: {0}")]
    Timeout(String),
    /// RESP protocol parse errors
    #[error("protocol error: {0}")]
    Protocol(String),
    /// RESP parser needs more data. Parser control flow, never surfaced.
    #[error("incomplete RESP message")]
    Incomplete,
    /// The server returned an error reply
    #[error("response error: {message}")]
    Response {
        kind: ResponseErrorKind,
        message: String,
    },
    /// Invalid arguments, rejected before sending
    #[error("data error: {0}")]
    Data(String),
    /// Reply shape did not match the expected result type
    #[error("type error: {0}")]
    Type(String),
    /// A transactional command was issued outside BEGIN … COMMIT/ROLLBACK
    #[error("transaction not begun")]
    TxNotBegin,
    /// BEGIN was issued while a transaction is already active
    #[error("transaction already active")]
    TxAlreadyActive,
    /// The pinned connection was reset mid-session and the server dropped
    /// the open transaction with it
    #[error("transaction aborted: connection was reset")]
    TxAborted,
    /// The blocking client was driven from inside an async runtime, or the
    /// runtime could not be built
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl LedisError {
    /// Create a response error from a raw server message, auto-parsing the kind.
    pub fn response(msg: impl Into<String>) -> Self {
        let message = msg.into();
        let kind = ResponseErrorKind::from_error_msg(&message);
        Self::Response { kind, message }
    }

    /// True for transport faults: the only errors the executor retries.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }

    /// True when the server itself rejected the command.
    pub fn is_response_error(&self) -> bool {
        matches!(self, Self::Response { .. })
    }

    /// The response error kind, if this is a server error.
    pub fn response_kind(&self) -> Option<&ResponseErrorKind> {
        match self {
            Self::Response { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedisError>;

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_err() {
        let kind = ResponseErrorKind::from_error_msg("ERR invalid db index 16");
        assert_eq!(kind, ResponseErrorKind::Err);
    }

    #[test]
    fn kind_wrongtype() {
        let kind =
            ResponseErrorKind::from_error_msg("WRONGTYPE Operation against a key holding wrong type");
        assert_eq!(kind, ResponseErrorKind::WrongType);
    }

    #[test]
    fn kind_noscript_busy_loading() {
        assert_eq!(
            ResponseErrorKind::from_error_msg("NOSCRIPT No matching script"),
            ResponseErrorKind::NoScript
        );
        assert_eq!(
            ResponseErrorKind::from_error_msg("BUSY running a script"),
            ResponseErrorKind::Busy
        );
        assert_eq!(
            ResponseErrorKind::from_error_msg("LOADING dataset"),
            ResponseErrorKind::Loading
        );
    }

    #[test]
    fn kind_other_keeps_first_word() {
        let kind = ResponseErrorKind::from_error_msg("invalid command param");
        assert_eq!(kind, ResponseErrorKind::Other("invalid".to_string()));
    }

    #[test]
    fn kind_empty_message() {
        let kind = ResponseErrorKind::from_error_msg("");
        assert_eq!(kind, ResponseErrorKind::Other("UNKNOWN".to_string()));
    }

    #[test]
    fn display() {
        let err = LedisError::Connection(io::Error::new(io::ErrorKind::Other, "refused"));
        assert!(err.to_string().contains("connection error"));

        let err = LedisError::Protocol("bad input".into());
        assert_eq!(err.to_string(), "protocol error: bad input");

        let err = LedisError::response("ERR unknown command");
        assert_eq!(err.to_string(), "response error: ERR unknown command");

        let err = LedisError::Data("empty mapping".into());
        assert_eq!(err.to_string(), "data error: empty mapping");

        let err = LedisError::Timeout("30s exceeded".into());
        assert_eq!(err.to_string(), "timeout: 30s exceeded");

        assert_eq!(LedisError::TxNotBegin.to_string(), "transaction not begun");
        assert_eq!(
            LedisError::TxAlreadyActive.to_string(),
            "transaction already active"
        );
        assert_eq!(
            LedisError::TxAborted.to_string(),
            "transaction aborted: connection was reset"
        );
    }

    #[test]
    fn connection_errors_are_retryable() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        let err: LedisError = io_err.into();
        assert!(err.is_connection_error());
        assert!(LedisError::Timeout("read".into()).is_connection_error());
    }

    #[test]
    fn other_errors_are_not_retryable() {
        assert!(!LedisError::response("ERR x").is_connection_error());
        assert!(!LedisError::Protocol("x".into()).is_connection_error());
        assert!(!LedisError::Data("x".into()).is_connection_error());
        assert!(!LedisError::TxNotBegin.is_connection_error());
        assert!(!LedisError::TxAborted.is_connection_error());
        assert!(!LedisError::Runtime("nested".into()).is_connection_error());
    }

    #[test]
    fn response_helpers() {
        let err = LedisError::response("WRONGTYPE nope");
        assert!(err.is_response_error());
        assert_eq!(err.response_kind(), Some(&ResponseErrorKind::WrongType));
        assert_eq!(LedisError::TxNotBegin.response_kind(), None);
    }
}
