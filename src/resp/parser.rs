//! Streaming RESP2 parser.
//!
//! [`parse`] takes a byte buffer and returns `Ok((RawReply, bytes_consumed))`
//! or `Err(Incomplete)` when more data is needed, or `Err(Protocol(…))` on
//! malformed input.
//!
//! Bulk strings are extracted via zero-copy `Bytes::slice()`.

use bytes::Bytes;
use memchr::memchr;

use crate::error::{LedisError, Result};
use crate::resp::types::RawReply;

/// Maximum number of elements allowed in a single array.
///
/// Stops a hostile count (e.g. `*2147483647\r\n`) from triggering a huge
/// allocation before any element has arrived.
const MAX_ARRAY_ELEMENTS: usize = 16_777_216;

/// Maximum nesting depth for arrays.
const MAX_PARSE_DEPTH: usize = 512;

/// Parse one reply from the front of `buf`.
///
/// Returns `(reply, bytes_consumed)` on success, `Err(Incomplete)` when the
/// buffer is too short; callers should read more data and retry.
pub fn parse(buf: &Bytes) -> Result<(RawReply, usize)> {
    parse_at_depth(buf, 0)
}

/// Convenience wrapper: parse from a byte slice (copies into `Bytes` first).
pub fn parse_slice(buf: &[u8]) -> Result<(RawReply, usize)> {
    parse(&Bytes::copy_from_slice(buf))
}

fn parse_at_depth(buf: &Bytes, depth: usize) -> Result<(RawReply, usize)> {
    if buf.is_empty() {
        return Err(LedisError::Incomplete);
    }

    match buf[0] {
        b'+' => parse_status(buf),
        b'-' => parse_error(buf),
        b':' => parse_integer(buf),
        b'$' => parse_bulk(buf),
        b'*' => parse_array(buf, depth),
        other => Err(LedisError::Protocol(format!(
            "unknown RESP type byte: 0x{other:02x}"
        ))),
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Find the next `\r\n` in `buf` starting at `offset`.
/// Returns the index of `\r`.
#[inline]
fn find_crlf(buf: &[u8], offset: usize) -> Result<usize> {
    let search = &buf[offset..];
    match memchr(b'\r', search) {
        Some(pos) => {
            let abs = offset + pos;
            if abs + 1 < buf.len() && buf[abs + 1] == b'\n' {
                Ok(abs)
            } else if abs + 1 >= buf.len() {
                Err(LedisError::Incomplete)
            } else {
                Err(LedisError::Protocol("expected \\n after \\r".into()))
            }
        }
        None => Err(LedisError::Incomplete),
    }
}

/// Read the line starting at `buf[offset]` up to `\r\n`.
/// Returns `(line_bytes, index_after_crlf)`.
#[inline]
fn read_line(buf: &[u8], offset: usize) -> Result<(&[u8], usize)> {
    let cr = find_crlf(buf, offset)?;
    Ok((&buf[offset..cr], cr + 2))
}

/// Parse an integer from a byte slice (no allocations).
fn parse_int_from_bytes(bytes: &[u8]) -> Result<i64> {
    if bytes.is_empty() {
        return Err(LedisError::Protocol("empty integer".into()));
    }
    let (negative, digits) = match bytes[0] {
        b'-' => (true, &bytes[1..]),
        b'+' => (false, &bytes[1..]),
        _ => (false, bytes),
    };

    if digits.is_empty() {
        return Err(LedisError::Protocol("integer has no digits".into()));
    }

    // Accumulate as negative so i64::MIN does not overflow.
    let mut n: i64 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return Err(LedisError::Protocol(format!(
                "invalid byte in integer: 0x{b:02x}"
            )));
        }
        n = n
            .checked_mul(10)
            .and_then(|n| n.checked_sub((b - b'0') as i64))
            .ok_or_else(|| LedisError::Protocol("integer overflow".into()))?;
    }

    if negative {
        Ok(n)
    } else {
        n.checked_neg()
            .ok_or_else(|| LedisError::Protocol("integer overflow".into()))
    }
}

fn line_to_string(line: &[u8], what: &str) -> Result<String> {
    std::str::from_utf8(line)
        .map(str::to_string)
        .map_err(|e| LedisError::Protocol(format!("invalid UTF-8 in {what}: {e}")))
}

// ── Type parsers ──────────────────────────────────────────────────

/// `+<string>\r\n`
fn parse_status(buf: &Bytes) -> Result<(RawReply, usize)> {
    let (line, next) = read_line(buf, 1)?;
    let s = match line {
        b"OK" => "OK".to_string(),
        b"PONG" => "PONG".to_string(),
        _ => line_to_string(line, "status")?,
    };
    Ok((RawReply::Status(s), next))
}

/// `-<error message>\r\n`
fn parse_error(buf: &Bytes) -> Result<(RawReply, usize)> {
    let (line, next) = read_line(buf, 1)?;
    Ok((RawReply::Error(line_to_string(line, "error")?), next))
}

/// `:<integer>\r\n`
fn parse_integer(buf: &Bytes) -> Result<(RawReply, usize)> {
    let (line, next) = read_line(buf, 1)?;
    Ok((RawReply::Integer(parse_int_from_bytes(line)?), next))
}

/// `$<length>\r\n<data>\r\n`  or  `$-1\r\n`
fn parse_bulk(buf: &Bytes) -> Result<(RawReply, usize)> {
    let (line, next) = read_line(buf, 1)?;
    let len = parse_int_from_bytes(line)?;

    if len < 0 {
        return Ok((RawReply::Nil, next));
    }

    let data_end = next + len as usize;
    if buf.len() < data_end + 2 {
        return Err(LedisError::Incomplete);
    }
    if buf[data_end] != b'\r' || buf[data_end + 1] != b'\n' {
        return Err(LedisError::Protocol(
            "bulk string not terminated by \\r\\n".into(),
        ));
    }

    Ok((RawReply::Bulk(buf.slice(next..data_end)), data_end + 2))
}

/// `*<count>\r\n<elements>`  or  `*-1\r\n`
fn parse_array(buf: &Bytes, depth: usize) -> Result<(RawReply, usize)> {
    if depth >= MAX_PARSE_DEPTH {
        return Err(LedisError::Protocol(format!(
            "array nesting exceeds {MAX_PARSE_DEPTH} levels"
        )));
    }

    let (line, mut next) = read_line(buf, 1)?;
    let count = parse_int_from_bytes(line)?;

    if count < 0 {
        return Ok((RawReply::Nil, next));
    }

    let count = count as usize;
    if count > MAX_ARRAY_ELEMENTS {
        return Err(LedisError::Protocol(format!(
            "array of {count} elements exceeds limit {MAX_ARRAY_ELEMENTS}"
        )));
    }

    let mut elements = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let sub = buf.slice(next..);
        let (val, consumed) = parse_at_depth(&sub, depth + 1)?;
        elements.push(val);
        next += consumed;
    }
    Ok((RawReply::Array(elements), next))
}

// ── Tests ──────────────────────────────────────────────────────────
