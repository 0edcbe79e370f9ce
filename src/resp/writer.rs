//! RESP request serializer.
//!
//! Encodes a command name and its arguments into the RESP bulk string array
//! wire format: `*<N>\r\n$<len>\r\nNAME\r\n$<len>\r\narg1\r\n…`

use bytes::Bytes;
use itoa::Buffer;

/// Encode a command name plus arguments into RESP wire format.
///
/// Each argument is treated as a binary-safe bulk string.
///
/// # Example
/// ```ignore
/// let bytes = encode_command("SET", &[Bytes::from("key"), Bytes::from("value")]);
/// // → *3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n
/// ```
pub fn encode_command(name: &str, args: &[Bytes]) -> Vec<u8> {
    // '*' + max_digits(usize) + \r\n, then '$' + len + \r\n + data + \r\n per part
    let mut cap = 1 + 10 + 2 + 1 + 10 + 2 + name.len() + 2;
    for arg in args {
        cap += 1 + 10 + 2 + arg.len() + 2;
    }

    let mut buf = Vec::with_capacity(cap);
    let mut itoa_buf = Buffer::new();

    buf.push(b'*');
    buf.extend_from_slice(itoa_buf.format(args.len() + 1).as_bytes());
    buf.extend_from_slice(b"\r\n");

    write_bulk(&mut buf, &mut itoa_buf, name.as_bytes());
    for arg in args {
        write_bulk(&mut buf, &mut itoa_buf, arg);
    }

    buf
}

/// `$<len>\r\n<data>\r\n`
#[inline]
fn write_bulk(buf: &mut Vec<u8>, itoa_buf: &mut Buffer, data: &[u8]) {
    buf.push(b'$');
    buf.extend_from_slice(itoa_buf.format(data.len()).as_bytes());
    buf.extend_from_slice(b"\r\n");
    buf.extend_from_slice(data);
    buf.extend_from_slice(b"\r\n");
}

// ── Tests ──────────────────────────────────────────────────────────
