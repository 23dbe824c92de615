//! Frame layout.
//!
//! Every frame is `header UNIT_ID body END`:
//!
//! | Frame | Header | Body |
//! |-------|--------|------|
//! | operation request | `!` | command, value |
//! | reference request | `?` | command |
//! | acknowledgement | `06` | first two command bytes |
//! | payload acknowledgement | `06` | full command |
//! | negative acknowledgement | `15` | first two command bytes, status |
//! | reference response | `40` | first two command bytes, value |
//!
//! Table payloads follow the first acknowledgement unframed: 256 codes as
//! 16-bit little endian.

use std::fmt;

use projgamma_curve::{CodeTable, TABLE_SIZE};

use crate::error::{LinkError, LinkResult};

/// Device address bytes following every header.
pub const UNIT_ID: [u8; 2] = [0x89, 0x01];

/// Frame terminator.
pub const END: u8 = 0x0A;

/// Acknowledgement header.
pub const ACK: u8 = 0x06;

/// Negative acknowledgement header.
pub const NAK: u8 = 0x15;

/// Reference response header.
pub const RESPONSE: u8 = 0x40;

/// Sent by the projector when a client connects.
pub const HANDSHAKE_READY: &[u8] = b"PJ_OK";

/// Client's connection request.
pub const HANDSHAKE_REQUEST: &[u8] = b"PJREQ";

/// Projector's acceptance of the request.
pub const HANDSHAKE_ACCEPT: &[u8] = b"PJACK";

/// Bytes in a table payload.
pub const TABLE_BYTES: usize = TABLE_SIZE * 2;

/// Request kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    /// Change something.
    Operation,
    /// Ask for a value.
    Reference,
}

impl Header {
    /// Header byte.
    pub const fn byte(self) -> u8 {
        match self {
            Self::Operation => b'!',
            Self::Reference => b'?',
        }
    }

    /// Header for a byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'!' => Some(Self::Operation),
            b'?' => Some(Self::Reference),
            _ => None,
        }
    }
}

/// Acknowledgements and responses only echo the first two command bytes.
#[inline]
pub fn echo(command: &[u8]) -> &[u8] {
    &command[..command.len().min(2)]
}

fn frame(header: u8, parts: &[&[u8]]) -> Vec<u8> {
    let len = parts.iter().map(|p| p.len()).sum::<usize>();
    let mut out = Vec::with_capacity(len + 4);
    out.push(header);
    out.extend_from_slice(&UNIT_ID);
    for part in parts {
        out.extend_from_slice(part);
    }
    out.push(END);
    out
}

/// Request frame.
///
/// ```rust
/// use projgamma_link::frame::{request, Header};
///
/// assert_eq!(request(Header::Operation, b"PW", b"1"), b"!\x89\x01PW1\n");
/// assert_eq!(request(Header::Reference, b"PMGT", b""), b"?\x89\x01PMGT\n");
/// ```
pub fn request(header: Header, command: &[u8], value: &[u8]) -> Vec<u8> {
    frame(header.byte(), &[command, value])
}

/// Acknowledgement of `command`.
pub fn ack(command: &[u8]) -> Vec<u8> {
    frame(ACK, &[echo(command)])
}

/// Acknowledgement of a stored payload for `command`.
pub fn payload_ack(command: &[u8]) -> Vec<u8> {
    frame(ACK, &[command])
}

/// Negative acknowledgement of `command`.
pub fn nak(command: &[u8], status: u8) -> Vec<u8> {
    frame(NAK, &[echo(command), &[status]])
}

/// Reference response carrying `value`.
pub fn response(command: &[u8], value: &[u8]) -> Vec<u8> {
    frame(RESPONSE, &[echo(command), value])
}

/// Table payload: codes as 16-bit little endian, input order.
pub fn pack_table(table: &CodeTable) -> Vec<u8> {
    table.codes().iter().flat_map(|c| c.to_le_bytes()).collect()
}

/// Decodes a table payload.
///
/// Fails on a payload of the wrong length or codes out of range.
pub fn unpack_table(payload: &[u8]) -> LinkResult<CodeTable> {
    if payload.len() != TABLE_BYTES {
        return Err(LinkError::protocol(format!(
            "table payload is {} bytes, expected {TABLE_BYTES}",
            payload.len()
        )));
    }
    let codes = payload
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    CodeTable::from_codes(codes).map_err(|e| LinkError::invalid_value(e.to_string()))
}

/// Hex bytes for trace logs, long payloads shortened.
pub struct HexDump<'a>(pub &'a [u8]);

impl HexDump<'_> {
    const SHOWN: usize = 32;
}

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().take(Self::SHOWN).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        if self.0.len() > Self::SHOWN {
            write!(f, " ... ({} bytes)", self.0.len())?;
        }
        Ok(())
    }
}
