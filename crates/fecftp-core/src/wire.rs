//! fecftp wire format — on-wire layout for the block-transfer protocol.
//!
//! All multi-byte fields are big-endian. Every message begins with a 16-bit
//! opcode whose high byte is always zero. Data, ACK, NACK, and Error messages
//! share the same 4-byte header; read requests carry a null-terminated file
//! name and mode token instead of a block number.

use bytes::{BufMut, Bytes, BytesMut};
use static_assertions::assert_eq_size;
use zerocopy::byteorder::{BigEndian, U16};
use zerocopy::{AsBytes, FromBytes, FromZeroes};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Well-known server port. There is no per-transfer port negotiation.
pub const DEFAULT_PORT: u16 = 7000;

/// Header bytes preceding every data, ACK, NACK, and error payload.
pub const HEADER_LEN: usize = 4;

/// Wire payload bytes of a full (non-final) data block.
/// A shorter payload marks the final block of the transfer.
pub const MAX_BLOCK_WIRE: usize = 512;

/// Largest datagram the protocol produces: header plus a full block.
pub const MAX_DATAGRAM: usize = HEADER_LEN + MAX_BLOCK_WIRE;

/// The only transfer mode the protocol speaks.
pub const MODE_OCTET: &[u8] = b"octet";

// ── Opcodes ───────────────────────────────────────────────────────────────────

/// Message kind, as carried in the first two bytes of every datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Opcode {
    /// Request a file.
    ReadRequest = 0x0001,
    /// Request a file over the deliberately noisy channel variant.
    /// The server injects bit errors into the FEC-protected payloads.
    ReadRequestNoisy = 0x0002,
    /// One block of file data.
    Data = 0x0003,
    /// Positive acknowledgment of a block.
    Ack = 0x0004,
    /// Server-reported error; terminates the transfer.
    Error = 0x0005,
    /// Negative acknowledgment — ask the server to resend a block.
    Nack = 0x0006,
}

impl TryFrom<u16> for Opcode {
    type Error = WireError;

    fn try_from(value: u16) -> Result<Self, WireError> {
        match value {
            0x0001 => Ok(Opcode::ReadRequest),
            0x0002 => Ok(Opcode::ReadRequestNoisy),
            0x0003 => Ok(Opcode::Data),
            0x0004 => Ok(Opcode::Ack),
            0x0005 => Ok(Opcode::Error),
            0x0006 => Ok(Opcode::Nack),
            other => Err(WireError::UnknownOpcode(other)),
        }
    }
}

impl From<Opcode> for u16 {
    fn from(op: Opcode) -> u16 {
        op as u16
    }
}

// ── Packet header ─────────────────────────────────────────────────────────────

/// Common 4-byte header of data, ACK, NACK, and error packets.
///
/// For error packets the `block` field carries the error code instead of a
/// block number; the two occupy the same wire position.
#[derive(Debug, Clone, AsBytes, FromBytes, FromZeroes)]
#[repr(C, packed)]
pub struct PacketHeader {
    pub opcode: U16<BigEndian>,
    pub block: U16<BigEndian>,
}

// Compile-time size guard. If this fails, the wire format has silently changed.
assert_eq_size!(PacketHeader, [u8; 4]);

// ── Builders ──────────────────────────────────────────────────────────────────

/// Build a read request: `[0x00, op][file][0x00]["octet"][0x00]`.
pub fn read_request(file: &str, noisy: bool) -> Bytes {
    let opcode = if noisy {
        Opcode::ReadRequestNoisy
    } else {
        Opcode::ReadRequest
    };
    let mut buf = BytesMut::with_capacity(2 + file.len() + 1 + MODE_OCTET.len() + 1);
    buf.put_u16(opcode.into());
    buf.put_slice(file.as_bytes());
    buf.put_u8(0);
    buf.put_slice(MODE_OCTET);
    buf.put_u8(0);
    buf.freeze()
}

/// Build a positive acknowledgment for `block`.
pub fn ack(block: u16) -> Bytes {
    control(Opcode::Ack, block)
}

/// Build a negative acknowledgment asking for `block` to be resent.
pub fn nack(block: u16) -> Bytes {
    control(Opcode::Nack, block)
}

fn control(opcode: Opcode, block: u16) -> Bytes {
    let header = PacketHeader {
        opcode: U16::new(opcode.into()),
        block: U16::new(block),
    };
    Bytes::copy_from_slice(header.as_bytes())
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors that can arise when interpreting wire-format data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("unknown opcode: 0x{0:04x}")]
    UnknownOpcode(u16),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
