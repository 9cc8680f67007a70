//! PacketCodec — turns one received datagram into a logical packet.
//!
//! Pure classification: bytes in, decoded structure out. The codec never
//! performs I/O and never retries; the session owns those decisions.

use bytes::Bytes;
use zerocopy::FromBytes;

use crate::fec;
use crate::wire::{Opcode, PacketHeader, HEADER_LEN, MAX_BLOCK_WIRE};

/// A successfully classified datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A data block whose codewords all passed SEC-DED.
    Block {
        block: u16,
        /// Payload bytes as they appeared on the wire, before FEC decode.
        /// `wire_len < MAX_BLOCK_WIRE` marks the final block.
        wire_len: usize,
        /// Corrected, extracted, and (on the final block) de-padded data.
        data: Bytes,
        last: bool,
    },
    /// A data block with an uncorrectable codeword; must be re-requested.
    Corrupt { block: u16 },
    /// A server-reported error. Terminates the transfer.
    ServerError { code: u16, message: String },
}

/// Protocol violations. All of these are fatal to the transfer; an
/// uncorrectable block is not an error at this level (see [`Decoded::Corrupt`]).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("datagram too short for a packet header: {0} bytes")]
    Truncated(usize),
    #[error("payload of {0} bytes exceeds the maximum block size")]
    Oversized(usize),
    #[error("payload length {0} is not a whole number of codewords")]
    Misaligned(usize),
    #[error("unexpected opcode 0x{0:04x} while awaiting a data block")]
    UnexpectedOpcode(u16),
}

/// Decode one raw datagram.
pub fn decode(raw: &[u8]) -> Result<Decoded, CodecError> {
    let header =
        PacketHeader::read_from_prefix(raw).ok_or(CodecError::Truncated(raw.len()))?;
    let payload = &raw[HEADER_LEN..];

    match Opcode::try_from(header.opcode.get()) {
        Ok(Opcode::Data) => decode_block(header.block.get(), payload),
        Ok(Opcode::Error) => Ok(Decoded::ServerError {
            // The error code occupies the block-number slot of the header.
            code: header.block.get(),
            message: String::from_utf8_lossy(payload).into_owned(),
        }),
        _ => Err(CodecError::UnexpectedOpcode(header.opcode.get())),
    }
}

fn decode_block(block: u16, payload: &[u8]) -> Result<Decoded, CodecError> {
    let wire_len = payload.len();
    if wire_len > MAX_BLOCK_WIRE {
        return Err(CodecError::Oversized(wire_len));
    }
    if wire_len % 4 != 0 {
        return Err(CodecError::Misaligned(wire_len));
    }

    let Some(mut data) = fec::decode_payload(payload) else {
        return Ok(Decoded::Corrupt { block });
    };

    let last = wire_len < MAX_BLOCK_WIRE;
    if last && wire_len > 0 {
        trim_padding(&mut data);
    }

    Ok(Decoded::Block {
        block,
        wire_len,
        data: Bytes::from(data),
        last,
    })
}

/// Remove sender pad bytes from the final short block: at most the last four
/// bytes, stopping at the first non-zero byte. Never applied to full blocks,
/// whose trailing zero bytes are legitimate data.
fn trim_padding(data: &mut Vec<u8>) {
    let trim = data.iter().rev().take(4).take_while(|&&b| b == 0).count();
    data.truncate(data.len() - trim);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
