//! Extended-Hamming SEC-DED codec over 32-bit codewords.
//!
//! The sender transmits each 4-byte codeword with its bytes reversed and the
//! bits of every byte reversed — together, a full mirror of the 32-bit group.
//! [`mirror_codewords`] undoes that reordering (and, being an involution,
//! also applies it on the encode side).
//!
//! Bit-numbering convention, used consistently by every table in this module:
//! a codeword is loaded from its four un-mirrored payload bytes little-endian,
//! so codeword bit `q` (0..32) is bit `q % 8` of byte `q / 8`, counted from
//! the least-significant end. The Hamming position of bit `q` is `h = 32 - q`:
//! the five group parity bits sit at `h` ∈ {1, 2, 4, 8, 16} (q = 31, 30, 28,
//! 24, 16), the overall parity bit at `h = 32` (q = 0), and parity group `w`
//! covers every position `h` in 1..=31 with `h & w != 0`. The remaining 26
//! positions per codeword carry data, concatenated in ascending `q` order.

/// The five Hamming group weights. The syndrome is their weighted sum.
const PARITY_WEIGHTS: [u32; 5] = [1, 2, 4, 8, 16];

/// Data bits carried by one 32-bit codeword.
const DATA_BITS_PER_WORD: usize = 26;

/// Codeword bit positions that hold parity rather than data.
const fn is_parity_position(q: u32) -> bool {
    matches!(q, 0 | 16 | 24 | 28 | 30 | 31)
}

/// Bit mask of the codeword positions covered by parity group `weight`.
const fn group_mask(weight: u32) -> u32 {
    let mut mask = 0u32;
    let mut q = 1u32;
    while q < 32 {
        if (32 - q) & weight != 0 {
            mask |= 1 << q;
        }
        q += 1;
    }
    mask
}

const GROUP_MASKS: [u32; 5] = [
    group_mask(1),
    group_mask(2),
    group_mask(4),
    group_mask(8),
    group_mask(16),
];

// ── Bit reordering ────────────────────────────────────────────────────────────

/// Invert the sender's byte/bit reordering in place: reverse the four bytes
/// of every codeword group, then reverse the bits of every byte. The combined
/// transform mirrors the 32-bit group and is its own inverse.
///
/// Any trailing bytes beyond the last whole group are left untouched; callers
/// reject non-codeword-aligned payloads before getting here.
pub fn mirror_codewords(buf: &mut [u8]) {
    for group in buf.chunks_exact_mut(4) {
        group.reverse();
        for byte in group {
            *byte = byte.reverse_bits();
        }
    }
}

// ── SEC-DED per codeword ──────────────────────────────────────────────────────

/// Correct a single-bit error in one codeword, or detect a double-bit error.
///
/// Returns the corrected word, or `None` if the word carries two or more bit
/// errors and must be rejected. A clean syndrome with odd overall parity means
/// the overall parity bit itself flipped; that is a single-bit error and is
/// corrected like any other.
pub fn correct_word(mut word: u32) -> Option<u32> {
    let mut syndrome = 0u32;
    for (weight, mask) in PARITY_WEIGHTS.iter().zip(GROUP_MASKS) {
        if (word & mask).count_ones() % 2 == 1 {
            syndrome += weight;
        }
    }

    if syndrome != 0 {
        word ^= 1 << (32 - syndrome);
    } else if word.count_ones() % 2 == 1 {
        word ^= 1;
    }

    // Odd parity after correction: at least two bits are wrong.
    if word.count_ones() % 2 == 1 {
        return None;
    }
    Some(word)
}

// ── Payload decode ────────────────────────────────────────────────────────────

/// Undo the wire reordering, correct every codeword, and extract the data
/// bits. Returns `None` as soon as any codeword is uncorrectable; the rest of
/// the payload is not attempted. An empty payload decodes to empty data.
///
/// `payload` must be a whole number of codewords.
pub fn decode_payload(payload: &[u8]) -> Option<Vec<u8>> {
    debug_assert!(payload.len() % 4 == 0);

    let mut buf = payload.to_vec();
    mirror_codewords(&mut buf);

    for group in buf.chunks_exact_mut(4) {
        let word = u32::from_le_bytes([group[0], group[1], group[2], group[3]]);
        let corrected = correct_word(word)?;
        group.copy_from_slice(&corrected.to_le_bytes());
    }

    Some(extract_data(&buf))
}

/// Strip the six parity bits per codeword and pack the remaining data bits.
/// Output length is `len * 13 / 16` bytes; data bits past the last whole
/// output byte are dropped.
fn extract_data(corrected: &[u8]) -> Vec<u8> {
    let out_bits = corrected.len() * 13 / 16 * 8;
    let mut out = vec![0u8; out_bits / 8];
    let mut pos = 0usize;

    'words: for group in corrected.chunks_exact(4) {
        let word = u32::from_le_bytes([group[0], group[1], group[2], group[3]]);
        for q in 0..32 {
            if is_parity_position(q) {
                continue;
            }
            if pos >= out_bits {
                break 'words;
            }
            if word >> q & 1 == 1 {
                out[pos / 8] |= 1 << (pos % 8);
            }
            pos += 1;
        }
    }
    out
}

// ── Payload encode ────────────────────────────────────────────────────────────

/// The sender-side transform: pack `data` into codewords (zero-padding the
/// final one), set the Hamming and overall parity bits, and apply the wire
/// reordering. Used by tests and loopback servers; decoding the result yields
/// `data` plus at most three trailing zero pad bytes.
pub fn encode_payload(data: &[u8]) -> Vec<u8> {
    let total_bits = data.len() * 8;
    let words = total_bits.div_ceil(DATA_BITS_PER_WORD);
    let mut out = Vec::with_capacity(words * 4);
    let mut src = 0usize;

    for _ in 0..words {
        let mut word = 0u32;
        for q in 0..32 {
            if is_parity_position(q) {
                continue;
            }
            if src < total_bits && data[src / 8] >> (src % 8) & 1 == 1 {
                word |= 1 << q;
            }
            src += 1;
        }

        // Group parity bit h = weight belongs to exactly its own group, so
        // the five can be set independently.
        for (weight, mask) in PARITY_WEIGHTS.iter().zip(GROUP_MASKS) {
            if (word & mask).count_ones() % 2 == 1 {
                word ^= 1 << (32 - weight);
            }
        }
        if word.count_ones() % 2 == 1 {
            word ^= 1;
        }

        out.extend_from_slice(&word.to_le_bytes());
    }

    mirror_codewords(&mut out);
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
