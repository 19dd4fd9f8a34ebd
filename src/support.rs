//! Small byte and arithmetic helpers.

use crate::consts::NORMPOS_MAX;

/// Rounds `len` up to the next even number.
/// RIFF chunk data is padded to 16-bit boundaries.
pub(crate) fn pad_even(len: u64) -> u64 {
    (len + 1) & !1
}

/// Single-byte chars from `[u8; 4]`.
/// Maps 0-255 to `char`, exceeding ascii.
pub(crate) fn chars_from_bytes(bytes: [u8; 4]) -> [char; 4] {
    [
        bytes[0] as char,
        bytes[1] as char,
        bytes[2] as char,
        bytes[3] as char,
    ]
}

/// String from a FourCC stored as `[u8; 4]`.
pub(crate) fn string_from_fourcc(bytes: [u8; 4], ignore_null: bool) -> String {
    match ignore_null {
        true => bytes.iter()
            .filter_map(|b| if b == &0 {None} else {Some(*b as char)})
            .collect(),
        false => chars_from_bytes(bytes).iter().collect(),
    }
}

/// Case-insensitive FourCC comparison.
pub(crate) fn fourcc_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() >= 4 && b.len() >= 4 && a[..4].eq_ignore_ascii_case(&b[..4])
}

/// Little endian `u32` at `pos`, if in bounds.
pub(crate) fn le_u32(bytes: &[u8], pos: usize) -> Option<u32> {
    let b = bytes.get(pos .. pos + 4)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Scales `pos` of `total` to `0..=65535`.
/// Returns 0 for unknown totals.
pub(crate) fn normalize_position(pos: u64, total: u64) -> u16 {
    if total == 0 {
        return 0
    }
    let norm = (pos as u128 * NORMPOS_MAX as u128) / total as u128;
    norm.min(NORMPOS_MAX as u128) as u16
}

/// Copies `bytes` into a buffer at least `min` bytes long,
/// zero filling the tail, so that fixed layout structures
/// can be read from short chunks.
pub(crate) fn zero_padded(bytes: &[u8], min: usize) -> Vec<u8> {
    let mut buf = bytes.to_vec();
    if buf.len() < min {
        buf.resize(min, 0);
    }
    buf
}
