//! Byte-order conversion for SELAFIN payloads.
//!
//! All scalars are stored big-endian. Record payloads are decoded in bulk with
//! `byteorder`; the scalar helpers convert single values that were read raw
//! (native interpretation of the on-disk bytes).

use byteorder::{BigEndian, ByteOrder};

/// Converts a raw big-endian `u32` to host order.
///
/// A byte swap on little-endian hosts and the identity on big-endian ones,
/// so applying it twice always restores the original bit pattern.
pub fn be_to_native_u32(raw: u32) -> u32 {
    u32::from_be(raw)
}

/// Converts a raw big-endian `f32` to host order, preserving the bit pattern.
pub fn be_to_native_f32(raw: f32) -> f32 {
    f32::from_bits(u32::from_be(raw.to_bits()))
}

/// Decodes a payload of big-endian `u32` values.
///
/// Any trailing bytes that do not form a whole value are ignored.
pub fn decode_u32s(payload: &[u8]) -> Vec<u32> {
    let whole = payload.len() / 4 * 4;
    let mut out = vec![0u32; whole / 4];
    BigEndian::read_u32_into(&payload[..whole], &mut out);
    out
}

/// Decodes a payload of big-endian `f32` values.
///
/// Any trailing bytes that do not form a whole value are ignored.
pub fn decode_f32s(payload: &[u8]) -> Vec<f32> {
    let whole = payload.len() / 4 * 4;
    let mut out = vec![0f32; whole / 4];
    BigEndian::read_f32_into(&payload[..whole], &mut out);
    out
}
