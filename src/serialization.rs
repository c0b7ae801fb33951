//! Compact binary encoding of an [`RTree`].
//!
//! The encoding is a protocol buffers message:
//!
//! ```text
//! message RTree {
//!   uint64 count = 1;
//!   repeated int64 refs = 2;    // packed
//!   repeated sint64 boxes = 3;  // packed, quantized coordinates
//!   uint32 precision = 4;       // decimal digits kept per coordinate
//! }
//! ```
//!
//! Coordinates are quantized as `round(c * 10^precision)` and restored by
//! dividing by the same scale. An empty byte slice decodes to the empty index.

use bytes::{Buf, BufMut};

use crate::error::{Error, Result};
use crate::rtree::RTree;

/// Largest supported number of decimal digits per coordinate
pub const MAX_PRECISION: u32 = 15;

const FIELD_COUNT: u64 = 1;
const FIELD_REFS: u64 = 2;
const FIELD_BOXES: u64 = 3;
const FIELD_PRECISION: u64 = 4;

const WIRE_VARINT: u8 = 0;
const WIRE_I64: u8 = 1;
const WIRE_LEN: u8 = 2;
const WIRE_I32: u8 = 5;

/// Encodes `tree`, keeping `precision` decimal digits of every coordinate.
///
/// # Errors
/// Returns [`Error::InvalidPrecision`] if `precision` exceeds [`MAX_PRECISION`],
/// and [`Error::CoordinateOutOfRange`] if a coordinate scaled by
/// `10^precision` does not fit in an `i64` (this includes infinite boxes).
///
/// # Example
/// ```
/// use flatrtree::prelude::*;
/// let mut builder = HilbertBuilder::new();
/// builder.add(1, 0.5, 0.5, 1.25, 1.25)?;
/// let tree = builder.finish(DEFAULT_DEGREE)?;
///
/// let bytes = serialize(&tree, 5)?;
/// assert_eq!(deserialize(&bytes)?, tree);
/// # Ok::<(), flatrtree::Error>(())
/// ```
pub fn serialize(tree: &RTree, precision: u32) -> Result<Vec<u8>> {
    if precision > MAX_PRECISION {
        return Err(Error::InvalidPrecision(precision));
    }
    let scale = scale(precision);

    let mut refs = Vec::with_capacity(tree.refs.len() * 2);
    for &r in &tree.refs {
        put_varint(&mut refs, r as u64);
    }
    let mut boxes = Vec::with_capacity(tree.boxes.len() * 4);
    for &c in &tree.boxes {
        put_varint(&mut boxes, zigzag_encode(quantize(c, scale, precision)?));
    }

    let mut buf = Vec::with_capacity(refs.len() + boxes.len() + 24);
    if tree.count != 0 {
        put_key(&mut buf, FIELD_COUNT, WIRE_VARINT);
        put_varint(&mut buf, tree.count as u64);
    }
    put_packed(&mut buf, FIELD_REFS, &refs);
    put_packed(&mut buf, FIELD_BOXES, &boxes);
    if precision != 0 {
        put_key(&mut buf, FIELD_PRECISION, WIRE_VARINT);
        put_varint(&mut buf, u64::from(precision));
    }

    log::debug!(
        "serialized {} items ({} nodes) at precision {} into {} bytes",
        tree.count,
        tree.node_count(),
        precision,
        buf.len()
    );
    Ok(buf)
}

/// Decodes an index written by [`serialize`].
///
/// # Errors
/// Returns [`Error::Decode`] for truncated or malformed input, or input that
/// does not describe a valid flat index. An empty slice is not an error.
pub fn deserialize(data: &[u8]) -> Result<RTree> {
    let mut buf = data;
    let mut count = 0u64;
    let mut refs: Vec<i64> = Vec::new();
    let mut quantized: Vec<i64> = Vec::new();
    let mut precision = 0u64;

    while buf.has_remaining() {
        let key = get_varint(&mut buf)?;
        let field = key >> 3;
        let wire = (key & 0x7) as u8;
        match (field, wire) {
            (0, _) => return Err(decode_error("field number 0")),
            (FIELD_COUNT, WIRE_VARINT) => count = get_varint(&mut buf)?,
            (FIELD_REFS, WIRE_VARINT) => refs.push(get_varint(&mut buf)? as i64),
            (FIELD_REFS, WIRE_LEN) => {
                let mut packed = take_len(&mut buf)?;
                while packed.has_remaining() {
                    refs.push(get_varint(&mut packed)? as i64);
                }
            }
            (FIELD_BOXES, WIRE_VARINT) => quantized.push(zigzag_decode(get_varint(&mut buf)?)),
            (FIELD_BOXES, WIRE_LEN) => {
                let mut packed = take_len(&mut buf)?;
                while packed.has_remaining() {
                    quantized.push(zigzag_decode(get_varint(&mut packed)?));
                }
            }
            (FIELD_PRECISION, WIRE_VARINT) => precision = get_varint(&mut buf)?,
            (FIELD_COUNT..=FIELD_PRECISION, _) => {
                return Err(decode_error(&format!("field {field} has unexpected wire type {wire}")));
            }
            _ => skip_field(&mut buf, wire)?,
        }
    }

    let precision = u32::try_from(precision)
        .ok()
        .filter(|&p| p <= MAX_PRECISION)
        .ok_or_else(|| decode_error(&format!("precision {precision} out of range")))?;
    let count = usize::try_from(count).map_err(|_| decode_error(&format!("count {count} out of range")))?;

    let scale = scale(precision);
    let boxes: Vec<f64> = quantized.into_iter().map(|q| q as f64 / scale).collect();

    let tree = RTree::from_parts(count, refs, boxes).map_err(|e| decode_error(&e.to_string()))?;
    log::debug!(
        "deserialized {} items ({} nodes) at precision {} from {} bytes",
        tree.count,
        tree.node_count(),
        precision,
        data.len()
    );
    Ok(tree)
}

fn scale(precision: u32) -> f64 {
    10f64.powi(precision as i32)
}

/// Scales and rounds a coordinate to its fixed-point integer
fn quantize(c: f64, scale: f64, precision: u32) -> Result<i64> {
    let q = (c * scale).round();
    // [-2^63, 2^63) is exactly the range that casts to i64 without saturating
    if !(i64::MIN as f64..i64::MAX as f64).contains(&q) {
        return Err(Error::CoordinateOutOfRange { value: c, precision });
    }
    Ok(q as i64)
}

fn decode_error(message: &str) -> Error {
    Error::Decode(message.to_owned())
}

fn zigzag_encode(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

fn zigzag_decode(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

fn put_key(buf: &mut impl BufMut, field: u64, wire: u8) {
    put_varint(buf, (field << 3) | u64::from(wire));
}

fn put_varint(buf: &mut impl BufMut, mut v: u64) {
    while v >= 0x80 {
        buf.put_u8((v as u8 & 0x7F) | 0x80);
        v >>= 7;
    }
    buf.put_u8(v as u8);
}

/// Writes a length-delimited field, skipped entirely when `payload` is empty
fn put_packed(buf: &mut impl BufMut, field: u64, payload: &[u8]) {
    if payload.is_empty() {
        return;
    }
    put_key(buf, field, WIRE_LEN);
    put_varint(buf, payload.len() as u64);
    buf.put_slice(payload);
}

fn get_varint(buf: &mut &[u8]) -> Result<u64> {
    let mut value = 0u64;
    for i in 0..10 {
        if !buf.has_remaining() {
            return Err(decode_error("truncated varint"));
        }
        let byte = buf.get_u8();
        // The tenth byte may only carry the top bit of a u64
        if i == 9 && byte > 1 {
            return Err(decode_error("varint overflows 64 bits"));
        }
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(decode_error("varint longer than 10 bytes"))
}

/// Splits off the payload of a length-delimited field
fn take_len<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8]> {
    let len = get_varint(buf)?;
    let len = usize::try_from(len)
        .ok()
        .filter(|&len| len <= buf.remaining())
        .ok_or_else(|| decode_error(&format!("length {len} exceeds remaining {} bytes", buf.remaining())))?;
    let whole: &'a [u8] = *buf;
    let (payload, rest) = whole.split_at(len);
    *buf = rest;
    Ok(payload)
}

fn skip_field(buf: &mut &[u8], wire: u8) -> Result<()> {
    let width = match wire {
        WIRE_VARINT => return get_varint(buf).map(|_| ()),
        WIRE_LEN => return take_len(buf).map(|_| ()),
        WIRE_I64 => 8,
        WIRE_I32 => 4,
        _ => return Err(decode_error(&format!("unsupported wire type {wire}"))),
    };
    if buf.remaining() < width {
        return Err(decode_error("truncated fixed-width field"));
    }
    buf.advance(width);
    Ok(())
}
