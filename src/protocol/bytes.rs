//! Binary codec primitives
//!
//! Conversions between typed values and the byte layouts used on the wire.
//! Every integer is big-endian. None of these functions know which field
//! they are working on; failures are reported as a [`FieldFault`] and the
//! message layer attaches the field name and byte range.

use std::fmt::Write as _;
use std::ops::Range;

use thiserror::Error;
use uuid::Uuid;

/// Size of a packed UUID
pub const UUID_SIZE: usize = 16;

/// Maximum number of length bytes after a long-form BER prefix (lengths are u32)
pub const MAX_BER_LENGTH_BYTES: usize = 4;

/// Why a byte range or a value could not be converted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldFault {
    #[error("expected {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("unsupported integer width {0}")]
    UnsupportedWidth(usize),

    #[error("integer of {0} bytes does not fit in 64 bits")]
    TooWide(usize),

    #[error("value {value} does not fit in {width} bytes")]
    OutOfRange { value: u64, width: usize },

    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("invalid UUID {0}")]
    InvalidUuid(String),

    #[error("{0}")]
    InvalidBer(String),

    #[error("record stride {stride} is below the {needed} bytes a record needs")]
    StrideTooSmall { stride: usize, needed: usize },

    #[error("expected {expected}, got {found}")]
    WrongType {
        expected: &'static str,
        found: String,
    },
}

/// Result of a primitive conversion
pub type FieldResult<T> = std::result::Result<T, FieldFault>;

// =============================================================================
// Integers
// =============================================================================

fn check_width(width: usize) -> FieldResult<()> {
    match width {
        1 | 2 | 4 | 8 => Ok(()),
        other => Err(FieldFault::UnsupportedWidth(other)),
    }
}

/// Pack an unsigned integer into exactly `width` big-endian bytes
pub fn int_to_bytes(value: u64, width: usize) -> FieldResult<Vec<u8>> {
    check_width(width)?;
    if width < 8 && value >> (width * 8) != 0 {
        return Err(FieldFault::OutOfRange { value, width });
    }
    Ok(value.to_be_bytes()[8 - width..].to_vec())
}

/// Unpack exactly `width` big-endian bytes
pub fn bytes_to_int(bytes: &[u8], width: usize) -> FieldResult<u64> {
    check_width(width)?;
    if bytes.len() != width {
        return Err(FieldFault::WrongLength {
            expected: width,
            actual: bytes.len(),
        });
    }
    be_bytes_to_u64(bytes)
}

/// Unpack a big-endian integer of any length up to 8 bytes.
///
/// The empty slice is 0.
pub fn be_bytes_to_u64(bytes: &[u8]) -> FieldResult<u64> {
    if bytes.len() > 8 {
        return Err(FieldFault::TooWide(bytes.len()));
    }
    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

/// Unpack a run of little-endian integers of `width` bytes each.
///
/// A few list replies (schedule ids, ingest event ids) use host byte order.
pub fn bytes_to_le_int_list(bytes: &[u8], width: usize) -> FieldResult<Vec<u64>> {
    check_width(width)?;
    if bytes.len() % width != 0 {
        return Err(FieldFault::WrongLength {
            expected: (bytes.len() / width + 1) * width,
            actual: bytes.len(),
        });
    }

    Ok(bytes
        .chunks_exact(width)
        .map(|chunk| chunk.iter().rev().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
        .collect())
}

// =============================================================================
// BER definite lengths
// =============================================================================

/// Encode a BER definite-form length
///
/// Short form (one byte) below 128, otherwise `0x80 | n` followed by the
/// `n` significant big-endian bytes of the length.
pub fn ber_encode(length: u32) -> Vec<u8> {
    if length < 0x80 {
        return vec![length as u8];
    }

    let bytes = length.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let significant = &bytes[skip..];

    let mut out = Vec::with_capacity(1 + significant.len());
    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
    out
}

/// Number of length bytes that follow the first BER byte
pub fn ber_extension_len(first: u8) -> FieldResult<usize> {
    if first & 0x80 == 0 {
        return Ok(0);
    }

    let count = usize::from(first & 0x7F);
    if count == 0 {
        return Err(FieldFault::InvalidBer(
            "indefinite length form is not allowed".to_string(),
        ));
    }
    if count > MAX_BER_LENGTH_BYTES {
        return Err(FieldFault::InvalidBer(format!(
            "{} length bytes exceed the 32-bit limit",
            count
        )));
    }
    Ok(count)
}

/// Decode a BER length, returning it with the number of bytes consumed
pub fn ber_decode(bytes: &[u8]) -> FieldResult<(u32, usize)> {
    let first = *bytes
        .first()
        .ok_or_else(|| FieldFault::InvalidBer("empty length field".to_string()))?;

    let extra = ber_extension_len(first)?;
    if extra == 0 {
        return Ok((u32::from(first), 1));
    }

    let tail = bytes.get(1..1 + extra).ok_or(FieldFault::WrongLength {
        expected: 1 + extra,
        actual: bytes.len(),
    })?;
    // extra <= 4, so the value always fits
    let length = be_bytes_to_u64(tail)? as u32;
    Ok((length, 1 + extra))
}

// =============================================================================
// UUIDs
// =============================================================================

/// Parse a textual UUID into its 16 raw bytes
pub fn uuid_to_bytes(text: &str) -> FieldResult<[u8; UUID_SIZE]> {
    Uuid::try_parse(text.trim())
        .map(|uuid| *uuid.as_bytes())
        .map_err(|e| FieldFault::InvalidUuid(format!("{:?}: {}", text, e)))
}

/// Unpack 16 raw bytes into a UUID
pub fn bytes_to_uuid(bytes: &[u8]) -> FieldResult<Uuid> {
    Uuid::from_slice(bytes).map_err(|_| FieldFault::WrongLength {
        expected: UUID_SIZE,
        actual: bytes.len(),
    })
}

/// Unpack a run of concatenated 16-byte UUIDs
pub fn bytes_to_uuid_list(bytes: &[u8]) -> FieldResult<Vec<Uuid>> {
    if bytes.len() % UUID_SIZE != 0 {
        return Err(FieldFault::WrongLength {
            expected: (bytes.len() / UUID_SIZE + 1) * UUID_SIZE,
            actual: bytes.len(),
        });
    }

    bytes.chunks_exact(UUID_SIZE).map(bytes_to_uuid).collect()
}

// =============================================================================
// Text and booleans
// =============================================================================

/// Encode text as UTF-8, zero-padded or truncated to `size` bytes when given
pub fn text_to_bytes(text: &str, size: Option<usize>) -> Vec<u8> {
    let mut out = text.as_bytes().to_vec();
    if let Some(size) = size {
        out.resize(size, 0);
    }
    out
}

/// Decode null-terminated UTF-8 text; anything after the first zero byte is padding
pub fn bytes_to_text(bytes: &[u8]) -> FieldResult<String> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    std::str::from_utf8(&bytes[..end])
        .map(str::to_owned)
        .map_err(|e| FieldFault::InvalidUtf8(e.to_string()))
}

/// Encode a boolean as a single byte
pub fn bool_to_bytes(value: bool) -> [u8; 1] {
    [u8::from(value)]
}

/// Decode a single-byte boolean (any non-zero byte is true)
pub fn bytes_to_bool(bytes: &[u8]) -> FieldResult<bool> {
    match bytes {
        [b] => Ok(*b != 0),
        _ => Err(FieldFault::WrongLength {
            expected: 1,
            actual: bytes.len(),
        }),
    }
}

// =============================================================================
// Signed-offset slicing
// =============================================================================

/// Resolve `[start:end]` against a buffer of `len` bytes.
///
/// Negative offsets count back from the end, `None` for `end` means the end
/// of the buffer, out-of-range offsets clamp, and an inverted range is empty.
pub fn slice_range(len: usize, start: isize, end: Option<isize>) -> Range<usize> {
    let resolve = |index: isize| -> usize {
        if index < 0 {
            len.saturating_sub(index.unsigned_abs())
        } else {
            index.unsigned_abs().min(len)
        }
    };

    let start = resolve(start);
    let end = end.map_or(len, resolve);
    start..end.max(start)
}

/// Sub-slice of `buf` per [`slice_range`]
pub fn slice(buf: &[u8], start: isize, end: Option<isize>) -> &[u8] {
    &buf[slice_range(buf.len(), start, end)]
}

/// Lower-case hex rendering
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}
