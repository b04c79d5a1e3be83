//! Binary Codec Tests
//!
//! Laws for BER lengths, signed-offset slicing, and padded text.

use dcpctl::protocol::bytes::{
    ber_decode, ber_encode, bytes_to_int, bytes_to_text, bytes_to_uuid_list, int_to_bytes,
    slice, slice_range, text_to_bytes, uuid_to_bytes, FieldFault,
};
use proptest::prelude::*;

/// Reference normalization of a `[start:end]` slice over `len` bytes
fn reference_range(len: usize, start: isize, end: Option<isize>) -> (usize, usize) {
    let len = len as isize;
    let norm = |i: isize| -> isize {
        let i = if i < 0 { i + len } else { i };
        i.clamp(0, len)
    };
    let s = norm(start);
    let e = end.map_or(len, norm);
    (s as usize, e.max(s) as usize)
}

// =============================================================================
// BER Length Tests
// =============================================================================

#[test]
fn test_ber_boundaries() {
    assert_eq!(ber_encode(127), vec![0x7F]);
    assert_eq!(ber_encode(128), vec![0x81, 0x80]);
    assert_eq!(ber_encode(256), vec![0x82, 0x01, 0x00]);
    assert_eq!(ber_decode(&[0x82, 0x01, 0x00]).unwrap(), (256, 3));
}

#[test]
fn test_ber_rejects_indefinite_and_oversized() {
    assert!(matches!(ber_decode(&[0x80]), Err(FieldFault::InvalidBer(_))));
    assert!(matches!(
        ber_decode(&[0x85, 1, 2, 3, 4, 5]),
        Err(FieldFault::InvalidBer(_))
    ));
    assert!(ber_decode(&[]).is_err());
}

#[test]
fn test_ber_ignores_trailing_bytes() {
    assert_eq!(ber_decode(&[0x04, 0xAA, 0xBB]).unwrap(), (4, 1));
}

proptest! {
    #[test]
    fn test_ber_round_trip(n in 0u32..=10_000_000) {
        let encoded = ber_encode(n);
        prop_assert_eq!(ber_decode(&encoded).unwrap(), (n, encoded.len()));
        prop_assert_eq!(encoded.len() == 1, n < 128);
    }

    #[test]
    fn test_slice_matches_reference(
        len in prop::sample::select(vec![0usize, 1, 100]),
        start in -150isize..150,
        end in prop::option::of(-150isize..150),
    ) {
        let (s, e) = reference_range(len, start, end);
        prop_assert_eq!(slice_range(len, start, end), s..e);

        let buf: Vec<u8> = (0..len).map(|i| i as u8).collect();
        prop_assert_eq!(slice(&buf, start, end), &buf[s..e]);
    }
}

// =============================================================================
// Integer Tests
// =============================================================================

#[test]
fn test_int_out_of_range() {
    assert_eq!(
        int_to_bytes(256, 1),
        Err(FieldFault::OutOfRange { value: 256, width: 1 })
    );
    assert_eq!(int_to_bytes(u64::MAX, 8).unwrap(), vec![0xFF; 8]);
    assert_eq!(int_to_bytes(1, 3), Err(FieldFault::UnsupportedWidth(3)));
}

#[test]
fn test_int_wrong_length() {
    assert_eq!(
        bytes_to_int(&[0, 1, 2], 4),
        Err(FieldFault::WrongLength { expected: 4, actual: 3 })
    );
}

// =============================================================================
// Text and UUID Tests
// =============================================================================

#[test]
fn test_text_padding_round_trip() {
    let padded = text_to_bytes("Feature", Some(16));
    assert_eq!(padded.len(), 16);
    assert_eq!(&padded[7..], &[0u8; 9]);
    assert_eq!(bytes_to_text(&padded).unwrap(), "Feature");
}

proptest! {
    #[test]
    fn test_text_padding_law(text in "[^\\x00]{0,16}", extra in 1usize..16) {
        let size = text.len() + extra;
        let padded = text_to_bytes(&text, Some(size));
        prop_assert_eq!(padded.len(), size);
        prop_assert!(padded[text.len()..].iter().all(|&b| b == 0));
        prop_assert_eq!(bytes_to_text(&padded).unwrap(), text);
    }
}

#[test]
fn test_text_truncates_to_size() {
    let truncated = text_to_bytes("2024-01-01T00:00:00", Some(4));
    assert_eq!(truncated, b"2024".to_vec());
    assert_eq!(text_to_bytes("free", None), b"free".to_vec());
}

#[test]
fn test_text_rejects_invalid_utf8() {
    assert!(matches!(
        bytes_to_text(&[0xFF, 0xFE]),
        Err(FieldFault::InvalidUtf8(_))
    ));
}

#[test]
fn test_uuid_list_requires_whole_items() {
    let one = uuid_to_bytes("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
    let mut two = one.to_vec();
    two.extend_from_slice(&one);
    assert_eq!(bytes_to_uuid_list(&two).unwrap().len(), 2);
    assert!(bytes_to_uuid_list(&two[..20]).is_err());
    assert!(bytes_to_uuid_list(&[]).unwrap().is_empty());
}

#[test]
fn test_uuid_rejects_garbage() {
    assert!(matches!(
        uuid_to_bytes("not-a-uuid"),
        Err(FieldFault::InvalidUuid(_))
    ));
}
