//! Codec Tests
//!
//! Request frame assembly and response frame parsing.

use dcpctl::protocol::codec::{
    construct_with, decode_response, encode_frame, parse_response, RequestIdSequence, HEADER,
    REQUEST_ID_MODULUS,
};
use dcpctl::protocol::message::{decode_elements, Encoding};
use dcpctl::protocol::CommandKey;
use dcpctl::{Args, Catalog, DcpError, ProtocolError, Value};
use uuid::Uuid;

const CPL: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

fn frame(key: [u8; 3], id: u32, payload: &[u8]) -> Vec<u8> {
    encode_frame(CommandKey::new(key), id, payload).unwrap().to_vec()
}

// =============================================================================
// Request Construction Tests
// =============================================================================

#[test]
fn test_get_cpl_list_request_frame() {
    let catalog = Catalog::builtin().unwrap();
    let ids = RequestIdSequence::starting_at(42);
    let def = catalog.requests.resolve("GetCPLList").unwrap();

    let frame = construct_with(def, &Args::new(), &ids).unwrap();

    let mut expected = HEADER.to_vec();
    expected.extend_from_slice(&[0x01, 0x01, 0x00, 0x04, 0x00, 0x00, 0x00, 42]);
    assert_eq!(frame.as_bytes(), &expected[..]);
    assert_eq!(frame.request_id, 42);
    assert!(frame.payload().is_empty());
}

#[test]
fn test_request_ids_wrap() {
    let catalog = Catalog::builtin().unwrap();
    let ids = RequestIdSequence::new();
    let def = catalog.requests.resolve("GetCPLList").unwrap();

    let mut seen_max = 0;
    for expected in 0..REQUEST_ID_MODULUS {
        let frame = construct_with(def, &Args::new(), &ids).unwrap();
        assert_eq!(frame.request_id, expected);
        seen_max = seen_max.max(frame.request_id);
    }
    assert_eq!(seen_max, REQUEST_ID_MODULUS - 1);

    let wrapped = construct_with(def, &Args::new(), &ids).unwrap();
    assert_eq!(wrapped.request_id, 0);
}

#[test]
fn test_parameter_error_consumes_no_id() {
    let catalog = Catalog::builtin().unwrap();
    let ids = RequestIdSequence::new();
    let def = catalog.requests.resolve("GetCPLInfo").unwrap();

    let err = construct_with(def, &Args::new().arg("nope"), &ids).unwrap_err();
    assert!(matches!(err, DcpError::Parameter { ref field, .. } if field == "uuid"));
    assert_eq!(ids.peek(), 0);

    let frame = construct_with(def, &Args::new().arg(CPL), &ids).unwrap();
    assert_eq!(frame.request_id, 0);
    assert_eq!(frame.payload(), Uuid::parse_str(CPL).unwrap().as_bytes());
}

#[test]
fn test_named_arguments_bind_by_field() {
    let catalog = Catalog::builtin().unwrap();
    let ids = RequestIdSequence::new();
    let def = catalog.requests.resolve("GetTimeUTC").unwrap();

    let frame = construct_with(def, &Args::new().named("clock_id", 1u32), &ids).unwrap();
    assert_eq!(frame.payload(), &[0x01]);

    let err = construct_with(def, &Args::new().named("clock", 1u32), &ids).unwrap_err();
    assert!(matches!(err, DcpError::Parameter { .. }));
}

#[test]
fn test_get_time_utc_defaults_clock_id() {
    let catalog = Catalog::builtin().unwrap();
    let ids = RequestIdSequence::new();
    let def = catalog.requests.resolve("GetTimeUTC").unwrap();

    let frame = construct_with(def, &Args::new(), &ids).unwrap();
    assert_eq!(frame.payload(), &[0x01]);
    assert_eq!(&frame.as_bytes()[13..16], &[0x05, 0x07, 0x00]);
}

/// Every fixed-width request decodes back to its arguments through its own layout
#[test]
fn test_fixed_width_requests_mirror_their_layout() {
    let catalog = Catalog::builtin().unwrap();
    let ids = RequestIdSequence::new();
    let uuid = Uuid::parse_str(CPL).unwrap();
    let mut checked = 0;

    for def in catalog.requests.iter() {
        let Some(layout) = def.mirror_layout() else {
            continue;
        };

        let samples: Vec<Value> = def
            .fields
            .iter()
            .map(|field| match field.encoding {
                Encoding::Int { .. } => Value::Int(1),
                Encoding::Uuid => Value::Uuid(uuid),
                Encoding::Text { .. } => Value::Text("x".into()),
                Encoding::Bool => Value::Bool(true),
                Encoding::CString | Encoding::Ipv4 => unreachable!(),
            })
            .collect();

        let args: Args = samples.iter().cloned().collect();
        let frame = construct_with(def, &args, &ids).unwrap();
        let record = decode_elements(&def.name, &layout, frame.payload(), 0).unwrap();

        let decoded: Vec<Value> = record.into_values().collect();
        assert_eq!(decoded, samples, "{}", def.name);
        checked += 1;
    }

    assert!(checked > 10);
}

// =============================================================================
// Response Parsing Tests
// =============================================================================

#[test]
fn test_get_cpl_list_response() {
    let catalog = Catalog::builtin().unwrap();
    let uuid = Uuid::parse_str(CPL).unwrap();

    let mut payload = vec![0, 0, 0, 1, 0, 0, 0, 16];
    payload.extend_from_slice(uuid.as_bytes());
    payload.push(0);

    let response = decode_response(&catalog.responses, &frame([0x01, 0x02, 0x00], 7, &payload))
        .unwrap();

    assert_eq!(response.command, "GetCPLList");
    assert_eq!(response.request_id, 7);
    assert_eq!(response.get("amount"), Some(&Value::Int(1)));
    assert_eq!(response.get("item_length"), Some(&Value::Int(16)));
    assert_eq!(response.get("list"), Some(&Value::UuidList(vec![uuid])));
    assert!(response.is_success());
}

#[test]
fn test_long_form_length_response() {
    let catalog = Catalog::builtin().unwrap();
    let mut payload = b"<CompositionPlaylist/>".repeat(10);
    payload.push(0);
    payload.push(3);

    let bytes = frame([0x01, 0x08, 0x00], 1, &payload);
    assert_eq!(bytes[16], 0x81);

    let response = decode_response(&catalog.responses, &bytes).unwrap();
    assert_eq!(response.command, "RetrieveCPL");
    assert_eq!(response.status().code(), 3);
}

#[test]
fn test_unknown_response_key() {
    let catalog = Catalog::builtin().unwrap();
    let err = decode_response(&catalog.responses, &frame([0x7F, 0x7F, 0x7F], 1, &[0])).unwrap_err();

    let DcpError::Protocol(e) = err else {
        panic!("Expected protocol error");
    };
    assert_eq!(e, ProtocolError::UnknownResponseKey("7f7f7f".to_string()));
    assert!(!e.is_desynchronizing());
}

#[test]
fn test_empty_payload_has_no_status() {
    let catalog = Catalog::builtin().unwrap();
    let err = decode_response(&catalog.responses, &frame([0x03, 0x0C, 0x00], 1, &[])).unwrap_err();
    assert!(matches!(
        err,
        DcpError::Protocol(ProtocolError::MissingStatusByte(_))
    ));
}

#[test]
fn test_parse_reads_exactly_one_frame() {
    let catalog = Catalog::builtin().unwrap();
    let mut stream = frame([0x03, 0x0C, 0x00], 1, &[0]);
    stream.extend(frame([0x03, 0x0C, 0x00], 2, &[4]));

    let mut pos = 0;
    let mut read = |n: usize| {
        let chunk = stream[pos..pos + n].to_vec();
        pos += n;
        Ok::<_, DcpError>(chunk)
    };

    let first = parse_response(&catalog.responses, &mut read).unwrap();
    let second = parse_response(&catalog.responses, &mut read).unwrap();
    assert_eq!((first.request_id, first.status().code()), (1, 0));
    assert_eq!((second.request_id, second.status().code()), (2, 4));
}

#[test]
fn test_corrupt_header_is_rejected() {
    let catalog = Catalog::builtin().unwrap();
    let mut bytes = frame([0x03, 0x0C, 0x00], 1, &[0]);
    bytes[0] = 0x07;

    let err = decode_response(&catalog.responses, &bytes).unwrap_err();
    assert!(matches!(
        err,
        DcpError::Protocol(ProtocolError::HeaderMismatch(_))
    ));
    assert!(err.is_connection_fatal());
}

#[test]
fn test_truncated_frame() {
    let catalog = Catalog::builtin().unwrap();
    let bytes = frame([0x01, 0x02, 0x00], 1, &[0, 0, 0, 0, 0, 0, 0, 16, 0]);

    let err = decode_response(&catalog.responses, &bytes[..bytes.len() - 3]).unwrap_err();
    assert!(matches!(
        err,
        DcpError::Protocol(ProtocolError::Truncated { .. })
    ));
}
