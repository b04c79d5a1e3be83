//! Catalog Tests
//!
//! Lookups over the built-in command tables and end-to-end decoding of
//! representative replies.

use dcpctl::protocol::catalog::{request_definitions, response_definitions};
use dcpctl::protocol::codec::{construct_with, decode_response, encode_frame, RequestIdSequence};
use dcpctl::protocol::{CommandKey, Lookup, RequestRegistry, ResponseDefinition};
use dcpctl::{Args, Catalog, DcpError, Value};

fn decode(name: &str, payload: &[u8]) -> dcpctl::Response {
    let catalog = Catalog::builtin().unwrap();
    let key = catalog.responses.resolve(name).unwrap().key;
    let frame = encode_frame(key, 5, payload).unwrap();
    decode_response(&catalog.responses, &frame).unwrap()
}

// =============================================================================
// Registry Tests
// =============================================================================

#[test]
fn test_lookup_by_name_and_key() {
    let catalog = Catalog::builtin().unwrap();

    let by_name = catalog.requests.resolve("GetCPLInfo").unwrap();
    let by_key = catalog
        .requests
        .resolve(Lookup::Key(CommandKey::new([0x01, 0x03, 0x00])))
        .unwrap();
    assert_eq!(by_name.name, by_key.name);

    let response = catalog.responses.get_by_key(&"010400".parse().unwrap()).unwrap();
    assert_eq!(response.name, "GetCPLInfo");
}

#[test]
fn test_unknown_name_is_configuration_error() {
    let catalog = Catalog::builtin().unwrap();
    let err = catalog.requests.resolve("GetCplList").unwrap_err();
    assert!(matches!(err, DcpError::Configuration(_)));
}

#[test]
fn test_names_are_sorted_and_paired() {
    let catalog = Catalog::builtin().unwrap();
    let names: Vec<&str> = catalog.requests.list_names().into_iter().collect();

    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
    assert!(names.contains(&"GetCPLList"));
    assert!(names.contains(&"TerminateTLS"));

    for name in names {
        assert!(catalog.responses.get_by_name(name).is_some(), "{}", name);
    }
}

#[test]
fn test_tables_have_unique_keys() {
    assert_eq!(
        RequestRegistry::new(request_definitions()).unwrap().len(),
        request_definitions().len()
    );

    let mut duplicated = response_definitions();
    let first: ResponseDefinition = duplicated[0].clone();
    duplicated.push(ResponseDefinition::new("Shadow", first.key, first.fields));
    assert!(matches!(
        dcpctl::protocol::ResponseRegistry::new(duplicated),
        Err(DcpError::Configuration(_))
    ));
}

// =============================================================================
// Reply Decoding Tests
// =============================================================================

#[test]
fn test_cpl_info_content_kind() {
    let mut payload = vec![0u8; 176];
    payload[16] = 1;
    payload[17..24].copy_from_slice(b"Trailer");
    payload[145] = 128;
    payload.push(0);

    let response = decode("GetCPLInfo", &payload);
    assert_eq!(response.get("storage_text"), Some(&Value::Text("local".into())));
    assert_eq!(response.get("content_title_text"), Some(&Value::Text("Trailer".into())));
    assert_eq!(response.get("content_kind_text"), Some(&Value::Text("Live CPL".into())));

    payload[145] = 200;
    let response = decode("GetCPLInfo", &payload);
    assert_eq!(response.get("content_kind"), Some(&Value::Int(200)));
    assert_eq!(
        response.get("content_kind_text"),
        Some(&Value::Text("unknown value".into()))
    );
}

#[test]
fn test_cpl_info2_tail_fields() {
    // head, one crypto key, then the 54-byte tail before the status byte
    let mut payload = vec![0u8; 176 + 16 + 54];
    let tail = payload.len() - 54;
    payload[tail + 2] = 1; // complete
    payload[tail + 10..tail + 14].copy_from_slice(&24u32.to_be_bytes()); // frame_rate_b
    payload.push(0);

    let response = decode("GetCPLInfo2", &payload);
    match response.get("crypto_key_id_list") {
        Some(Value::UuidList(keys)) => assert_eq!(keys.len(), 1),
        other => panic!("Expected one key id, got {:?}", other),
    }
    assert_eq!(response.get("complete"), Some(&Value::Int(1)));
    assert_eq!(response.get("frame_rate_b"), Some(&Value::Int(24)));
    assert!(response.is_success());
}

#[test]
fn test_job_list_batch() {
    let mut payload = vec![0, 0, 0, 2, 0, 0, 0, 12];
    for (job_id, status) in [(10u64, 2u8), (11, 9)] {
        payload.extend_from_slice(&job_id.to_be_bytes());
        payload.extend_from_slice(&[0, 3, status, 0]);
    }
    payload.push(0);

    let response = decode("IngestGetJobList", &payload);
    let jobs = response.get("job_list").and_then(Value::as_records).unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0]["job_id"], Value::Int(10));
    assert_eq!(jobs[0]["job_status_text"], Value::Text("running".into()));
    assert_eq!(jobs[1]["event_count"], Value::Int(3));
    assert_eq!(jobs[1]["job_status_text"], Value::Text("unknown value".into()));
}

#[test]
fn test_short_batch_reports_partial_record() {
    let catalog = Catalog::builtin().unwrap();
    let key = catalog.responses.resolve("IngestGetJobList").unwrap().key;
    let frame = encode_frame(key, 1, &[0, 0, 0, 3, 0, 0, 0, 12, 0]).unwrap();

    match decode_response(&catalog.responses, &frame).unwrap_err() {
        DcpError::MalformedField { field, start, .. } => {
            assert_eq!(field, "job_list");
            assert_eq!(start, 0);
        }
        other => panic!("Expected malformed field, got {:?}", other),
    }
}

#[test]
fn test_show_element_status_is_translated() {
    let mut payload = vec![0, 0, 0, 1, 0, 0, 0, 16];
    payload.extend_from_slice(&[0xAB; 16]);
    payload.push(0);

    let response = decode("GetShowElementStatus", &payload);
    assert_eq!(response.get("status"), Some(&Value::Int(0)));
    assert!(response.get("status_text").is_some());
    assert_eq!(response.get("response"), Some(&Value::Int(0)));
}

// =============================================================================
// Request Encoding Tests
// =============================================================================

#[test]
fn test_remote_packing_list_request() {
    let catalog = Catalog::builtin().unwrap();
    let def = catalog.requests.resolve("IngestRemotePackingList").unwrap();
    let args = Args::new()
        .arg("10.0.0.12")
        .arg(21u32)
        .arg("ingest")
        .arg("secret")
        .arg("/dcp/PKL.xml");

    let frame = construct_with(def, &args, &RequestIdSequence::new()).unwrap();
    let payload = frame.payload();

    assert_eq!(&payload[..4], &[12, 0, 0, 10]);
    assert_eq!(&payload[4..6], &[0, 21]);
    assert_eq!(&payload[6..12], b"ingest");
    assert_eq!(&payload[22..28], b"secret");
    assert_eq!(&payload[38..], b"/dcp/PKL.xml\0");
}

#[test]
fn test_store_kdm_keeps_long_timeout() {
    let catalog = Catalog::builtin().unwrap();
    let def = catalog.requests.resolve("StoreKDM").unwrap();
    let config = dcpctl::ClientConfig::default();
    assert!(config.timeout_for(def) > config.read_timeout);
}
