//! Protocol codec
//!
//! Assembles request frames and parses response frames.
//!
//! ## Wire Format
//!
//! ```text
//! ┌─────────────┬─────────┬───────────┬────────────────┬──────────────────┐
//! │ Header (13) │ Key (3) │ BER (1-5) │ Request id (4) │ Payload (BER-4)  │
//! └─────────────┴─────────┴───────────┴────────────────┴──────────────────┘
//! ```
//!
//! - Header: `06 0E 2B 34 02 05 01 0A 0E 10 01 01 01` in both directions
//! - BER: definite length of request id + payload
//! - Request id: big-endian, process-wide sequence in `[0, 60000)`
//!
//! Responses are read incrementally: the BER prefix byte tells how many
//! more length bytes follow, and the length tells how much payload to read.
//! Nothing is read beyond the current frame.

use std::sync::atomic::{AtomicU32, Ordering};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{DcpError, ProtocolError, Result};

use super::bytes::{ber_decode, ber_encode, ber_extension_len, to_hex};
use super::command::RequestFrame;
use super::message::{CommandKey, RequestDefinition};
use super::registry::ResponseRegistry;
use super::response::Response;
use super::value::Args;

/// Organizational header carried by every frame
pub const HEADER: [u8; HEADER_SIZE] = [
    0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x0A, 0x0E, 0x10, 0x01, 0x01, 0x01,
];

pub const HEADER_SIZE: usize = 13;

pub const KEY_SIZE: usize = 3;

pub const REQUEST_ID_SIZE: usize = 4;

/// Request ids wrap to 0 at this value
pub const REQUEST_ID_MODULUS: u32 = 60_000;

/// Largest response payload accepted (64 MB)
pub const MAX_PAYLOAD_SIZE: usize = 64 * 1024 * 1024;

// =============================================================================
// Request Ids
// =============================================================================

/// Wrapping request id counter
#[derive(Debug)]
pub struct RequestIdSequence {
    next: AtomicU32,
}

static REQUEST_IDS: RequestIdSequence = RequestIdSequence::new();

impl RequestIdSequence {
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    pub const fn starting_at(id: u32) -> Self {
        Self {
            next: AtomicU32::new(id % REQUEST_ID_MODULUS),
        }
    }

    /// The sequence shared by every connection in the process
    pub fn global() -> &'static RequestIdSequence {
        &REQUEST_IDS
    }

    /// Take the current id and advance, wrapping at [`REQUEST_ID_MODULUS`]
    pub fn next_id(&self) -> u32 {
        let advance = |id: u32| Some((id + 1) % REQUEST_ID_MODULUS);
        match self.next.fetch_update(Ordering::SeqCst, Ordering::SeqCst, advance) {
            Ok(id) | Err(id) => id,
        }
    }

    /// The id the next construction will use
    pub fn peek(&self) -> u32 {
        self.next.load(Ordering::SeqCst)
    }
}

impl Default for RequestIdSequence {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Frame Assembly
// =============================================================================

/// Assemble `HEADER || key || BER || request id || payload`
pub fn encode_frame(key: CommandKey, request_id: u32, payload: &[u8]) -> Result<Bytes> {
    Ok(assemble(key, request_id, payload)?.0)
}

fn assemble(key: CommandKey, request_id: u32, payload: &[u8]) -> Result<(Bytes, usize)> {
    let length = u32::try_from(REQUEST_ID_SIZE + payload.len()).map_err(|_| {
        DcpError::Configuration(format!(
            "payload of {} bytes does not fit a 32-bit length",
            payload.len()
        ))
    })?;
    let ber = ber_encode(length);
    let payload_offset = HEADER_SIZE + KEY_SIZE + ber.len() + REQUEST_ID_SIZE;

    let mut buf = BytesMut::with_capacity(payload_offset + payload.len());
    buf.put_slice(&HEADER);
    buf.put_slice(key.as_bytes());
    buf.put_slice(&ber);
    buf.put_u32(request_id);
    buf.put_slice(payload);

    Ok((buf.freeze(), payload_offset))
}

/// Build a request frame using the process-wide id sequence
pub fn construct(definition: &RequestDefinition, args: &Args) -> Result<RequestFrame> {
    construct_with(definition, args, RequestIdSequence::global())
}

/// Build a request frame drawing its id from `ids`.
///
/// Arguments are encoded before an id is taken, so a parameter error
/// leaves the sequence untouched.
pub fn construct_with(
    definition: &RequestDefinition,
    args: &Args,
    ids: &RequestIdSequence,
) -> Result<RequestFrame> {
    let payload = definition.encode_fields(args)?;
    let request_id = ids.next_id();
    let (bytes, payload_offset) = assemble(definition.key, request_id, &payload)?;

    tracing::trace!(
        command = %definition.name,
        request_id,
        len = bytes.len(),
        "constructed request"
    );

    Ok(RequestFrame::new(
        definition.name.clone(),
        definition.key,
        request_id,
        bytes,
        payload_offset,
    ))
}

// =============================================================================
// Frame Parsing
// =============================================================================

/// Read exactly `n` bytes through `read`, failing if fewer come back
fn read_exact<F>(read: &mut F, n: usize) -> Result<Vec<u8>>
where
    F: FnMut(usize) -> Result<Vec<u8>>,
{
    if n == 0 {
        return Ok(Vec::new());
    }
    let chunk = read(n)?;
    if chunk.len() != n {
        return Err(ProtocolError::Truncated {
            needed: n,
            available: chunk.len(),
        }
        .into());
    }
    Ok(chunk)
}

/// Read and decode one response frame.
///
/// `read(n)` must return exactly `n` bytes from the stream. The whole
/// frame is consumed before the key is resolved, so an unknown key leaves
/// the stream aligned on the next frame.
pub fn parse_response<F>(responses: &ResponseRegistry, mut read: F) -> Result<Response>
where
    F: FnMut(usize) -> Result<Vec<u8>>,
{
    let header = read_exact(&mut read, HEADER_SIZE)?;
    if header != HEADER {
        return Err(ProtocolError::HeaderMismatch(to_hex(&header)).into());
    }

    let key = CommandKey::from_slice(&read_exact(&mut read, KEY_SIZE)?)?;

    let mut ber = read_exact(&mut read, 1)?;
    let extra = ber_extension_len(ber[0])
        .map_err(|fault| ProtocolError::InvalidBerLength(fault.to_string()))?;
    ber.extend(read_exact(&mut read, extra)?);
    let (length, _) =
        ber_decode(&ber).map_err(|fault| ProtocolError::InvalidBerLength(fault.to_string()))?;

    let length = length as usize;
    if length < REQUEST_ID_SIZE {
        return Err(ProtocolError::InvalidBerLength(format!(
            "length {} cannot hold a request id",
            length
        ))
        .into());
    }
    let payload_len = length - REQUEST_ID_SIZE;
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(ProtocolError::InvalidBerLength(format!(
            "payload of {} bytes exceeds {}",
            payload_len, MAX_PAYLOAD_SIZE
        ))
        .into());
    }

    let id = read_exact(&mut read, REQUEST_ID_SIZE)?;
    let request_id = u32::from_be_bytes([id[0], id[1], id[2], id[3]]);
    let payload = read_exact(&mut read, payload_len)?;

    let definition = responses
        .get_by_key(&key)
        .ok_or_else(|| ProtocolError::UnknownResponseKey(key.to_string()))?;

    if tracing::enabled!(tracing::Level::DEBUG) {
        let mut frame = header;
        frame.extend_from_slice(key.as_bytes());
        frame.extend_from_slice(&ber);
        frame.extend_from_slice(&id);
        frame.extend_from_slice(&payload);
        tracing::debug!("{}", explain("RESPONSE", &definition.name, &frame));
    }

    let fields = definition.decode(&payload)?;
    Ok(Response::new(definition.name.clone(), request_id, fields))
}

/// Decode a complete response frame held in memory
pub fn decode_response(responses: &ResponseRegistry, frame: &[u8]) -> Result<Response> {
    let mut pos = 0usize;
    let response = parse_response(responses, |n| {
        let chunk = frame.get(pos..pos + n).ok_or(ProtocolError::Truncated {
            needed: pos + n,
            available: frame.len(),
        })?;
        pos += n;
        Ok(chunk.to_vec())
    })?;

    if pos < frame.len() {
        tracing::debug!(trailing = frame.len() - pos, "ignoring bytes after response frame");
    }
    Ok(response)
}

// =============================================================================
// Diagnostics
// =============================================================================

/// Payload bytes shown before the dump is cut short
const EXPLAIN_DATA_BYTES: usize = 20;

/// Split a frame into its sections, without validating any of them
fn sections(frame: &[u8]) -> [&[u8]; 5] {
    let take = |from: usize, len: usize| -> &[u8] {
        let start = from.min(frame.len());
        let end = from.saturating_add(len).min(frame.len());
        &frame[start..end]
    };

    let header = take(0, HEADER_SIZE);
    let key = take(HEADER_SIZE, KEY_SIZE);
    let ber_start = HEADER_SIZE + KEY_SIZE;
    let ber_len = frame
        .get(ber_start)
        .and_then(|&first| ber_extension_len(first).ok())
        .map_or(1, |extra| 1 + extra);
    let ber = take(ber_start, ber_len);
    let id = take(ber_start + ber_len, REQUEST_ID_SIZE);
    let data = take(ber_start + ber_len + REQUEST_ID_SIZE, usize::MAX);

    [header, key, ber, id, data]
}

/// Section-by-section hex dump of a frame
pub fn explain(direction: &str, command: &str, frame: &[u8]) -> String {
    let [header, key, ber, id, data] = sections(frame);
    let mut shown = to_hex(&data[..data.len().min(EXPLAIN_DATA_BYTES)]);
    if data.len() > EXPLAIN_DATA_BYTES {
        shown.push_str("...");
    }
    let status = data.last().map_or_else(|| "---".to_string(), |b| format!("{:02x}", b));

    format!(
        "{} {}\n  Header : {}\n  Key    : {}\n  Ber    : {}\n  ID     : {}\n  Data   : {} ({} bytes)\n  Last   : {}",
        direction,
        command,
        to_hex(header),
        to_hex(key),
        to_hex(ber),
        to_hex(id),
        shown,
        data.len(),
        status
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::message::{Decoder, ResponseDefinition, ResponseField};
    use crate::protocol::registry::ResponseRegistry;

    fn registry() -> ResponseRegistry {
        ResponseRegistry::new(vec![ResponseDefinition::new(
            "GetCPLSize",
            CommandKey::new([0x01, 0x0E, 0x00]),
            vec![
                ResponseField::new("size", 0, Some(8), Decoder::Int).into(),
                ResponseField::new("response", -1, None, Decoder::Int).into(),
            ],
        )])
        .unwrap()
    }

    #[test]
    fn test_sequence_wraps() {
        let ids = RequestIdSequence::starting_at(REQUEST_ID_MODULUS - 1);
        assert_eq!(ids.next_id(), REQUEST_ID_MODULUS - 1);
        assert_eq!(ids.next_id(), 0);
        assert_eq!(ids.peek(), 1);
    }

    #[test]
    fn test_frame_layout() {
        let frame = encode_frame(CommandKey::new([0x01, 0x0E, 0x00]), 7, &[0xAA]).unwrap();
        assert_eq!(&frame[..HEADER_SIZE], &HEADER);
        assert_eq!(&frame[13..16], &[0x01, 0x0E, 0x00]);
        assert_eq!(frame[16], 5);
        assert_eq!(&frame[17..21], &[0, 0, 0, 7]);
        assert_eq!(&frame[21..], &[0xAA]);
    }

    #[test]
    fn test_long_form_length() {
        let payload = vec![0u8; 200];
        let frame = encode_frame(CommandKey::new([0x01, 0x0E, 0x00]), 1, &payload).unwrap();
        assert_eq!(&frame[16..18], &[0x81, 204]);
        assert_eq!(frame.len(), 13 + 3 + 2 + 4 + 200);
    }

    #[test]
    fn test_decode_in_memory_frame() {
        let mut payload = 4096u64.to_be_bytes().to_vec();
        payload.push(0);
        let frame = encode_frame(CommandKey::new([0x01, 0x0E, 0x00]), 42, &payload).unwrap();

        let response = decode_response(&registry(), &frame).unwrap();
        assert_eq!(response.command, "GetCPLSize");
        assert_eq!(response.request_id, 42);
        assert_eq!(response.fields["size"].as_u64(), Some(4096));
    }

    #[test]
    fn test_truncated_frame() {
        let frame = encode_frame(CommandKey::new([0x01, 0x0E, 0x00]), 1, &[0; 9]).unwrap();
        let err = decode_response(&registry(), &frame[..frame.len() - 2]).unwrap_err();
        assert!(matches!(
            err,
            DcpError::Protocol(ProtocolError::Truncated { .. })
        ));
    }

    #[test]
    fn test_header_mismatch() {
        let mut frame = encode_frame(CommandKey::new([0x01, 0x0E, 0x00]), 1, &[0; 9])
            .unwrap()
            .to_vec();
        frame[0] = 0x07;
        let err = decode_response(&registry(), &frame).unwrap_err();
        assert!(matches!(
            err,
            DcpError::Protocol(ProtocolError::HeaderMismatch(_))
        ));
    }

    #[test]
    fn test_length_shorter_than_request_id() {
        let mut frame = HEADER.to_vec();
        frame.extend_from_slice(&[0x01, 0x0E, 0x00, 0x02, 0x00, 0x00]);
        let err = decode_response(&registry(), &frame).unwrap_err();
        assert!(matches!(
            err,
            DcpError::Protocol(ProtocolError::InvalidBerLength(_))
        ));
    }

    #[test]
    fn test_explain_sections() {
        let frame = encode_frame(CommandKey::new([0x01, 0x01, 0x00]), 2, &[]).unwrap();
        let dump = explain("REQUEST", "GetCPLList", &frame);
        assert!(dump.starts_with("REQUEST GetCPLList"));
        assert!(dump.contains("Key    : 010100"));
        assert!(dump.contains("Ber    : 04"));
        assert!(dump.contains("ID     : 00000002"));
        assert!(dump.contains("Last   : ---"));
    }
}
