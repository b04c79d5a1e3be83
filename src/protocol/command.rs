//! Request frames
//!
//! A [`RequestFrame`] is the fully assembled wire image of one request,
//! ready to hand to a transport.

use bytes::Bytes;

use super::codec;
use super::message::CommandKey;

/// An encoded request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFrame {
    /// Command name the frame was built from
    pub command: String,

    pub key: CommandKey,

    /// Id taken from the request id sequence
    pub request_id: u32,

    bytes: Bytes,

    /// Offset of the payload within `bytes`
    payload_offset: usize,
}

impl RequestFrame {
    pub(crate) fn new(
        command: String,
        key: CommandKey,
        request_id: u32,
        bytes: Bytes,
        payload_offset: usize,
    ) -> Self {
        Self {
            command,
            key,
            request_id,
            bytes,
            payload_offset,
        }
    }

    /// The complete frame
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Encoded arguments, without header, key, length or id
    pub fn payload(&self) -> &[u8] {
        &self.bytes[self.payload_offset..]
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Multi-line breakdown of the frame for debug logs
    pub fn explain(&self) -> String {
        codec::explain("REQUEST", &self.command, &self.bytes)
    }
}
