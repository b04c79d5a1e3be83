//! Decoded responses
//!
//! A [`Response`] is the typed result of one exchange. A non-zero status
//! byte is reported as data, never as an error: the transport and the
//! framing worked, the device declined.

use serde::Serialize;

use super::message::STATUS_FIELD;
use super::value::{Record, Value};

/// Device status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    /// Non-zero status code
    Failed(u8),
}

impl Status {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Status::Ok,
            code => Status::Failed(code),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::Failed(code) => *code,
        }
    }
}

/// A decoded response frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    /// Command name of the matched response definition
    pub command: String,

    /// Request id echoed by the device
    pub request_id: u32,

    /// Decoded fields in layout order, always including `response`
    pub fields: Record,
}

impl Response {
    pub fn new(command: impl Into<String>, request_id: u32, fields: Record) -> Self {
        Self {
            command: command.into(),
            request_id,
            fields,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Device status; an out-of-range `response` entry reads as a failure code 255
    pub fn status(&self) -> Status {
        let code = self
            .fields
            .get(STATUS_FIELD)
            .and_then(Value::as_u64)
            .map_or(u8::MAX, |code| u8::try_from(code).unwrap_or(u8::MAX));
        Status::from_code(code)
    }

    pub fn is_success(&self) -> bool {
        self.status() == Status::Ok
    }

    pub fn into_fields(self) -> Record {
        self.fields
    }
}
