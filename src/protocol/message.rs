//! Message definitions
//!
//! Declarative description of one direction of one command: its name, its
//! 3-byte key and the ordered list of fields making up its payload.
//! Requests carry [`RequestField`]s (value -> bytes), responses carry
//! [`ResponseElement`]s (byte range -> value).

use std::fmt;
use std::net::Ipv4Addr;
use std::ops::Range;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{DcpError, ProtocolError, Result};

use super::bytes::{self, FieldFault, FieldResult, UUID_SIZE};
use super::value::{Args, Record, Value};

/// Label used when a translated code has no entry in its table
pub const UNKNOWN_VALUE: &str = "unknown value";

/// Name of the status entry every decoded response carries
pub const STATUS_FIELD: &str = "response";

/// Integer code to label table attached to a response field
pub type TextTable = &'static [(u64, &'static str)];

// =============================================================================
// Command Keys
// =============================================================================

/// 3-byte command key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandKey([u8; 3]);

impl CommandKey {
    pub const fn new(bytes: [u8; 3]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }

    /// Build a key from raw bytes read off the wire
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        <[u8; 3]>::try_from(bytes).map(Self).map_err(|_| {
            DcpError::Configuration(format!(
                "command key must be 3 bytes, got {}",
                bytes.len()
            ))
        })
    }
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bytes::to_hex(&self.0))
    }
}

impl FromStr for CommandKey {
    type Err = DcpError;

    /// Parse 6 hex digits, e.g. `"010100"`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DcpError::Configuration(format!("invalid command key {:?}", s));

        if s.len() != 6 || !s.is_ascii() {
            return Err(invalid());
        }

        let mut key = [0u8; 3];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
        }
        Ok(Self(key))
    }
}

// =============================================================================
// Request Fields
// =============================================================================

/// How a request argument becomes bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Big-endian unsigned integer of 1, 2, 4 or 8 bytes
    Int { width: usize },
    /// 16 raw bytes
    Uuid,
    /// UTF-8, zero-padded/truncated to `size` when fixed, raw otherwise
    Text { size: Option<usize> },
    /// Single byte 0/1
    Bool,
    /// UTF-8 followed by a NUL terminator
    CString,
    /// Dotted quad packed with the first octet last
    Ipv4,
}

impl Encoding {
    /// Type label for help output
    pub fn label(&self) -> String {
        match self {
            Encoding::Int { width } => format!("int{}", width * 8),
            Encoding::Uuid => "uuid".to_string(),
            Encoding::Text { size: Some(size) } => format!("text[{}]", size),
            Encoding::Text { size: None } => "text".to_string(),
            Encoding::Bool => "bool".to_string(),
            Encoding::CString => "cstring".to_string(),
            Encoding::Ipv4 => "ipv4".to_string(),
        }
    }
}

/// One request argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestField {
    pub name: String,
    pub encoding: Encoding,
    /// Value sent when the caller leaves the argument out
    pub default: Option<Value>,
}

impl RequestField {
    pub fn new(name: impl Into<String>, encoding: Encoding) -> Self {
        Self {
            name: name.into(),
            encoding,
            default: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn int(name: impl Into<String>, width: usize) -> Self {
        Self::new(name, Encoding::Int { width })
    }

    pub fn uuid(name: impl Into<String>) -> Self {
        Self::new(name, Encoding::Uuid)
    }

    pub fn text(name: impl Into<String>, size: usize) -> Self {
        Self::new(name, Encoding::Text { size: Some(size) })
    }

    /// Variable-length text (XML documents, OIDs)
    pub fn document(name: impl Into<String>) -> Self {
        Self::new(name, Encoding::Text { size: None })
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name, Encoding::Bool)
    }

    pub fn cstring(name: impl Into<String>) -> Self {
        Self::new(name, Encoding::CString)
    }

    pub fn ipv4(name: impl Into<String>) -> Self {
        Self::new(name, Encoding::Ipv4)
    }

    /// Encoded size, when fixed
    pub fn encoded_width(&self) -> Option<usize> {
        match self.encoding {
            Encoding::Int { width } => Some(width),
            Encoding::Uuid => Some(UUID_SIZE),
            Encoding::Text { size } => size,
            Encoding::Bool => Some(1),
            Encoding::CString => None,
            Encoding::Ipv4 => Some(4),
        }
    }

    /// Encode one argument. Text input is coerced to the field's type.
    pub fn encode(&self, value: &Value) -> FieldResult<Vec<u8>> {
        match self.encoding {
            Encoding::Int { width } => bytes::int_to_bytes(coerce_int(value)?, width),
            Encoding::Uuid => match value {
                Value::Uuid(uuid) => Ok(uuid.as_bytes().to_vec()),
                Value::Text(text) => bytes::uuid_to_bytes(text).map(|b| b.to_vec()),
                other => Err(wrong_type("uuid", other)),
            },
            Encoding::Text { size } => match value {
                Value::Text(text) => Ok(bytes::text_to_bytes(text, size)),
                Value::Int(_) | Value::Uuid(_) => {
                    Ok(bytes::text_to_bytes(&value.to_string(), size))
                }
                other => Err(wrong_type("text", other)),
            },
            Encoding::Bool => coerce_bool(value).map(|b| bytes::bool_to_bytes(b).to_vec()),
            Encoding::CString => match value {
                Value::Text(text) => {
                    let mut out = bytes::text_to_bytes(text, None);
                    out.push(0);
                    Ok(out)
                }
                other => Err(wrong_type("text", other)),
            },
            Encoding::Ipv4 => match value {
                Value::Text(text) => text
                    .trim()
                    .parse::<Ipv4Addr>()
                    .map(|addr| {
                        let mut octets = addr.octets();
                        octets.reverse();
                        octets.to_vec()
                    })
                    .map_err(|_| wrong_type("IPv4 address", value)),
                other => Err(wrong_type("IPv4 address", other)),
            },
        }
    }
}

fn wrong_type(expected: &'static str, found: &Value) -> FieldFault {
    FieldFault::WrongType {
        expected,
        found: match found {
            Value::Text(text) => format!("{:?}", text),
            other => other.kind().to_string(),
        },
    }
}

fn coerce_int(value: &Value) -> FieldResult<u64> {
    match value {
        Value::Int(v) => Ok(*v),
        Value::Bool(b) => Ok(u64::from(*b)),
        Value::Text(text) => text
            .trim()
            .parse::<u64>()
            .map_err(|_| wrong_type("integer", value)),
        other => Err(wrong_type("integer", other)),
    }
}

fn coerce_bool(value: &Value) -> FieldResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Int(0) => Ok(false),
        Value::Int(1) => Ok(true),
        Value::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(wrong_type("boolean", value)),
        },
        other => Err(wrong_type("boolean", other)),
    }
}

// =============================================================================
// Response Fields
// =============================================================================

/// How a byte range becomes a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    /// Big-endian unsigned integer, width taken from the range
    Int,
    Text,
    Uuid,
    UuidList,
    Bool,
    /// Concatenated little-endian integers of `width` bytes
    IntListLe { width: usize },
}

impl Decoder {
    pub fn decode(&self, bytes: &[u8]) -> FieldResult<Value> {
        match self {
            Decoder::Int => bytes::be_bytes_to_u64(bytes).map(Value::Int),
            Decoder::Text => bytes::bytes_to_text(bytes).map(Value::Text),
            Decoder::Uuid => bytes::bytes_to_uuid(bytes).map(Value::Uuid),
            Decoder::UuidList => bytes::bytes_to_uuid_list(bytes).map(Value::UuidList),
            Decoder::Bool => bytes::bytes_to_bool(bytes).map(Value::Bool),
            Decoder::IntListLe { width } => {
                bytes::bytes_to_le_int_list(bytes, *width).map(Value::IntList)
            }
        }
    }
}

/// One value extracted from `payload[start:end]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseField {
    pub name: String,
    pub start: isize,
    /// `None` runs to the end of the buffer
    pub end: Option<isize>,
    pub decoder: Decoder,
    pub text_table: Option<TextTable>,
}

impl ResponseField {
    pub fn new(name: impl Into<String>, start: isize, end: Option<isize>, decoder: Decoder) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            decoder,
            text_table: None,
        }
    }

    /// Attach a code -> label table; decoding then also yields `<name>_text`
    pub fn with_text(mut self, table: TextTable) -> Self {
        self.text_table = Some(table);
        self
    }

    /// Width implied by the offsets when both count from the same end
    pub fn declared_width(&self) -> Option<usize> {
        let end = self.end?;
        if (self.start >= 0) == (end >= 0) && end >= self.start {
            Some((end - self.start).unsigned_abs())
        } else {
            None
        }
    }

    pub fn range(&self, len: usize) -> Range<usize> {
        bytes::slice_range(len, self.start, self.end)
    }

    pub fn decode(&self, bytes: &[u8]) -> FieldResult<Value> {
        if let Some(width) = self.declared_width() {
            if bytes.len() != width {
                return Err(FieldFault::WrongLength {
                    expected: width,
                    actual: bytes.len(),
                });
            }
        }
        self.decoder.decode(bytes)
    }

    /// Label for a decoded code, if this field translates
    pub fn translate(&self, value: &Value) -> Option<&'static str> {
        let table = self.text_table?;
        let label = value
            .as_u64()
            .and_then(|code| table.iter().find(|(c, _)| *c == code).map(|(_, l)| *l))
            .unwrap_or(UNKNOWN_VALUE);
        Some(label)
    }
}

/// Counted repeated-record region: item count (4), item stride (4), then
/// `count` records of `stride` bytes each
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBatch {
    pub name: String,
    pub start: isize,
    pub end: Option<isize>,
    /// Layout of one record, offsets relative to the record start
    pub fields: Vec<ResponseElement>,
}

impl ResponseBatch {
    pub fn new(
        name: impl Into<String>,
        start: isize,
        end: Option<isize>,
        fields: Vec<ResponseElement>,
    ) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            fields,
        }
    }

    /// Smallest stride that holds every field of one record
    pub fn record_size(&self) -> usize {
        let reach = |offset: isize| offset.unsigned_abs();
        self.fields
            .iter()
            .map(|element| {
                let (start, end) = match element {
                    ResponseElement::Field(f) => (f.start, f.end),
                    ResponseElement::Batch(b) => (b.start, b.end),
                };
                end.map_or(reach(start), |end| reach(start).max(reach(end)))
            })
            .max()
            .unwrap_or(0)
            .max(1)
    }

    /// Validate the region header, returning `(count, stride)`.
    ///
    /// Every record must fit its fields and the region must hold all of
    /// them, so `count` is bounded by the region length.
    fn layout(&self, region: &[u8]) -> FieldResult<(usize, usize)> {
        if region.len() < 8 {
            return Err(FieldFault::WrongLength {
                expected: 8,
                actual: region.len(),
            });
        }

        let count = bytes::bytes_to_int(&region[0..4], 4)? as usize;
        let stride = bytes::bytes_to_int(&region[4..8], 4)? as usize;
        if count == 0 {
            return Ok((0, stride));
        }

        let record_size = self.record_size();
        if stride < record_size {
            return Err(FieldFault::StrideTooSmall {
                stride,
                needed: record_size,
            });
        }

        let needed = count
            .checked_mul(stride)
            .and_then(|n| n.checked_add(8))
            .unwrap_or(usize::MAX);
        if region.len() < needed {
            return Err(FieldFault::WrongLength {
                expected: needed,
                actual: region.len(),
            });
        }
        Ok((count, stride))
    }
}

/// A response payload element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseElement {
    Field(ResponseField),
    Batch(ResponseBatch),
}

impl ResponseElement {
    pub fn name(&self) -> &str {
        match self {
            ResponseElement::Field(f) => &f.name,
            ResponseElement::Batch(b) => &b.name,
        }
    }

    pub fn range(&self, len: usize) -> Range<usize> {
        match self {
            ResponseElement::Field(f) => f.range(len),
            ResponseElement::Batch(b) => bytes::slice_range(len, b.start, b.end),
        }
    }
}

impl From<ResponseField> for ResponseElement {
    fn from(field: ResponseField) -> Self {
        ResponseElement::Field(field)
    }
}

impl From<ResponseBatch> for ResponseElement {
    fn from(batch: ResponseBatch) -> Self {
        ResponseElement::Batch(batch)
    }
}

/// Run every element of `elements` over `buf`.
///
/// `base` is the offset of `buf` inside the payload, so reported ranges
/// are always payload-absolute. Batches recurse into this same function
/// once per record.
pub fn decode_elements(
    command: &str,
    elements: &[ResponseElement],
    buf: &[u8],
    base: usize,
) -> Result<Record> {
    let mut record = Record::new();

    for element in elements {
        let range = element.range(buf.len());
        let region = &buf[range.clone()];
        let malformed = |fault: FieldFault, partial: &Record| DcpError::MalformedField {
            command: command.to_string(),
            field: element.name().to_string(),
            start: base + range.start,
            end: base + range.end,
            reason: fault.to_string(),
            partial: Box::new(partial.clone()),
        };

        match element {
            ResponseElement::Field(field) => {
                let value = field.decode(region).map_err(|f| malformed(f, &record))?;
                let label = field.translate(&value);
                record.insert(field.name.clone(), value);
                if let Some(label) = label {
                    record.insert(format!("{}_text", field.name), Value::Text(label.to_string()));
                }
            }
            ResponseElement::Batch(batch) => {
                let (count, stride) = batch.layout(region).map_err(|f| malformed(f, &record))?;
                let mut items = Vec::with_capacity(count);
                for i in 0..count {
                    let offset = 8 + i * stride;
                    let chunk = &region[offset..offset + stride];
                    match decode_elements(command, &batch.fields, chunk, base + range.start + offset)
                    {
                        Ok(item) => items.push(item),
                        Err(err) => return Err(within_batch(err, &batch.name, i, record, items)),
                    }
                }
                record.insert(batch.name.clone(), Value::Records(items));
            }
        }
    }

    Ok(record)
}

/// Qualify a failure inside record `index` of a batch with its path, and
/// carry the enclosing record plus the records decoded before it
fn within_batch(
    err: DcpError,
    batch: &str,
    index: usize,
    mut outer: Record,
    items: Vec<Record>,
) -> DcpError {
    match err {
        DcpError::MalformedField {
            command,
            field,
            start,
            end,
            reason,
            ..
        } => {
            outer.insert(batch.to_string(), Value::Records(items));
            DcpError::MalformedField {
                command,
                field: format!("{}[{}].{}", batch, index, field),
                start,
                end,
                reason,
                partial: Box::new(outer),
            }
        }
        other => other,
    }
}

// =============================================================================
// Message Definitions
// =============================================================================

/// One direction of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDefinition<F> {
    pub name: String,
    pub key: CommandKey,
    pub fields: Vec<F>,
    /// Read timeout for the reply, when longer than the connection default
    pub timeout: Option<Duration>,
}

/// Request side definition
pub type RequestDefinition = MessageDefinition<RequestField>;

/// Response side definition
pub type ResponseDefinition = MessageDefinition<ResponseElement>;

impl<F> MessageDefinition<F> {
    pub fn new(name: impl Into<String>, key: CommandKey, fields: Vec<F>) -> Self {
        Self {
            name: name.into(),
            key,
            fields,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl RequestDefinition {
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Bind `args` to the declared fields and encode them in order.
    ///
    /// A field takes the named argument matching its name when one was
    /// given, otherwise the next positional argument. Every argument must
    /// be consumed.
    pub fn encode_fields(&self, args: &Args) -> Result<Vec<u8>> {
        let mut positional = args.positional.iter();
        let mut consumed = vec![false; args.named.len()];
        let mut out = Vec::new();

        for field in &self.fields {
            let value = match args.named.iter().position(|(name, _)| *name == field.name) {
                Some(idx) => {
                    consumed[idx] = true;
                    &args.named[idx].1
                }
                None => positional
                    .next()
                    .or(field.default.as_ref())
                    .ok_or_else(|| {
                        DcpError::parameter(
                            &self.name,
                            &field.name,
                            format!("missing argument ({} expected)", self.fields.len()),
                        )
                    })?,
            };

            let encoded = field
                .encode(value)
                .map_err(|fault| DcpError::parameter(&self.name, &field.name, fault.to_string()))?;
            out.extend_from_slice(&encoded);
        }

        if positional.next().is_some() {
            return Err(DcpError::parameter(
                &self.name,
                "*",
                format!(
                    "too many arguments: expected {}, got {}",
                    self.fields.len(),
                    args.len()
                ),
            ));
        }
        if let Some(idx) = consumed.iter().position(|used| !used) {
            return Err(DcpError::parameter(
                &self.name,
                &args.named[idx].0,
                "unexpected named argument",
            ));
        }

        Ok(out)
    }

    /// Response-style layout of this request's payload, when every field has a fixed width
    pub fn mirror_layout(&self) -> Option<Vec<ResponseElement>> {
        let mut offset = 0usize;
        let mut layout = Vec::with_capacity(self.fields.len());

        for field in &self.fields {
            let width = field.encoded_width()?;
            let decoder = match field.encoding {
                Encoding::Int { .. } => Decoder::Int,
                Encoding::Uuid => Decoder::Uuid,
                Encoding::Text { .. } => Decoder::Text,
                Encoding::Bool => Decoder::Bool,
                Encoding::CString | Encoding::Ipv4 => return None,
            };
            layout.push(
                ResponseField::new(
                    field.name.clone(),
                    offset as isize,
                    Some((offset + width) as isize),
                    decoder,
                )
                .into(),
            );
            offset += width;
        }

        Some(layout)
    }
}

impl ResponseDefinition {
    /// Decode a response payload.
    ///
    /// The result always carries a `response` entry holding the final
    /// payload byte, whether or not the layout declares one.
    pub fn decode(&self, payload: &[u8]) -> Result<Record> {
        let status = *payload
            .last()
            .ok_or_else(|| ProtocolError::MissingStatusByte(self.name.clone()))?;

        let mut record = decode_elements(&self.name, &self.fields, payload, 0)?;
        if !record.contains_key(STATUS_FIELD) {
            record.insert(STATUS_FIELD.to_string(), Value::Int(u64::from(status)));
        }
        Ok(record)
    }
}
