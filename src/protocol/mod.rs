//! Protocol Module
//!
//! Defines the KLV wire protocol spoken by the cinema server.
//!
//! ## Frame Format
//! ```text
//! ┌─────────────┬─────────┬───────────┬────────────────┬──────────────────┐
//! │ Header (13) │ Key (3) │ BER (1-5) │ Request id (4) │ Payload          │
//! └─────────────┴─────────┴───────────┴────────────────┴──────────────────┘
//! ```
//!
//! ### Layers
//! - `bytes`: primitive conversions (integers, BER, UUIDs, text, slicing)
//! - `value`: typed arguments and decoded records
//! - `message`: per-command field layouts
//! - `registry`: lookup of layouts by name or key
//! - `catalog`: the built-in command table
//! - `codec`: frame assembly and incremental parsing
//!
//! ### Status Byte
//! The last payload byte of every response is the device status:
//! - 0x00: success
//! - anything else: command-specific failure, returned as data

pub mod bytes;
pub mod catalog;
pub mod codec;
mod command;
pub mod message;
pub mod registry;
mod response;
mod value;

pub use catalog::Catalog;
pub use codec::{
    construct, construct_with, decode_response, encode_frame, parse_response, RequestIdSequence,
    HEADER,
};
pub use command::RequestFrame;
pub use message::{
    CommandKey, Decoder, Encoding, RequestDefinition, RequestField, ResponseBatch,
    ResponseDefinition, ResponseElement, ResponseField, STATUS_FIELD, UNKNOWN_VALUE,
};
pub use registry::{Lookup, MessageRegistry, RequestRegistry, ResponseRegistry};
pub use response::{Response, Status};
pub use value::{Args, Record, Value};
