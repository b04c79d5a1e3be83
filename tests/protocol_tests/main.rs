//! Protocol Tests
//!
//! Byte-level codec laws, frame assembly and parsing, and the built-in
//! command catalog, exercised through the public API.

mod bytes_tests;
mod catalog_tests;
mod codec_tests;
