//! # dcpctl
//!
//! Client for the binary control protocol of Digital Cinema servers:
//! - Declarative catalog of commands keyed by 3-byte codes
//! - KLV frame codec with BER lengths and rolling request ids
//! - Field-level encoders and signed-offset response decoders
//! - Blocking dispatch with one exchange in flight per connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  DcpClient / CommandCall                     │
//! │           (one exchange at a time per connection)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Command Codec                           │
//! │        (frame assembly, incremental frame parsing)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Registry   │          │  Transport  │
//!   │ (catalog)   │          │   (TCP)     │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │ Field codec │
//!   │  (bytes)    │
//!   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use dcpctl::{Args, ClientConfig, DcpClient};
//!
//! let client = DcpClient::connect(ClientConfig::builder().host("10.0.0.12").build())?;
//! let cpls = client.call("GetCPLList", &Args::new())?;
//! println!("{:?}", cpls.get("list"));
//! client.close()?;
//! # Ok::<(), dcpctl::DcpError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DcpError, ProtocolError, Result};
pub use config::ClientConfig;
pub use client::{CommandCall, DcpClient};
pub use network::{TcpConnection, Transport};
pub use protocol::{Args, Catalog, Record, Response, Status, Value};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of dcpctl
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
