//! Network Module
//!
//! Byte transports for the client.
//!
//! ## Contract
//! - `send` writes a whole frame
//! - `receive(n)` blocks until exactly `n` bytes arrived, the read timeout
//!   expired, or the peer closed
//! - one exchange at a time; callers serialize access

mod connection;

use std::time::Duration;

use crate::error::Result;

pub use connection::TcpConnection;

/// A byte-oriented connection to a device
pub trait Transport: Send {
    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read exactly `n` bytes
    fn receive(&mut self, n: usize) -> Result<Vec<u8>>;

    /// Budget for each subsequent `receive`
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<()>;

    fn close(&mut self) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send(bytes)
    }

    fn receive(&mut self, n: usize) -> Result<Vec<u8>> {
        (**self).receive(n)
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> Result<()> {
        (**self).set_read_timeout(timeout)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
