//! TCP Connection
//!
//! Blocking transport over a single TCP stream.

use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{DcpError, Result};

use super::Transport;

/// A connected device
pub struct TcpConnection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Current read budget, reported on timeout
    read_timeout: Duration,

    /// Peer address for logging
    peer_addr: String,
}

impl TcpConnection {
    /// Connect to `host:port`, trying every resolved address in turn
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|e| DcpError::Connection(format!("cannot resolve {}:{}: {}", host, port, e)))?
            .collect();

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => return Self::from_stream(stream, timeout),
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", addr, e);
                    last_error = Some(e);
                }
            }
        }

        Err(DcpError::Connection(match last_error {
            Some(e) => format!("cannot connect to {}:{}: {}", host, port, e),
            None => format!("{}:{} resolved to no address", host, port),
        }))
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream, read_timeout: Duration) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Frames are small and strictly request/response
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(read_timeout))?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        tracing::debug!("Connected to {}", peer_addr);

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            read_timeout,
            peer_addr,
        })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

impl Transport for TcpConnection {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()?;
        tracing::trace!("Sent {} bytes to {}", bytes.len(), self.peer_addr);
        Ok(())
    }

    fn receive(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        match self.reader.read_exact(&mut buf) {
            Ok(()) => Ok(buf),
            // Unix reports WouldBlock on a read timeout, Windows TimedOut
            Err(ref e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                tracing::debug!("Read timeout from {}", self.peer_addr);
                Err(DcpError::Timeout(self.read_timeout))
            }
            Err(ref e) if e.kind() == ErrorKind::UnexpectedEof => Err(DcpError::Connection(
                format!("{} closed the connection", self.peer_addr),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> Result<()> {
        if timeout != self.read_timeout {
            self.reader.get_ref().set_read_timeout(Some(timeout))?;
            self.read_timeout = timeout;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let _ = self.writer.flush();
        match self.writer.get_ref().shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(ref e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
