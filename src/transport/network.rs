//! # Network Transport
//!
//! Network-capable models (QL-710W, QL-720NW, QL-810W, QL-820NWB, QL-1060N)
//! accept the same raster jobs on a raw TCP socket, port 9100.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use super::Backend;
use crate::error::LabelError;

/// Raw printing port
pub const DEFAULT_PORT: u16 = 9100;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct NetworkBackend {
    stream: TcpStream,
}

impl NetworkBackend {
    /// Connect to a printer.
    pub fn connect(host: &str, port: u16) -> Result<Self, LabelError> {
        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|e| LabelError::Transport(format!("Failed to resolve {}: {}", host, e)))?
            .next()
            .ok_or_else(|| LabelError::Transport(format!("No address for {}", host)))?;

        let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).map_err(|e| {
            LabelError::Transport(format!("Failed to connect to {}: {}", addr, e))
        })?;
        stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
        stream.set_nodelay(true)?;

        debug!(%addr, "connected to network printer");

        Ok(Self { stream })
    }
}

impl Backend for NetworkBackend {
    fn write_all(&mut self, data: &[u8]) -> Result<(), LabelError> {
        self.stream
            .write_all(data)
            .and_then(|_| self.stream.flush())
            .map_err(|e| LabelError::Transport(format!("Write failed: {}", e)))
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, LabelError> {
        // A zero read timeout means "block forever" to the OS
        self.stream
            .set_read_timeout(Some(timeout.max(Duration::from_millis(1))))?;

        match self.stream.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(0)
            }
            Err(e) => Err(LabelError::Transport(format!("Read failed: {}", e))),
        }
    }
}
