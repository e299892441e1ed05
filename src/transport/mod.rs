//! # Printer Transport Layer
//!
//! This module provides communication backends for sending raster jobs to
//! printers.
//!
//! ## Available Transports
//!
//! - [`file`]: Kernel `usblp` device nodes (`/dev/usb/lp0`)
//! - [`network`]: Raw TCP on port 9100 (network-capable QL models)
//! - [`usb`]: sysfs discovery that resolves `usb://` identifiers to device nodes
//!
//! ## Identifiers
//!
//! | Identifier | Backend |
//! |------------|---------|
//! | `usb://0x04f9:0x209b` | first matching USB printer |
//! | `usb://0x04f9:0x209b/000G0Z123456` | USB printer with that serial |
//! | `file:///dev/usb/lp0` or `/dev/usb/lp0` | device node |
//! | `tcp://192.168.1.21` or `tcp://host:9100` | network |

pub mod file;
pub mod network;
pub mod usb;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::LabelError;

pub use file::FileBackend;
pub use network::NetworkBackend;

/// Backend names reported by the device listing.
pub const AVAILABLE_BACKENDS: &[&str] = &["linux_kernel", "network", "usb"];

/// A connection to one printer.
pub trait Backend: Send {
    /// Write a complete job.
    fn write_all(&mut self, data: &[u8]) -> Result<(), LabelError>;

    /// Read whatever the printer sent back, waiting at most `timeout`.
    /// Returns 0 when nothing arrived in time.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, LabelError>;
}

/// A parsed printer identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Usb {
        vendor_id: u16,
        product_id: u16,
        serial: Option<String>,
    },
    File(PathBuf),
    Network {
        host: String,
        port: u16,
    },
}

impl Identifier {
    /// Parse an identifier string.
    ///
    /// ```
    /// use qlabel::transport::Identifier;
    ///
    /// let id = Identifier::parse("usb://0x04f9:0x209b").unwrap();
    /// assert_eq!(
    ///     id,
    ///     Identifier::Usb { vendor_id: 0x04f9, product_id: 0x209b, serial: None }
    /// );
    /// ```
    pub fn parse(s: &str) -> Result<Self, LabelError> {
        let s = s.trim();

        if let Some(rest) = s.strip_prefix("usb://") {
            let (ids, serial) = match rest.split_once('/') {
                Some((ids, serial)) if !serial.is_empty() => (ids, Some(serial.to_string())),
                Some((ids, _)) => (ids, None),
                None => (rest, None),
            };
            let (vendor, product) = ids.split_once(':').ok_or_else(|| {
                LabelError::Config(format!("Expected usb://VENDOR:PRODUCT, got '{}'", s))
            })?;
            return Ok(Self::Usb {
                vendor_id: parse_hex_id(vendor)?,
                product_id: parse_hex_id(product)?,
                serial,
            });
        }

        if let Some(path) = s.strip_prefix("file://") {
            return Ok(Self::File(PathBuf::from(path)));
        }

        if let Some(rest) = s.strip_prefix("tcp://") {
            let rest = rest.trim_end_matches('/');
            let (host, port) = match rest.rsplit_once(':') {
                Some((host, port)) => {
                    let port = port
                        .parse()
                        .map_err(|_| LabelError::Config(format!("Invalid port in '{}'", s)))?;
                    (host, port)
                }
                None => (rest, network::DEFAULT_PORT),
            };
            if host.is_empty() {
                return Err(LabelError::Config(format!("Missing host in '{}'", s)));
            }
            return Ok(Self::Network {
                host: host.to_string(),
                port,
            });
        }

        if s.starts_with('/') {
            return Ok(Self::File(PathBuf::from(s)));
        }

        Err(LabelError::Config(format!(
            "Unknown printer identifier '{}'. Use usb://, file://, tcp:// or a device path",
            s
        )))
    }
}

fn parse_hex_id(s: &str) -> Result<u16, LabelError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u16::from_str_radix(digits, 16)
        .map_err(|_| LabelError::Config(format!("Invalid USB id '{}'", s)))
}

/// Open the backend an identifier points at.
pub fn open(identifier: &str) -> Result<Box<dyn Backend>, LabelError> {
    match Identifier::parse(identifier)? {
        Identifier::Usb {
            vendor_id,
            product_id,
            serial,
        } => {
            let node = usb::find_device_node(
                &usb::Sysfs::default(),
                vendor_id,
                product_id,
                serial.as_deref(),
            )?;
            Ok(Box::new(FileBackend::open(node)?))
        }
        Identifier::File(path) => Ok(Box::new(FileBackend::open(path)?)),
        Identifier::Network { host, port } => Ok(Box::new(NetworkBackend::connect(&host, port)?)),
    }
}
