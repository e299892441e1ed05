//! # Print Dispatch
//!
//! Sends finished raster jobs to a printer. A job either reaches the device
//! or the caller gets an error back; there are no retries.
//!
//! The [`Printer`] trait is what the HTTP server talks to, so tests can swap
//! in a recording printer. [`DevicePrinter`] is the real one: it resolves a
//! backend identifier and opens the device fresh for every job.

use std::time::Duration;

use image::{DynamicImage, imageops};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::LabelError;
use crate::printer::{LabelKind, LabelSpec};
use crate::protocol::commands;
use crate::protocol::raster::Raster;
use crate::protocol::status::{PrinterStatus, STATUS_LEN};
use crate::transport::usb::{self, Sysfs};
use crate::transport::{self, Identifier};

/// How long to wait for a status reply.
const STATUS_TIMEOUT: Duration = Duration::from_secs(2);

/// Whether the configured printer can take a job right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub message: String,
    pub available_devices: Vec<String>,
}

impl ConnectionStatus {
    fn up(message: impl Into<String>, available_devices: Vec<String>) -> Self {
        Self {
            connected: true,
            message: message.into(),
            available_devices,
        }
    }

    fn down(message: impl Into<String>, available_devices: Vec<String>) -> Self {
        Self {
            connected: false,
            message: message.into(),
            available_devices,
        }
    }
}

/// A destination for raster jobs.
pub trait Printer: Send + Sync {
    /// Check the configured printer without printing.
    fn status(&self) -> ConnectionStatus;

    /// Identifiers of every printer that could be used.
    fn devices(&self) -> Vec<String>;

    /// Send one job.
    fn print(&self, raster: &Raster) -> Result<(), LabelError>;
}

/// Printer reached through a backend identifier (`usb://`, `tcp://`, a
/// device path).
#[derive(Debug, Clone)]
pub struct DevicePrinter {
    identifier: String,
    sysfs: Sysfs,
}

impl DevicePrinter {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            sysfs: Sysfs::default(),
        }
    }

    /// Use a different sysfs root for USB discovery.
    pub fn with_sysfs(mut self, sysfs: Sysfs) -> Self {
        self.sysfs = sysfs;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    fn open(&self) -> Result<Box<dyn transport::Backend>, LabelError> {
        match Identifier::parse(&self.identifier)? {
            Identifier::Usb {
                vendor_id,
                product_id,
                serial,
            } => {
                let node =
                    usb::find_device_node(&self.sysfs, vendor_id, product_id, serial.as_deref())?;
                transport::open(&node.to_string_lossy())
            }
            _ => transport::open(&self.identifier),
        }
    }

    /// Ask the printer for its 32-byte status reply.
    pub fn query_status(&self) -> Result<PrinterStatus, LabelError> {
        let mut backend = self.open()?;

        let mut request = commands::invalidate(200);
        request.extend(commands::initialize());
        request.extend(commands::status_request());
        backend.write_all(&request)?;

        let mut buf = [0u8; STATUS_LEN];
        let mut filled = 0;
        while filled < STATUS_LEN {
            let n = backend.read(&mut buf[filled..], STATUS_TIMEOUT)?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled < STATUS_LEN {
            return Err(LabelError::Transport(format!(
                "Printer sent {} of {} status bytes",
                filled, STATUS_LEN
            )));
        }

        PrinterStatus::parse(&buf)
    }

    fn usb_status(&self, vendor_id: u16, product_id: u16, serial: Option<&str>) -> ConnectionStatus {
        let brother = usb::brother_devices(&self.sysfs);
        if brother.is_empty() {
            return ConnectionStatus::down(
                "No Brother devices found. Please check if the printer is connected and powered on.",
                Vec::new(),
            );
        }

        let available: Vec<String> = brother.iter().map(|d| d.identifier()).collect();
        let target_present = brother
            .iter()
            .any(|d| d.vendor_id == vendor_id && d.product_id == product_id);

        match usb::find_device_node(&self.sysfs, vendor_id, product_id, serial) {
            Ok(node) => ConnectionStatus::up(
                format!(
                    "Printer found: Vendor 0x{:04x}, Product 0x{:04x} at {}",
                    vendor_id,
                    product_id,
                    node.display()
                ),
                vec![format!("usb://0x{:04x}:0x{:04x}", vendor_id, product_id)],
            ),
            Err(e) if target_present => ConnectionStatus::down(e.to_string(), available),
            Err(_) => ConnectionStatus::down(
                format!(
                    "Brother devices found but not the expected one. Available: {:?}",
                    available
                ),
                available,
            ),
        }
    }
}

impl Printer for DevicePrinter {
    fn status(&self) -> ConnectionStatus {
        let status = match Identifier::parse(&self.identifier) {
            Ok(Identifier::Usb {
                vendor_id,
                product_id,
                serial,
            }) => self.usb_status(vendor_id, product_id, serial.as_deref()),
            Ok(Identifier::File(path)) => {
                if path.exists() {
                    ConnectionStatus::up(
                        format!("Printer device {} present", path.display()),
                        vec![self.identifier.clone()],
                    )
                } else {
                    ConnectionStatus::down(
                        format!("Printer device {} does not exist", path.display()),
                        Vec::new(),
                    )
                }
            }
            Ok(Identifier::Network { host, port }) => {
                match transport::network::NetworkBackend::connect(&host, port) {
                    Ok(_) => ConnectionStatus::up(
                        format!("Printer reachable at {}:{}", host, port),
                        vec![self.identifier.clone()],
                    ),
                    Err(e) => ConnectionStatus::down(e.to_string(), Vec::new()),
                }
            }
            Err(e) => ConnectionStatus::down(
                format!("Error checking printer connection: {}", e),
                Vec::new(),
            ),
        };

        debug!(connected = status.connected, message = %status.message, "printer status");
        status
    }

    fn devices(&self) -> Vec<String> {
        let mut devices: Vec<String> = usb::brother_devices(&self.sysfs)
            .iter()
            .filter(|d| d.device_node.is_some())
            .map(|d| d.identifier())
            .collect();

        if !self.identifier.starts_with("usb://") && !devices.contains(&self.identifier) {
            devices.push(self.identifier.clone());
        }
        devices
    }

    fn print(&self, raster: &Raster) -> Result<(), LabelError> {
        let data = raster.to_bytes();
        let mut backend = self.open()?;

        info!(
            printer = %self.identifier,
            rows = raster.height(),
            bytes = data.len(),
            two_color = raster.is_two_color(),
            "sending job"
        );
        backend.write_all(&data)?;

        Ok(())
    }
}

/// Fit an arbitrary image to a label's printable area.
///
/// Continuous tape takes any length, so a width mismatch is fixed by
/// resizing proportionally. Die-cut labels must already match exactly.
pub fn prepare_image(image: DynamicImage, label: &LabelSpec) -> Result<DynamicImage, LabelError> {
    let width = label.printable_width();

    match label.kind {
        LabelKind::Continuous => {
            if image.width() == 0 || image.height() == 0 {
                return Err(LabelError::InvalidImage("Image has no pixels".to_string()));
            }
            if image.width() == width {
                return Ok(image);
            }
            let height = ((image.height() as u64 * width as u64) / image.width() as u64).max(1);
            warn!(
                from = image.width(),
                to = width,
                "resizing image to label width"
            );
            Ok(image.resize_exact(width, height as u32, imageops::FilterType::Lanczos3))
        }
        LabelKind::DieCut => {
            let height = label.printable_height().unwrap_or(0);
            if image.width() == width && image.height() == height {
                Ok(image)
            } else {
                Err(LabelError::InvalidImage(format!(
                    "Image is {}x{}, die-cut label '{}' needs {}x{}",
                    image.width(),
                    image.height(),
                    label.name,
                    width,
                    height
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::os::unix::fs::symlink;
    use std::path::PathBuf;

    fn fake_sysfs(products: &[(&str, &str, bool)]) -> (tempfile::TempDir, Sysfs) {
        let root = tempfile::tempdir().unwrap();
        let devices = root.path().join("devices");
        let usbmisc = root.path().join("usbmisc");
        fs::create_dir_all(&devices).unwrap();
        fs::create_dir_all(&usbmisc).unwrap();

        for (i, (name, product, bound)) in products.iter().enumerate() {
            let dev = devices.join(name);
            let interface = dev.join(format!("{}:1.0", name));
            fs::create_dir_all(&interface).unwrap();
            fs::write(dev.join("idVendor"), "04f9\n").unwrap();
            fs::write(dev.join("idProduct"), format!("{}\n", product)).unwrap();
            if *bound {
                let lp = usbmisc.join(format!("lp{}", i));
                fs::create_dir_all(&lp).unwrap();
                symlink(&interface, lp.join("device")).unwrap();
            }
        }

        let sysfs = Sysfs {
            usb_devices: devices,
            usbmisc,
            dev_dir: root.path().join("dev"),
        };
        (root, sysfs)
    }

    #[test]
    fn test_status_no_brother_devices() {
        let (_root, sysfs) = fake_sysfs(&[]);
        let printer = DevicePrinter::new("usb://0x04f9:0x209b").with_sysfs(sysfs);
        let status = printer.status();
        assert!(!status.connected);
        assert!(status.message.starts_with("No Brother devices found"));
        assert!(status.available_devices.is_empty());
    }

    #[test]
    fn test_status_connected() {
        let (_root, sysfs) = fake_sysfs(&[("1-1", "209b", true)]);
        let printer = DevicePrinter::new("usb://0x04f9:0x209b").with_sysfs(sysfs);
        let status = printer.status();
        assert!(status.connected, "{}", status.message);
        assert_eq!(status.available_devices, vec!["usb://0x04f9:0x209b"]);
        assert_eq!(printer.devices(), vec!["usb://0x04f9:0x209b"]);
    }

    #[test]
    fn test_status_other_brother_device() {
        let (_root, sysfs) = fake_sysfs(&[("1-1", "2042", true)]);
        let printer = DevicePrinter::new("usb://0x04f9:0x209b").with_sysfs(sysfs);
        let status = printer.status();
        assert!(!status.connected);
        assert!(status.message.contains("not the expected one"));
        assert_eq!(status.available_devices, vec!["usb://0x04f9:0x2042"]);
    }

    #[test]
    fn test_status_without_usblp() {
        let (_root, sysfs) = fake_sysfs(&[("1-1", "209b", false)]);
        let printer = DevicePrinter::new("usb://0x04f9:0x209b").with_sysfs(sysfs);
        let status = printer.status();
        assert!(!status.connected);
        assert!(status.message.contains("usblp"));
    }

    #[test]
    fn test_status_bad_identifier() {
        let status = DevicePrinter::new("bluetooth://nope").status();
        assert!(!status.connected);
        assert!(status.message.starts_with("Error checking printer connection"));
    }

    #[test]
    fn test_print_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.bin");
        fs::write(&path, b"").unwrap();

        let label = LabelSpec::by_name("62").unwrap();
        let img = GrayImage::from_pixel(label.printable_width(), 20, Luma([0]));
        let raster = Raster::from_gray(
            &img,
            label,
            crate::printer::Model::default(),
            &Default::default(),
        )
        .unwrap();

        let printer = DevicePrinter::new(path.to_string_lossy().into_owned());
        assert!(printer.status().connected);
        printer.print(&raster).unwrap();

        let written = fs::read(&path).unwrap();
        assert_eq!(written, raster.to_bytes());
    }

    #[test]
    fn test_print_missing_usb_device() {
        let (_root, sysfs) = fake_sysfs(&[]);
        let printer = DevicePrinter::new("usb://0x04f9:0x209b").with_sysfs(sysfs);

        let label = LabelSpec::default();
        let img = GrayImage::from_pixel(label.printable_width(), 4, Luma([255]));
        let raster =
            Raster::from_gray(&img, label, Default::default(), &Default::default()).unwrap();

        assert!(matches!(
            printer.print(&raster),
            Err(LabelError::PrinterNotFound(_))
        ));
    }

    #[test]
    fn test_prepare_image_continuous_resizes() {
        let label = LabelSpec::by_name("62").unwrap();
        let img = DynamicImage::ImageLuma8(GrayImage::new(348, 100));
        let out = prepare_image(img, &label).unwrap();
        assert_eq!((out.width(), out.height()), (696, 200));
    }

    #[test]
    fn test_prepare_image_die_cut_must_match() {
        let label = LabelSpec::by_name("62x29").unwrap();
        let img = DynamicImage::ImageLuma8(GrayImage::new(696, 100));
        assert!(matches!(
            prepare_image(img, &label),
            Err(LabelError::InvalidImage(_))
        ));

        let img = DynamicImage::ImageLuma8(GrayImage::new(696, 271));
        assert!(prepare_image(img, &label).is_ok());
    }

    #[test]
    fn test_devices_lists_bound_printers() {
        let (_root, sysfs) = fake_sysfs(&[("1-1", "209b", true), ("1-2", "2042", false)]);
        let printer = DevicePrinter::new("usb://0x04f9:0x209b").with_sysfs(sysfs);
        assert_eq!(printer.devices(), vec!["usb://0x04f9:0x209b"]);

        let other = DevicePrinter::new(PathBuf::from("/dev/usb/lp3").to_string_lossy());
        assert!(other.devices().contains(&"/dev/usb/lp3".to_string()));
    }
}
