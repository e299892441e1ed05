//! # USB Printer Discovery
//!
//! Finds Brother printers through sysfs and maps them to the device node
//! the `usblp` kernel driver created for them.
//!
//! ```text
//! /sys/bus/usb/devices/1-1/idVendor          04f9
//! /sys/bus/usb/devices/1-1/idProduct         209b
//! /sys/class/usbmisc/lp0/device  ──symlink──► …/1-1/1-1:1.0
//!                                             └─ parent is the 1-1 device
//! /dev/usb/lp0                               the node we write to
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::LabelError;

/// Brother Industries USB vendor id
pub const BROTHER_VENDOR_ID: u16 = 0x04f9;

/// QL-800 on USB, the default printer
pub const DEFAULT_PRINTER: &str = "usb://0x04f9:0x209b";

/// Where to look for devices. Overridable so discovery can run against a
/// fake tree.
#[derive(Debug, Clone)]
pub struct Sysfs {
    /// `/sys/bus/usb/devices`
    pub usb_devices: PathBuf,
    /// `/sys/class/usbmisc`
    pub usbmisc: PathBuf,
    /// `/dev/usb`
    pub dev_dir: PathBuf,
}

impl Default for Sysfs {
    fn default() -> Self {
        Self {
            usb_devices: PathBuf::from("/sys/bus/usb/devices"),
            usbmisc: PathBuf::from("/sys/class/usbmisc"),
            dev_dir: PathBuf::from("/dev/usb"),
        }
    }
}

/// One USB device found in sysfs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsbDevice {
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial: Option<String>,
    pub product: Option<String>,
    /// usblp node, if the kernel driver is bound
    pub device_node: Option<PathBuf>,
    #[serde(skip)]
    sysfs_path: PathBuf,
}

impl UsbDevice {
    /// `usb://0xVVVV:0xPPPP` identifier for this device.
    pub fn identifier(&self) -> String {
        format!("usb://0x{:04x}:0x{:04x}", self.vendor_id, self.product_id)
    }

    fn matches(&self, vendor_id: u16, product_id: u16, serial: Option<&str>) -> bool {
        self.vendor_id == vendor_id
            && self.product_id == product_id
            && serial.is_none_or(|s| self.serial.as_deref() == Some(s))
    }
}

/// List USB devices from a given vendor, with their usblp nodes attached.
pub fn discover(sysfs: &Sysfs, vendor_id: u16) -> Vec<UsbDevice> {
    let mut devices: Vec<UsbDevice> = list_dirs(&sysfs.usb_devices)
        .into_iter()
        .filter_map(|dir| read_device(&dir))
        .filter(|d| d.vendor_id == vendor_id)
        .collect();

    for (name, parent) in lp_nodes(&sysfs.usbmisc) {
        if let Some(device) = devices.iter_mut().find(|d| d.sysfs_path == parent) {
            device.device_node = Some(sysfs.dev_dir.join(&name));
        }
    }

    devices.sort_by(|a, b| a.sysfs_path.cmp(&b.sysfs_path));
    debug!(count = devices.len(), vendor = %format!("0x{:04x}", vendor_id), "usb scan");
    devices
}

/// All Brother devices on the bus.
pub fn brother_devices(sysfs: &Sysfs) -> Vec<UsbDevice> {
    discover(sysfs, BROTHER_VENDOR_ID)
}

/// Resolve a USB identifier to the device node to write to.
pub fn find_device_node(
    sysfs: &Sysfs,
    vendor_id: u16,
    product_id: u16,
    serial: Option<&str>,
) -> Result<PathBuf, LabelError> {
    let devices = discover(sysfs, vendor_id);
    let device = devices
        .iter()
        .find(|d| d.matches(vendor_id, product_id, serial))
        .ok_or_else(|| {
            LabelError::PrinterNotFound(format!(
                "No USB device 0x{:04x}:0x{:04x}{} is connected",
                vendor_id,
                product_id,
                serial.map(|s| format!(" with serial {}", s)).unwrap_or_default()
            ))
        })?;

    device.device_node.clone().ok_or_else(|| {
        LabelError::PrinterNotFound(format!(
            "{} is connected but has no usblp device node (is the usblp module loaded?)",
            device.identifier()
        ))
    })
}

fn list_dirs(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}

fn read_attr(dir: &Path, name: &str) -> Option<String> {
    fs::read_to_string(dir.join(name))
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn read_device(dir: &Path) -> Option<UsbDevice> {
    let vendor_id = u16::from_str_radix(&read_attr(dir, "idVendor")?, 16).ok()?;
    let product_id = u16::from_str_radix(&read_attr(dir, "idProduct")?, 16).ok()?;
    let sysfs_path = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());

    Some(UsbDevice {
        vendor_id,
        product_id,
        serial: read_attr(dir, "serial"),
        product: read_attr(dir, "product"),
        device_node: None,
        sysfs_path,
    })
}

/// `(lpN, device dir)` for every usblp node.
fn lp_nodes(usbmisc: &Path) -> Vec<(String, PathBuf)> {
    list_dirs(usbmisc)
        .into_iter()
        .filter_map(|entry| {
            let name = entry.file_name()?.to_str()?.to_string();
            if !name.starts_with("lp") {
                return None;
            }
            let interface = fs::canonicalize(entry.join("device")).ok()?;
            let parent = interface.parent()?.to_path_buf();
            Some((name, parent))
        })
        .collect()
}
