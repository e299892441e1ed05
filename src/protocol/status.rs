//! # Status Reply Parsing
//!
//! After `ESC i S` (and during printing) the printer sends a fixed 32-byte
//! status block:
//!
//! | Byte | Meaning |
//! |------|---------|
//! | 0-3 | 0x80 0x20 'B' '4' (head mark, size, Brother, series) |
//! | 4 | Model code |
//! | 8 | Error information 1 |
//! | 9 | Error information 2 |
//! | 10 | Media width (mm) |
//! | 11 | Media type |
//! | 17 | Media length (mm) |
//! | 18 | Status type |
//! | 19 | Phase type |

use serde::Serialize;

use crate::error::LabelError;
use crate::printer::Model;

/// Length of a status reply.
pub const STATUS_LEN: usize = 32;

const ERRORS_1: [(u8, &str); 8] = [
    (0x01, "No media"),
    (0x02, "End of media"),
    (0x04, "Cutter jam"),
    (0x08, "Weak batteries"),
    (0x10, "Printer in use"),
    (0x20, "Printer turned off"),
    (0x40, "High-voltage adapter"),
    (0x80, "Fan motor error"),
];

const ERRORS_2: [(u8, &str); 8] = [
    (0x01, "Replace media"),
    (0x02, "Expansion buffer full"),
    (0x04, "Communication error"),
    (0x08, "Communication buffer full"),
    (0x10, "Cover open"),
    (0x20, "Overheating"),
    (0x40, "Media cannot be fed"),
    (0x80, "System error"),
];

/// What triggered the status reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusType {
    Reply,
    PrintingCompleted,
    Error,
    TurnedOff,
    Notification,
    PhaseChange,
    Unknown(u8),
}

impl From<u8> for StatusType {
    fn from(b: u8) -> Self {
        match b {
            0x00 => Self::Reply,
            0x01 => Self::PrintingCompleted,
            0x02 => Self::Error,
            0x04 => Self::TurnedOff,
            0x05 => Self::Notification,
            0x06 => Self::PhaseChange,
            other => Self::Unknown(other),
        }
    }
}

/// Decoded status block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrinterStatus {
    /// Model name if the code is known
    pub model: Option<&'static str>,
    pub model_code: u8,
    pub errors: Vec<&'static str>,
    pub media_width_mm: u8,
    pub media_length_mm: u8,
    /// "continuous", "die-cut" or "none"
    pub media_type: &'static str,
    pub status_type: StatusType,
    /// True while the printer is printing (phase type 1)
    pub printing: bool,
}

impl PrinterStatus {
    /// Parse a 32-byte status reply.
    ///
    /// ```
    /// use qlabel::protocol::status::PrinterStatus;
    ///
    /// let mut reply = [0u8; 32];
    /// reply[..4].copy_from_slice(&[0x80, 0x20, b'B', b'4']);
    /// reply[4] = 0x38;
    /// reply[10] = 62;
    /// reply[11] = 0x0A;
    ///
    /// let status = PrinterStatus::parse(&reply).unwrap();
    /// assert_eq!(status.model, Some("QL-800"));
    /// assert!(status.is_ready());
    /// ```
    pub fn parse(data: &[u8]) -> Result<Self, LabelError> {
        if data.len() != STATUS_LEN {
            return Err(LabelError::Transport(format!(
                "Status reply must be {} bytes, got {}",
                STATUS_LEN,
                data.len()
            )));
        }
        if data[0] != 0x80 || data[1] != 0x20 || data[2] != b'B' {
            return Err(LabelError::Transport(format!(
                "Not a Brother status reply (header {:02x} {:02x} {:02x})",
                data[0], data[1], data[2]
            )));
        }

        let mut errors = Vec::new();
        for (bit, name) in ERRORS_1 {
            if data[8] & bit != 0 {
                errors.push(name);
            }
        }
        for (bit, name) in ERRORS_2 {
            if data[9] & bit != 0 {
                errors.push(name);
            }
        }

        Ok(Self {
            model: Model::by_status_code(data[4]).map(|m| m.name),
            model_code: data[4],
            errors,
            media_width_mm: data[10],
            media_length_mm: data[17],
            media_type: match data[11] {
                0x0A => "continuous",
                0x0B => "die-cut",
                _ => "none",
            },
            status_type: StatusType::from(data[18]),
            printing: data[19] == 0x01,
        })
    }

    /// No errors reported and media is loaded.
    pub fn is_ready(&self) -> bool {
        self.errors.is_empty() && self.media_type != "none"
    }
}
