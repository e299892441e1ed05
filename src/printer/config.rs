//! # Printer Configuration
//!
//! Hardware specifications for supported Brother QL printers and the label
//! media they take.
//!
//! ## Print Head Geometry
//!
//! Every QL model has a fixed row of pins. A label narrower than the head is
//! placed flush against the right edge of the head, shifted by the label's
//! right offset:
//!
//! ```text
//! ├────────────── 720 pins (QL-800) ──────────────┤
//! │ 12 │           696 printable dots        │ 12 │
//!        ▲ image starts at 720 - 696 - 12 = 12
//! ```
//!
//! ## Usage
//!
//! ```
//! use qlabel::printer::{LabelSpec, Model};
//!
//! let model = Model::by_name("QL-800").unwrap();
//! let label = LabelSpec::by_name("62").unwrap();
//! assert_eq!(model.pins(), 720);
//! assert_eq!(label.printable_width(), 696);
//! assert_eq!(label.left_offset(model), 12);
//! ```

use crate::error::LabelError;
use crate::protocol::commands::{MEDIA_CONTINUOUS, MEDIA_DIE_CUT, MediaInfo};

/// # Printer Model
///
/// Defines the raster characteristics of one Brother QL model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Model {
    /// Model name as printed on the device
    pub name: &'static str,

    /// Bytes per raster row (pins / 8)
    pub bytes_per_row: u16,

    /// Extra right offset in dots (wide models only)
    pub additional_offset_r: u16,

    /// Number of NUL bytes in the invalidate preamble
    pub invalidate_bytes: usize,

    /// Supports black/red two-color tape (DK-22251)
    pub two_color: bool,

    /// Supports PackBits compression of raster rows
    pub compression: bool,

    /// Accepts ESC i a (dynamic command mode switch)
    pub mode_setting: bool,

    /// Accepts ESC i K (expanded mode)
    pub expanded_mode: bool,

    /// Has an auto cutter
    pub cutting: bool,

    /// Model code reported in byte 4 of the status reply
    pub status_code: Option<u8>,
}

impl Model {
    const fn narrow(name: &'static str, status_code: Option<u8>) -> Self {
        Self {
            name,
            bytes_per_row: 90,
            additional_offset_r: 0,
            invalidate_bytes: 200,
            two_color: false,
            compression: true,
            mode_setting: true,
            expanded_mode: true,
            cutting: true,
            status_code,
        }
    }

    pub const QL_500: Self = Self {
        compression: false,
        mode_setting: false,
        expanded_mode: false,
        cutting: false,
        ..Self::narrow("QL-500", Some(0x4F))
    };

    pub const QL_570: Self = Self {
        compression: false,
        mode_setting: false,
        ..Self::narrow("QL-570", Some(0x32))
    };

    pub const QL_700: Self = Self {
        compression: false,
        mode_setting: false,
        ..Self::narrow("QL-700", Some(0x35))
    };

    pub const QL_710W: Self = Self::narrow("QL-710W", Some(0x36));

    pub const QL_720NW: Self = Self::narrow("QL-720NW", Some(0x37));

    /// # Brother QL-800
    ///
    /// | Property | Value |
    /// |----------|-------|
    /// | Head | 720 pins (90 bytes) |
    /// | Resolution | 300 DPI |
    /// | Tape | up to 62mm, DK-22251 black/red |
    /// | Cutter | Auto |
    /// | Compression | No, rows are sent raw |
    pub const QL_800: Self = Self {
        two_color: true,
        compression: false,
        invalidate_bytes: 400,
        ..Self::narrow("QL-800", Some(0x38))
    };

    pub const QL_810W: Self = Self {
        two_color: true,
        invalidate_bytes: 400,
        ..Self::narrow("QL-810W", Some(0x39))
    };

    pub const QL_820NWB: Self = Self {
        two_color: true,
        invalidate_bytes: 400,
        ..Self::narrow("QL-820NWB", Some(0x41))
    };

    pub const QL_1060N: Self = Self {
        bytes_per_row: 162,
        additional_offset_r: 44,
        ..Self::narrow("QL-1060N", Some(0x48))
    };

    pub const QL_1100: Self = Self {
        bytes_per_row: 162,
        additional_offset_r: 44,
        invalidate_bytes: 400,
        ..Self::narrow("QL-1100", Some(0x43))
    };

    /// All supported models.
    pub const ALL: &'static [Model] = &[
        Self::QL_500,
        Self::QL_570,
        Self::QL_700,
        Self::QL_710W,
        Self::QL_720NW,
        Self::QL_800,
        Self::QL_810W,
        Self::QL_820NWB,
        Self::QL_1060N,
        Self::QL_1100,
    ];

    /// Look up a model by name (case-insensitive).
    pub fn by_name(name: &str) -> Result<Model, LabelError> {
        Self::ALL
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .copied()
            .ok_or_else(|| {
                LabelError::Config(format!(
                    "Unknown printer model '{}'. Known models: {}",
                    name,
                    Self::ALL.iter().map(|m| m.name).collect::<Vec<_>>().join(", ")
                ))
            })
    }

    /// Look up a model by the code in a status reply.
    pub fn by_status_code(code: u8) -> Option<Model> {
        Self::ALL.iter().find(|m| m.status_code == Some(code)).copied()
    }

    /// Number of pins on the print head.
    #[inline]
    pub fn pins(&self) -> u32 {
        self.bytes_per_row as u32 * 8
    }

    /// Whether the model takes the 102mm and wider media.
    #[inline]
    pub fn is_wide(&self) -> bool {
        self.bytes_per_row > 90
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::QL_800
    }
}

// ============================================================================
// LABEL MEDIA
// ============================================================================

/// Continuous tape or pre-cut labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Continuous,
    DieCut,
}

/// # Label Media Specification
///
/// Dot dimensions are at 300 DPI. For continuous tape only the width is
/// fixed; the printable height is whatever the job sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelSpec {
    /// Identifier used on the command line ("62", "29x90", ...)
    pub name: &'static str,
    pub kind: LabelKind,
    /// Tape width in millimeters
    pub width_mm: u8,
    /// Label length in millimeters, 0 for continuous
    pub length_mm: u8,
    /// Printable area in dots (width, height); height 0 for continuous
    pub dots_printable: (u32, u32),
    /// Distance from the right edge of the head in dots
    pub offset_r: u32,
    /// Feed margin in dots (ESC i d)
    pub feed_margin: u16,
    /// Black/red/white DK-22251 tape
    pub red: bool,
}

impl LabelSpec {
    const fn continuous(name: &'static str, width_mm: u8, printable: u32, offset_r: u32) -> Self {
        Self {
            name,
            kind: LabelKind::Continuous,
            width_mm,
            length_mm: 0,
            dots_printable: (printable, 0),
            offset_r,
            feed_margin: 35,
            red: false,
        }
    }

    const fn die_cut(
        name: &'static str,
        size_mm: (u8, u8),
        printable: (u32, u32),
        offset_r: u32,
    ) -> Self {
        Self {
            name,
            kind: LabelKind::DieCut,
            width_mm: size_mm.0,
            length_mm: size_mm.1,
            dots_printable: printable,
            offset_r,
            feed_margin: 0,
            red: false,
        }
    }

    /// All supported media.
    pub const ALL: &'static [LabelSpec] = &[
        Self::continuous("12", 12, 106, 29),
        Self::continuous("29", 29, 306, 6),
        Self::continuous("38", 38, 413, 12),
        Self::continuous("50", 50, 554, 12),
        Self::continuous("54", 54, 590, 0),
        Self::continuous("62", 62, 696, 12),
        Self {
            red: true,
            ..Self::continuous("62red", 62, 696, 12)
        },
        Self::continuous("102", 102, 1164, 12),
        Self::die_cut("17x54", (17, 54), (165, 566), 0),
        Self::die_cut("29x90", (29, 90), (306, 991), 6),
        Self::die_cut("62x29", (62, 29), (696, 271), 12),
        Self::die_cut("62x100", (62, 100), (696, 1109), 12),
    ];

    /// Look up a label by identifier.
    pub fn by_name(name: &str) -> Result<LabelSpec, LabelError> {
        Self::ALL
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
            .copied()
            .ok_or_else(|| {
                LabelError::Config(format!(
                    "Unknown label '{}'. Known labels: {}",
                    name,
                    Self::ALL.iter().map(|l| l.name).collect::<Vec<_>>().join(", ")
                ))
            })
    }

    /// Printable width in dots.
    #[inline]
    pub fn printable_width(&self) -> u32 {
        self.dots_printable.0
    }

    /// Fixed printable height in dots, `None` for continuous tape.
    pub fn printable_height(&self) -> Option<u32> {
        match self.kind {
            LabelKind::Continuous => None,
            LabelKind::DieCut => Some(self.dots_printable.1),
        }
    }

    /// X position (in pins) where the image starts inside a raster row.
    pub fn left_offset(&self, model: Model) -> u32 {
        model
            .pins()
            .saturating_sub(self.printable_width())
            .saturating_sub(self.offset_r + model.additional_offset_r as u32)
    }

    /// Media bytes for ESC i z.
    pub fn media_info(&self) -> MediaInfo {
        MediaInfo {
            media_type: match self.kind {
                LabelKind::Continuous => MEDIA_CONTINUOUS,
                LabelKind::DieCut => MEDIA_DIE_CUT,
            },
            width_mm: self.width_mm,
            length_mm: self.length_mm,
        }
    }

    /// Check that this media fits the given model.
    pub fn check_model(&self, model: Model) -> Result<(), LabelError> {
        if self.printable_width() + self.offset_r + model.additional_offset_r as u32 > model.pins()
        {
            return Err(LabelError::Config(format!(
                "Label '{}' is too wide for {}",
                self.name, model.name
            )));
        }
        if self.red && !model.two_color {
            return Err(LabelError::Config(format!(
                "{} cannot print two-color label '{}'",
                model.name, self.name
            )));
        }
        Ok(())
    }
}

impl Default for LabelSpec {
    fn default() -> Self {
        // 62mm continuous, the stock QL-800 roll
        Self::continuous("62", 62, 696, 12)
    }
}

// ============================================================================
// PRINT OPTIONS
// ============================================================================

/// Conversion and finishing options for one job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintOptions {
    /// Darkness threshold in percent. Pixels darker than `100 - threshold`
    /// percent gray print black.
    pub threshold: f32,
    /// Send two-color rows (black/red tape)
    pub red: bool,
    /// Cut after each label
    pub autocut: bool,
    /// Cut at the end of the job
    pub cut_at_end: bool,
    /// Prefer print quality over speed
    pub high_quality: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            threshold: 70.0,
            red: false,
            autocut: true,
            cut_at_end: true,
            high_quality: true,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
