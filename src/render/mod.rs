//! # Label Rendering
//!
//! Turns a short piece of text into a label-sized grayscale bitmap.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ 2026-10-19 14:05                             │  date stamp, 40px
//! │                                              │  gap
//! │               Apple Juice For                │
//! │                The Break Room                │  auto-fitted text
//! │                                              │
//! └──────────────────────────────────────────────┘
//!                   696 x 271
//! ```
//!
//! - [`layout`]: line splitting, font fitting and the label composition
//! - [`font`]: outline fonts with a built-in bitmap fallback
//! - [`image`]: fitting photos and banners to the tape

pub mod font;
pub mod image;
pub mod layout;

use std::io::Cursor;

use ::image::{GrayImage, ImageFormat};
use serde::Deserialize;

use crate::error::LabelError;

pub use font::{FontBook, LabelFace, TextExtent};
pub use layout::{LayoutConfig, fit_font, render_label, split_lines, split_lines_by};

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn encloses(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Text to put on a label, plus optional style hints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelRequest {
    pub text: String,
    #[serde(default = "default_true")]
    pub title_case: bool,
    #[serde(default = "default_true")]
    pub timestamp: bool,
}

fn default_true() -> bool {
    true
}

impl LabelRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            title_case: true,
            timestamp: true,
        }
    }

    /// The text as it will appear on the label.
    pub fn formatted_text(&self) -> String {
        let text = self.text.trim();
        if self.title_case {
            title_case(text)
        } else {
            text.to_string()
        }
    }
}

/// A composed label bitmap and how it was laid out.
#[derive(Debug, Clone)]
pub struct RenderedLabel {
    pub image: GrayImage,
    /// Chosen text size in pixels
    pub font_size: u32,
    pub lines: Vec<String>,
    /// Where the text block landed
    pub text_box: Rect,
    /// Area the text is allowed to occupy
    pub content_box: Rect,
    /// True when the built-in bitmap font was used for the text
    pub fallback: bool,
}

impl RenderedLabel {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, LabelError> {
        encode_png(&self.image)
    }
}

/// Encode a grayscale image as PNG bytes.
pub fn encode_png(img: &GrayImage) -> Result<Vec<u8>, LabelError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| LabelError::Image(format!("PNG encoding failed: {}", e)))?;
    Ok(buf.into_inner())
}

/// Title-case like Python's `str.title`: the first letter of every run of
/// letters is uppercased, the rest lowercased.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }

    out
}
