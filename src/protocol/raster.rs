//! # Image → Raster Job Conversion
//!
//! Converts a label image into the row-by-row bit planes the print head
//! expects and serializes the complete job.
//!
//! ## Bit Packing
//!
//! Each row is `bytes_per_row` bytes covering every pin on the head.
//! Bit 7 (MSB) of byte 0 is the first pin, 1 = print. The image is mirrored
//! horizontally: the head sees the label from the back side.
//!
//! ```text
//! image x:      0 1 2 ... 695
//! head pin:   707 706 ... 12      (QL-800, 62mm tape)
//! ```
//!
//! ## Thresholding
//!
//! A pixel prints black when its darkness `255 - luma` reaches
//! `(100 - threshold)%` of full scale. With the default threshold of 70,
//! anything darker than roughly 70% white prints.
//!
//! In two-color mode the red plane is split out with an HSV filter: hue
//! near red, saturation > 100 and value > 80 (all on a 0-255 scale).

use image::{DynamicImage, GrayImage, RgbImage};

use super::commands::{self, Plane};
use super::packbits;
use crate::error::LabelError;
use crate::printer::{LabelSpec, Model, PrintOptions};

/// One raster row: the black plane and, in two-color mode, the red plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterRow {
    pub black: Vec<u8>,
    pub red: Option<Vec<u8>>,
}

/// A complete single-page raster job.
#[derive(Debug, Clone)]
pub struct Raster {
    model: Model,
    label: LabelSpec,
    options: PrintOptions,
    rows: Vec<RasterRow>,
}

impl Raster {
    /// Convert a grayscale label image.
    pub fn from_gray(
        img: &GrayImage,
        label: LabelSpec,
        model: Model,
        options: &PrintOptions,
    ) -> Result<Self, LabelError> {
        let cutoff = darkness_cutoff(options.threshold);
        let two_color = two_color_enabled(label, model, options);
        Self::build(img.width(), img.height(), label, model, options, |x, y| {
            let luma = img.get_pixel(x, y)[0];
            let black = 255 - luma >= cutoff;
            (black, two_color.then_some(false))
        })
    }

    /// Convert an RGB image, splitting out red pixels on two-color tape.
    pub fn from_rgb(
        img: &RgbImage,
        label: LabelSpec,
        model: Model,
        options: &PrintOptions,
    ) -> Result<Self, LabelError> {
        let cutoff = darkness_cutoff(options.threshold);
        let two_color = two_color_enabled(label, model, options);
        Self::build(img.width(), img.height(), label, model, options, |x, y| {
            let [r, g, b] = img.get_pixel(x, y).0;
            let luma = ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8;
            if two_color {
                let red = is_red(r, g, b);
                let black = !red && 255 - luma >= cutoff;
                (black, Some(red))
            } else {
                (255 - luma >= cutoff, None)
            }
        })
    }

    /// Convert any decoded image.
    pub fn from_image(
        img: &DynamicImage,
        label: LabelSpec,
        model: Model,
        options: &PrintOptions,
    ) -> Result<Self, LabelError> {
        if two_color_enabled(label, model, options) {
            Self::from_rgb(&img.to_rgb8(), label, model, options)
        } else {
            Self::from_gray(&img.to_luma8(), label, model, options)
        }
    }

    fn build<F>(
        width: u32,
        height: u32,
        label: LabelSpec,
        model: Model,
        options: &PrintOptions,
        pixel: F,
    ) -> Result<Self, LabelError>
    where
        F: Fn(u32, u32) -> (bool, Option<bool>),
    {
        label.check_model(model)?;

        if width != label.printable_width() {
            return Err(LabelError::InvalidImage(format!(
                "Image is {} dots wide, label '{}' needs {}",
                width,
                label.name,
                label.printable_width()
            )));
        }
        if let Some(expected) = label.printable_height()
            && height != expected
        {
            return Err(LabelError::InvalidImage(format!(
                "Image is {} dots tall, die-cut label '{}' needs {}",
                height, label.name, expected
            )));
        }
        if height == 0 {
            return Err(LabelError::InvalidImage("Image has no rows".to_string()));
        }

        let pins = model.pins();
        let offset = label.left_offset(model);
        let row_bytes = model.bytes_per_row as usize;

        let mut rows = Vec::with_capacity(height as usize);
        for y in 0..height {
            let mut black = vec![0u8; row_bytes];
            let mut red: Option<Vec<u8>> = None;

            for x in 0..width {
                let (is_black, is_red) = pixel(x, y);
                let pin = (pins - 1 - (offset + x)) as usize;

                if is_black {
                    black[pin / 8] |= 0x80 >> (pin % 8);
                }
                if let Some(is_red) = is_red {
                    let plane = red.get_or_insert_with(|| vec![0u8; row_bytes]);
                    if is_red {
                        plane[pin / 8] |= 0x80 >> (pin % 8);
                    }
                }
            }

            rows.push(RasterRow { black, red });
        }

        Ok(Self {
            model,
            label,
            options: *options,
            rows,
        })
    }

    /// Number of raster rows (label length in dots).
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[RasterRow] {
        &self.rows
    }

    /// Whether rows carry a red plane.
    pub fn is_two_color(&self) -> bool {
        self.rows.first().is_some_and(|r| r.red.is_some())
    }

    /// Serialize the job as printer command bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let model = self.model;
        let two_color = self.is_two_color();
        let compress = model.compression;

        let mut data = Vec::with_capacity(
            model.invalidate_bytes + 64 + self.rows.len() * (model.bytes_per_row as usize + 3) * 2,
        );

        data.extend(commands::invalidate(model.invalidate_bytes));
        data.extend(commands::initialize());
        if model.mode_setting {
            data.extend(commands::switch_to_raster());
        }
        data.extend(commands::print_information(
            self.label.media_info(),
            self.options.high_quality,
            self.rows.len() as u32,
            true,
        ));
        if model.cutting {
            data.extend(commands::various_mode(self.options.autocut));
            data.extend(commands::cut_every(1));
        }
        if model.expanded_mode {
            data.extend(commands::expanded_mode(
                two_color,
                self.options.cut_at_end,
                false,
            ));
        }
        data.extend(commands::margins(self.label.feed_margin));
        if compress {
            data.extend(commands::compression(true));
        }

        for row in &self.rows {
            let encode = |plane: &[u8]| {
                if compress {
                    packbits::compress(plane)
                } else {
                    plane.to_vec()
                }
            };

            match &row.red {
                Some(red) => {
                    data.extend(commands::raster_row_two_color(
                        Plane::Black,
                        &encode(&row.black),
                    ));
                    data.extend(commands::raster_row_two_color(Plane::Red, &encode(red)));
                }
                None => data.extend(commands::raster_row(&encode(&row.black))),
            }
        }

        data.extend(commands::print_last());
        data
    }
}

/// Darkness (0-255) at which a pixel starts to print.
fn darkness_cutoff(threshold: f32) -> u8 {
    let inverted = (100.0 - threshold.clamp(0.0, 100.0)) / 100.0;
    (inverted * 255.0) as u8
}

fn two_color_enabled(label: LabelSpec, model: Model, options: &PrintOptions) -> bool {
    model.two_color && (options.red || label.red)
}

/// HSV red filter on a 0-255 scale.
fn is_red(r: u8, g: u8, b: u8) -> bool {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == 0 || max == min {
        return false;
    }

    let value = max;
    let saturation = ((max - min) as u32 * 255 / max as u32) as u8;

    let delta = (max - min) as f32;
    let hue_deg = if max == r {
        60.0 * (((g as f32 - b as f32) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b as f32 - r as f32) / delta + 2.0)
    } else {
        60.0 * ((r as f32 - g as f32) / delta + 4.0)
    };
    let hue = (hue_deg / 360.0 * 255.0) as u8;

    (hue < 40 || hue > 210) && saturation > 100 && value > 80
}

// ============================================================================
// TESTS
// ============================================================================
