//! # Photo and Banner Fitting
//!
//! Prepares arbitrary pictures for the tape. Images stay in RGB so red
//! areas survive on black/red tape.
//!
//! ## Orientation
//!
//! | Mode | Input made | Result |
//! |------|------------|--------|
//! | vertical | portrait | `width` wide, proportional length |
//! | horizontal | landscape | printed sideways, running along the tape |
//!
//! ## Banners
//!
//! [`split_banner`] scales a picture to label height and slices it into
//! consecutive labels that line up into one long image.

use image::{DynamicImage, GenericImageView, Rgb, RgbImage, imageops};
use serde::Deserialize;
use tracing::info;

use crate::error::LabelError;

/// How to lay a picture on the tape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Landscape picture printed along the tape
    #[default]
    Horizontal,
    /// Portrait picture printed across the tape
    Vertical,
}

fn check_dimensions(img: &DynamicImage) -> Result<(u32, u32), LabelError> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(LabelError::InvalidImage(format!(
            "Image has no pixels ({}x{})",
            w, h
        )));
    }
    Ok((w, h))
}

/// Rotate and scale a picture so it is exactly `width` dots wide.
pub fn orient(
    img: &DynamicImage,
    orientation: Orientation,
    width: u32,
) -> Result<DynamicImage, LabelError> {
    let (w, h) = check_dimensions(img)?;

    let oriented = match orientation {
        Orientation::Vertical if w > h => img.rotate270(),
        Orientation::Horizontal if h > w => img.rotate270(),
        _ => img.clone(),
    };
    let (w, h) = oriented.dimensions();

    let result = match orientation {
        Orientation::Vertical => {
            let height = scaled(h, width, w);
            oriented.resize_exact(width, height, imageops::FilterType::Lanczos3)
        }
        Orientation::Horizontal => {
            // Landscape at `width` tall, then turned to run along the tape
            let length = scaled(w, width, h);
            oriented
                .resize_exact(length, width, imageops::FilterType::Lanczos3)
                .rotate90()
        }
    };

    info!(
        from = %format!("{}x{}", img.width(), img.height()),
        to = %format!("{}x{}", result.width(), result.height()),
        ?orientation,
        "image oriented"
    );
    Ok(result)
}

/// `value * numerator / denominator`, at least 1.
fn scaled(value: u32, numerator: u32, denominator: u32) -> u32 {
    ((value as u64 * numerator as u64) / denominator as u64).max(1) as u32
}

/// Slice a picture into `label_w` x `label_h` labels that form a banner.
///
/// The picture is scaled to `label_h` tall, and stretched to at least
/// `count` labels wide. The last tile is padded with white.
pub fn split_banner(
    img: &DynamicImage,
    count: u32,
    label_w: u32,
    label_h: u32,
) -> Result<Vec<RgbImage>, LabelError> {
    let (w, h) = check_dimensions(img)?;
    if label_w == 0 || label_h == 0 {
        return Err(LabelError::InvalidImage(
            "Label size must be non-zero".to_string(),
        ));
    }

    let natural_w = scaled(w, label_h, h);
    let target_w = natural_w.max(label_w.saturating_mul(count));
    let banner = img
        .resize_exact(target_w, label_h, imageops::FilterType::Lanczos3)
        .to_rgb8();

    let tiles = target_w.div_ceil(label_w);
    info!(
        width = target_w,
        height = label_h,
        tiles,
        "banner prepared"
    );

    let y_offset = (label_h as i64 - banner.height() as i64) / 2;
    let tiles = (0..tiles)
        .map(|i| {
            let left = i * label_w;
            let crop_w = label_w.min(target_w - left);
            let piece = imageops::crop_imm(&banner, left, 0, crop_w, banner.height()).to_image();

            let mut tile = RgbImage::from_pixel(label_w, label_h, Rgb([255, 255, 255]));
            imageops::overlay(&mut tile, &piece, 0, y_offset);
            tile
        })
        .collect();

    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn solid(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([0, 0, 0])))
    }

    #[test]
    fn test_vertical_keeps_portrait() {
        let out = orient(&solid(300, 600), Orientation::Vertical, 696).unwrap();
        assert_eq!(out.dimensions(), (696, 1392));
    }

    #[test]
    fn test_vertical_rotates_landscape() {
        let out = orient(&solid(600, 300), Orientation::Vertical, 696).unwrap();
        assert_eq!(out.dimensions(), (696, 1392));
    }

    #[test]
    fn test_horizontal_runs_along_tape() {
        // 800x400 landscape: 1392x696, turned to 696 wide
        let out = orient(&solid(800, 400), Orientation::Horizontal, 696).unwrap();
        assert_eq!(out.dimensions(), (696, 1392));

        let out = orient(&solid(400, 800), Orientation::Horizontal, 696).unwrap();
        assert_eq!(out.dimensions(), (696, 1392));
    }

    #[test]
    fn test_orient_rejects_empty() {
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            orient(&empty, Orientation::Vertical, 696),
            Err(LabelError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_split_banner_minimum_width() {
        let tiles = split_banner(&solid(1000, 500), 5, 696, 271).unwrap();
        assert_eq!(tiles.len(), 5);
        for tile in &tiles {
            assert_eq!(tile.dimensions(), (696, 271));
        }
    }

    #[test]
    fn test_split_banner_natural_width() {
        // 4000 wide at 271 tall: ceil(4000 / 696) = 6
        let tiles = split_banner(&solid(4000, 271), 2, 696, 271).unwrap();
        assert_eq!(tiles.len(), 6);

        // Last tile holds 520 columns of picture, then white
        let last = tiles.last().unwrap();
        assert_eq!(last.get_pixel(0, 100), &Rgb([0, 0, 0]));
        assert_eq!(last.get_pixel(695, 100), &Rgb([255, 255, 255]));
    }
}
