//! # Brother QL Raster Protocol
//!
//! This module provides low-level command builders for the raster protocol
//! spoken by Brother QL label printers (QL-500 through QL-1100 series).
//!
//! ## Module Structure
//!
//! - [`commands`]: Job control commands (invalidate, init, mode, margins, print)
//! - [`packbits`]: TIFF PackBits compression used for raster rows
//! - [`raster`]: Image → raster job conversion
//! - [`status`]: 32-byte status reply parsing
//!
//! ## Usage Example
//!
//! ```
//! use qlabel::printer::{LabelSpec, Model, PrintOptions};
//! use qlabel::protocol::raster::Raster;
//!
//! let label = LabelSpec::by_name("62").unwrap();
//! let model = Model::by_name("QL-800").unwrap();
//! let img = image::GrayImage::from_pixel(696, 100, image::Luma([255]));
//!
//! let raster = Raster::from_gray(&img, label, model, &PrintOptions::default()).unwrap();
//! let job = raster.to_bytes();
//!
//! // The QL-800 invalidate block is 400 NUL bytes, then ESC @
//! assert_eq!(&job[400..402], &[0x1B, 0x40]);
//! // and ends with "print with feeding"
//! assert_eq!(job.last(), Some(&0x1A));
//! ```
//!
//! ## Protocol Reference
//!
//! Based on "Brother QL Series Raster Command Reference" (QL-800/810W/820NWB).

pub mod commands;
pub mod packbits;
pub mod raster;
pub mod status;
