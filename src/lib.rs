//! # qlabel - Text Labels for Brother QL Printers
//!
//! qlabel turns a short piece of text into a label that fills the tape,
//! and prints it on a Brother QL label printer. It provides:
//!
//! - **Layout**: one or two lines, auto-sized and centered, with a date stamp
//! - **Protocol implementation**: Brother QL raster command builders
//! - **Transport**: `usblp` device nodes, raw TCP, sysfs USB discovery
//! - **HTTP server**: `POST /print` for anything that can send JSON
//!
//! ## Quick Start
//!
//! ```no_run
//! use qlabel::{
//!     dispatch::{DevicePrinter, Printer},
//!     printer::{LabelSpec, Model, PrintOptions},
//!     protocol::raster::Raster,
//!     render::{FontBook, LabelRequest, LayoutConfig, render_label},
//! };
//!
//! // Lay out the label with whatever fonts are installed
//! let fonts = FontBook::load(
//!     &qlabel::render::font::default_text_fonts(),
//!     &qlabel::render::font::default_date_fonts(),
//! );
//! let layout = LayoutConfig::default();
//! let label = render_label(
//!     &LabelRequest::new("apple juice"),
//!     &layout,
//!     &fonts,
//!     &layout.stamp_now(),
//! );
//!
//! // Convert to a raster job for 62mm tape on a QL-800
//! let raster = Raster::from_gray(
//!     &label.image,
//!     LabelSpec::default(),
//!     Model::QL_800,
//!     &PrintOptions::default(),
//! )?;
//!
//! // Send to printer
//! DevicePrinter::new("usb://0x04f9:0x209b").print(&raster)?;
//!
//! # Ok::<(), qlabel::error::LabelError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`render`] | Text layout, fonts, image fitting |
//! | [`protocol`] | Brother QL raster commands and status replies |
//! | [`transport`] | Communication backends |
//! | [`printer`] | Printer models and label media |
//! | [`dispatch`] | Sending jobs to the configured printer |
//! | [`server`] | HTTP API |
//! | [`config`] | Command-line and environment settings |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! Currently tested with:
//! - Brother QL-800 (62mm DK-22251 black/red tape, USB)
//!
//! The other QL models in [`printer::Model::ALL`] share the raster
//! protocol and differ only in head width and feature flags.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod server;
pub mod transport;
pub mod tunnel;

// Re-exports for convenience
pub use dispatch::{DevicePrinter, Printer};
pub use error::LabelError;
pub use printer::{LabelSpec, Model};
