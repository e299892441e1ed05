//! # Printer Module
//!
//! This module provides printer-specific configurations and utilities.
//!
//! ## Modules
//!
//! - [`config`]: Printer models, label media and print options

pub mod config;

pub use config::{LabelKind, LabelSpec, Model, PrintOptions};
