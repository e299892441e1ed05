//! # Error Types
//!
//! This module defines error types used throughout the qlabel library.
//!
//! Rendering never fails: a missing font degrades to the built-in bitmap
//! face instead of producing an error. Everything here is a dispatch or
//! configuration failure that gets reported to the caller.

use thiserror::Error;

/// Main error type for qlabel operations
#[derive(Debug, Error)]
pub enum LabelError {
    /// Transport-level errors (connection, I/O)
    #[error("Transport error: {0}")]
    Transport(String),

    /// No compatible printer was detected
    #[error("Printer not found: {0}")]
    PrinterNotFound(String),

    /// Image does not fit the selected media
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Unknown model, label or backend identifier
    #[error("Configuration error: {0}")]
    Config(String),

    /// Image encode/decode error
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
