//! Server state shared across handlers.

use std::sync::Arc;

use crate::config::PrintSetup;
use crate::dispatch::Printer;
use crate::render::FontBook;

/// Read-only configuration every request works from.
pub struct AppState {
    pub setup: PrintSetup,
    pub fonts: FontBook,
    pub printer: Arc<dyn Printer>,
}

impl AppState {
    pub fn new(setup: PrintSetup, fonts: FontBook, printer: Arc<dyn Printer>) -> Self {
        Self {
            setup,
            fonts,
            printer,
        }
    }
}
