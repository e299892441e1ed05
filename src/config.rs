//! Runtime settings shared by every subcommand.
//!
//! Everything can come from flags or `QLABEL_*` environment variables.
//! Settings are parsed once and resolved into a [`PrintSetup`] that is
//! passed around explicitly.

use std::path::PathBuf;

use clap::Args;

use crate::dispatch::DevicePrinter;
use crate::error::LabelError;
use crate::printer::{LabelSpec, Model, PrintOptions};
use crate::render::font::{self, FontBook};
use crate::render::LayoutConfig;
use crate::transport::usb::DEFAULT_PRINTER;

/// Printer, media and font options.
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Printer identifier: usb://VENDOR:PRODUCT[/SERIAL], tcp://HOST[:PORT] or a device path
    #[arg(long, env = "QLABEL_PRINTER", default_value = DEFAULT_PRINTER)]
    pub printer: String,

    /// Printer model (QL-800, QL-700, ...)
    #[arg(long, env = "QLABEL_MODEL", default_value = "QL-800")]
    pub model: String,

    /// Label identifier (62, 29, 62x29, ...)
    #[arg(long, env = "QLABEL_LABEL", default_value = "62")]
    pub label: String,

    /// Label length in dots on continuous tape
    #[arg(long, env = "QLABEL_LABEL_HEIGHT", default_value_t = 271)]
    pub label_height: u32,

    /// Text font files, tried in order
    #[arg(long = "font", env = "QLABEL_FONTS", value_delimiter = ',')]
    pub fonts: Vec<PathBuf>,

    /// Date stamp font files, tried in order
    #[arg(long = "date-font", env = "QLABEL_DATE_FONTS", value_delimiter = ',')]
    pub date_fonts: Vec<PathBuf>,

    /// Darkness threshold in percent
    #[arg(long, default_value_t = 70.0)]
    pub threshold: f32,

    /// Print two-color rows for black/red tape (default)
    #[arg(long = "red", overrides_with = "no_red")]
    red: bool,

    /// Print black only
    #[arg(long = "no-red", overrides_with = "red")]
    no_red: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            printer: DEFAULT_PRINTER.to_string(),
            model: "QL-800".to_string(),
            label: "62".to_string(),
            label_height: 271,
            fonts: Vec::new(),
            date_fonts: Vec::new(),
            threshold: 70.0,
            red: false,
            no_red: false,
        }
    }
}

/// Model, media and layout for one process.
#[derive(Debug, Clone)]
pub struct PrintSetup {
    pub model: Model,
    pub label: LabelSpec,
    pub options: PrintOptions,
    pub layout: LayoutConfig,
}

impl Settings {
    pub fn red(&self) -> bool {
        self.red || !self.no_red
    }

    /// Look up model and label, and derive the canvas from them.
    pub fn resolve(&self) -> Result<PrintSetup, LabelError> {
        let model = Model::by_name(&self.model)?;
        let label = LabelSpec::by_name(&self.label)?;
        label.check_model(model)?;

        if !(0.0..=100.0).contains(&self.threshold) {
            return Err(LabelError::Config(format!(
                "Threshold must be between 0 and 100, got {}",
                self.threshold
            )));
        }
        if self.label_height == 0 {
            return Err(LabelError::Config(
                "Label height must be positive".to_string(),
            ));
        }

        let options = PrintOptions {
            threshold: self.threshold,
            red: self.red(),
            ..PrintOptions::default()
        };
        let height = label.printable_height().unwrap_or(self.label_height);
        let layout = LayoutConfig::with_canvas(label.printable_width(), height);

        Ok(PrintSetup {
            model,
            label,
            options,
            layout,
        })
    }

    /// Load fonts, falling back to the platform lists when none were given.
    pub fn font_book(&self) -> FontBook {
        let text = if self.fonts.is_empty() {
            font::default_text_fonts()
        } else {
            self.fonts.clone()
        };
        let date = if self.date_fonts.is_empty() {
            font::default_date_fonts()
        } else {
            self.date_fonts.clone()
        };
        FontBook::load(&text, &date)
    }

    pub fn device_printer(&self) -> DevicePrinter {
        DevicePrinter::new(self.printer.clone())
    }
}
