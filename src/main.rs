//! # qlabel CLI
//!
//! Command-line interface for Brother QL label printing.
//!
//! ## Usage
//!
//! ```bash
//! # Run the HTTP server (optionally behind an ngrok tunnel)
//! qlabel serve --listen 0.0.0.0:5000 --tunnel
//!
//! # Print a text label
//! qlabel print "apple juice"
//!
//! # Save the label as PNG instead of printing
//! qlabel print --png label.png "apple juice"
//!
//! # Print a photo along the tape
//! qlabel image photo.jpg --orientation horizontal
//!
//! # Split a picture into a 5-label banner
//! qlabel split banner.png --labels 5
//!
//! # Show connected printers
//! qlabel devices
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use qlabel::{
    LabelError,
    config::Settings,
    dispatch::{DevicePrinter, Printer, prepare_image},
    protocol::raster::Raster,
    render::{
        LabelRequest,
        image::{Orientation, orient, split_banner},
        render_label,
    },
    server::{self, AppState},
    transport::AVAILABLE_BACKENDS,
    tunnel::Tunnel,
};

/// Pause between banner labels so the printer can cut and settle.
const BANNER_PAUSE: Duration = Duration::from_secs(1);

/// qlabel - Brother QL label printer utility
#[derive(Parser, Debug)]
#[command(name = "qlabel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP label server
    Serve {
        /// Address to listen on
        #[arg(long, env = "QLABEL_LISTEN", default_value = "0.0.0.0:5000")]
        listen: String,

        /// Expose the server through ngrok
        #[arg(long)]
        tunnel: bool,

        /// ngrok binary
        #[arg(long, value_name = "BIN", default_value = "ngrok")]
        ngrok: String,

        #[command(flatten)]
        settings: Settings,
    },

    /// Print a text label
    Print {
        /// Label text
        text: String,

        /// Output to PNG file instead of printing
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,

        /// Keep the text's original capitalization
        #[arg(long)]
        no_title_case: bool,

        /// Leave out the date stamp
        #[arg(long)]
        no_timestamp: bool,

        #[command(flatten)]
        settings: Settings,
    },

    /// Print an image, rotated and scaled to the tape
    Image {
        /// Image file
        path: PathBuf,

        #[arg(long, value_enum, default_value_t = Orientation::Horizontal)]
        orientation: Orientation,

        /// Output to PNG file instead of printing
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,

        #[command(flatten)]
        settings: Settings,
    },

    /// Split an image into labels that line up into a banner
    Split {
        /// Image file
        path: PathBuf,

        /// Minimum number of labels to span
        #[arg(long, default_value_t = 5)]
        labels: u32,

        /// Save the labels as PNG files in this directory instead of printing
        #[arg(long, value_name = "DIR")]
        png_dir: Option<PathBuf>,

        #[command(flatten)]
        settings: Settings,
    },

    /// List connected printers
    Devices {
        #[command(flatten)]
        settings: Settings,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), LabelError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            listen,
            tunnel,
            ngrok,
            settings,
        } => {
            let state = AppState::new(
                settings.resolve()?,
                settings.font_book(),
                Arc::new(settings.device_printer()),
            );

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(async move {
                // Held for the server's lifetime; dropping it stops ngrok
                let _tunnel = if tunnel {
                    let port = listen
                        .rsplit_once(':')
                        .and_then(|(_, port)| port.parse().ok())
                        .unwrap_or(5000);
                    let handle = tokio::spawn(async move { Tunnel::start(port, &ngrok).await });
                    Some(handle)
                } else {
                    None
                };

                server::serve(Arc::new(state), &listen).await
            })
        }

        Commands::Print {
            text,
            png,
            no_title_case,
            no_timestamp,
            settings,
        } => {
            if text.trim().is_empty() {
                return Err(LabelError::Config("Label text is empty".to_string()));
            }

            let setup = settings.resolve()?;
            let request = LabelRequest {
                text,
                title_case: !no_title_case,
                timestamp: !no_timestamp,
            };
            let label = render_label(
                &request,
                &setup.layout,
                &settings.font_book(),
                &setup.layout.stamp_now(),
            );
            info!(
                lines = ?label.lines,
                font_size = label.font_size,
                fallback = label.fallback,
                "label rendered"
            );

            if let Some(path) = png {
                std::fs::write(&path, label.to_png()?)?;
                println!("Saved label to {}", path.display());
                return Ok(());
            }

            let raster = Raster::from_gray(&label.image, setup.label, setup.model, &setup.options)?;
            send(&settings.device_printer(), &raster)?;
            println!("Printed \"{}\"", request.formatted_text());
            Ok(())
        }

        Commands::Image {
            path,
            orientation,
            png,
            settings,
        } => {
            let setup = settings.resolve()?;
            let img = open_image(&path)?;
            let img = orient(&img, orientation, setup.label.printable_width())?;
            let img = prepare_image(img, &setup.label)?;

            if let Some(out) = png {
                img.save(&out)
                    .map_err(|e| LabelError::Image(format!("Failed to save PNG: {}", e)))?;
                println!("Saved {}x{} image to {}", img.width(), img.height(), out.display());
                return Ok(());
            }

            let raster = Raster::from_image(&img, setup.label, setup.model, &setup.options)?;
            send(&settings.device_printer(), &raster)?;
            println!("Printed {} ({:?})", path.display(), orientation);
            Ok(())
        }

        Commands::Split {
            path,
            labels,
            png_dir,
            settings,
        } => {
            let setup = settings.resolve()?;
            let img = open_image(&path)?;
            let tiles = split_banner(&img, labels, setup.layout.width, setup.layout.height)?;
            let total = tiles.len();

            if let Some(dir) = png_dir {
                std::fs::create_dir_all(&dir)?;
                for (i, tile) in tiles.iter().enumerate() {
                    let out = dir.join(format!("label_part_{}_of_{}.png", i + 1, total));
                    tile.save(&out)
                        .map_err(|e| LabelError::Image(format!("Failed to save PNG: {}", e)))?;
                    println!("Saved {}", out.display());
                }
                return Ok(());
            }

            let printer = settings.device_printer();
            for (i, tile) in tiles.iter().enumerate() {
                info!("printing label {} of {}", i + 1, total);
                let raster = Raster::from_rgb(tile, setup.label, setup.model, &setup.options)?;
                send(&printer, &raster)?;
                if i + 1 < total {
                    std::thread::sleep(BANNER_PAUSE);
                }
            }
            println!("Printed {} labels. Line them up in order to see the picture.", total);
            Ok(())
        }

        Commands::Devices { settings } => {
            let printer = settings.device_printer();
            let status = printer.status();

            println!("Configured printer: {}", printer.identifier());
            println!(
                "  {} {}",
                if status.connected { "connected:" } else { "not connected:" },
                status.message
            );
            println!("Backends: {}", AVAILABLE_BACKENDS.join(", "));

            let devices = printer.devices();
            if devices.is_empty() {
                println!("No printers found");
            } else {
                println!("Printers:");
                for device in devices {
                    println!("  {}", device);
                }
            }

            if status.connected {
                match printer.query_status() {
                    Ok(reply) => println!(
                        "Status: {:?}, media {}mm {}, errors: {}",
                        reply.status_type,
                        reply.media_width_mm,
                        reply.media_type,
                        if reply.errors.is_empty() {
                            "none".to_string()
                        } else {
                            reply.errors.join(", ")
                        }
                    ),
                    Err(e) => warn!(error = %e, "printer did not answer status request"),
                }
            }
            Ok(())
        }
    }
}

fn open_image(path: &Path) -> Result<DynamicImage, LabelError> {
    image::open(path)
        .map_err(|e| LabelError::Image(format!("Failed to open {}: {}", path.display(), e)))
}

/// Check the printer, then send.
fn send(printer: &DevicePrinter, raster: &Raster) -> Result<(), LabelError> {
    let status = printer.status();
    if !status.connected {
        return Err(LabelError::PrinterNotFound(status.message));
    }
    printer.print(raster)
}
