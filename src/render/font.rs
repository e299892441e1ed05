//! Font loading and text rasterization for label rendering.
//!
//! Outline fonts are loaded from the system at startup and rendered with
//! ab_glyph to anti-aliased coverage. When none of the configured files can
//! be loaded, the built-in Spleen 12x24 bitmap font is scaled to the
//! requested size instead. A missing font is never an error, only a less
//! pretty label.

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, ScaleFont};
use image::GrayImage;
use spleen_font::{FONT_12X24, PSF2Font};
use tracing::{debug, warn};

use super::Rect;

const BITMAP_WIDTH: usize = 12;
const BITMAP_HEIGHT: usize = 24;

/// Measured size of a line or block of text, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

/// A typeface that can measure and draw a single line.
#[derive(Clone)]
pub enum LabelFace {
    /// TrueType/OpenType font loaded from disk
    Outline { font: FontArc, source: PathBuf },
    /// Built-in Spleen 12x24, scaled nearest-neighbor
    Bitmap,
}

impl std::fmt::Debug for LabelFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outline { source, .. } => write!(f, "Outline({})", source.display()),
            Self::Bitmap => write!(f, "Bitmap(spleen 12x24)"),
        }
    }
}

impl LabelFace {
    /// Load an outline font from a `.ttf`, `.otf` or `.ttc` file.
    pub fn from_file(path: &Path) -> Option<Self> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                warn!(font = %path.display(), error = %e, "font not readable");
                return None;
            }
        };
        match FontArc::try_from_vec(data) {
            Ok(font) => Some(Self::Outline {
                font,
                source: path.to_path_buf(),
            }),
            Err(e) => {
                warn!(font = %path.display(), error = %e, "font file could not be parsed");
                None
            }
        }
    }

    /// Whether this is the built-in bitmap fallback.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Bitmap)
    }

    /// Human-readable name for logs.
    pub fn name(&self) -> String {
        match self {
            Self::Outline { source, .. } => source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| source.display().to_string()),
            Self::Bitmap => "spleen-12x24".to_string(),
        }
    }

    /// Height of one line at `px`.
    pub fn line_height(&self, px: f32) -> u32 {
        match self {
            Self::Outline { font, .. } => {
                let scaled = font.as_scaled(px);
                (scaled.ascent() - scaled.descent()).ceil().max(1.0) as u32
            }
            Self::Bitmap => px.ceil().max(1.0) as u32,
        }
    }

    /// Unrounded sum of glyph advances. Scales linearly with `px`.
    pub fn advance(&self, line: &str, px: f32) -> f32 {
        match self {
            Self::Outline { font, .. } => {
                let scaled = font.as_scaled(px);
                line.chars()
                    .map(|ch| scaled.h_advance(font.glyph_id(ch)))
                    .sum()
            }
            Self::Bitmap => line.chars().count() as f32 * bitmap_advance(px),
        }
    }

    /// Measure one line of text.
    pub fn measure(&self, line: &str, px: f32) -> TextExtent {
        TextExtent {
            width: self.advance(line, px).ceil() as u32,
            height: self.line_height(px),
        }
    }

    /// Draw one line with its top-left corner at `(x, y)`.
    ///
    /// Black on white: each pixel keeps the darker of its current value and
    /// the glyph coverage. Nothing is drawn outside `clip`.
    pub fn draw(&self, canvas: &mut GrayImage, line: &str, x: i32, y: i32, px: f32, clip: Rect) {
        match self {
            Self::Outline { font, .. } => draw_outline(font, canvas, line, x, y, px, clip),
            Self::Bitmap => draw_bitmap(canvas, line, x, y, px, clip),
        }
    }
}

fn bitmap_advance(px: f32) -> f32 {
    BITMAP_WIDTH as f32 * px / BITMAP_HEIGHT as f32
}

fn plot(canvas: &mut GrayImage, x: i32, y: i32, coverage: f32, clip: Rect) {
    if !clip.contains(x, y) || x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= canvas.width() || y >= canvas.height() {
        return;
    }
    let ink = 255 - (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
    let pixel = canvas.get_pixel_mut(x, y);
    pixel[0] = pixel[0].min(ink);
}

fn draw_outline(
    font: &FontArc,
    canvas: &mut GrayImage,
    line: &str,
    x: i32,
    y: i32,
    px: f32,
    clip: Rect,
) {
    let scaled = font.as_scaled(px);
    let baseline_y = y as f32 + scaled.ascent();
    let mut caret_x = x as f32;

    for ch in line.chars() {
        let glyph_id = font.glyph_id(ch);
        let glyph = glyph_id.with_scale_and_position(px, ab_glyph::point(caret_x, baseline_y));
        caret_x += scaled.h_advance(glyph_id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px_x = gx as i32 + bounds.min.x as i32;
                let px_y = gy as i32 + bounds.min.y as i32;
                plot(canvas, px_x, px_y, coverage, clip);
            });
        }
    }
}

fn draw_bitmap(canvas: &mut GrayImage, line: &str, x: i32, y: i32, px: f32, clip: Rect) {
    let Ok(mut spleen) = PSF2Font::new(FONT_12X24) else {
        warn!("built-in bitmap font failed to load");
        return;
    };

    let scale = px / BITMAP_HEIGHT as f32;
    let advance = bitmap_advance(px);
    let cell_w = (BITMAP_WIDTH as f32 * scale).ceil() as i32;
    let cell_h = px.ceil() as i32;

    for (i, ch) in line.chars().enumerate() {
        let mut bits = [[false; BITMAP_WIDTH]; BITMAP_HEIGHT];
        let utf8 = ch.to_string();

        if let Some(glyph) = spleen.glyph_for_utf8(utf8.as_bytes()) {
            for (row_y, row) in glyph.enumerate() {
                for (col_x, on) in row.enumerate() {
                    if row_y < BITMAP_HEIGHT && col_x < BITMAP_WIDTH {
                        bits[row_y][col_x] = on;
                    }
                }
            }
        } else if !ch.is_whitespace() {
            // Unknown character: hollow box
            for (row_y, row) in bits.iter_mut().enumerate().skip(4).take(16) {
                for (col_x, bit) in row.iter_mut().enumerate().skip(2).take(8) {
                    *bit = row_y == 4 || row_y == 19 || col_x == 2 || col_x == 9;
                }
            }
        }

        let origin_x = x + (i as f32 * advance) as i32;
        for dy in 0..cell_h {
            let sy = ((dy as f32 / scale) as usize).min(BITMAP_HEIGHT - 1);
            for dx in 0..cell_w {
                let sx = ((dx as f32 / scale) as usize).min(BITMAP_WIDTH - 1);
                if bits[sy][sx] {
                    plot(canvas, origin_x + dx, y + dy, 1.0, clip);
                }
            }
        }
    }
}

// ============================================================================
// FONT BOOK
// ============================================================================

/// The faces used for one process, resolved once at startup.
#[derive(Debug, Clone)]
pub struct FontBook {
    text: LabelFace,
    date: LabelFace,
}

impl FontBook {
    /// Resolve faces from ordered candidate lists.
    ///
    /// The text face is the first loadable text font, then the first
    /// loadable date font, then the bitmap fallback. The date face is the
    /// first loadable date font, then the bitmap fallback.
    pub fn load(text_fonts: &[PathBuf], date_fonts: &[PathBuf]) -> Self {
        let date = first_loadable(date_fonts);
        let text = first_loadable(text_fonts).or_else(|| date.clone());

        let book = Self {
            text: text.unwrap_or(LabelFace::Bitmap),
            date: date.unwrap_or(LabelFace::Bitmap),
        };

        if book.text.is_fallback() {
            warn!("no configured text font could be loaded, using built-in bitmap font");
        }
        debug!(text = %book.text.name(), date = %book.date.name(), "fonts resolved");
        book
    }

    /// Bitmap font for everything.
    pub fn builtin() -> Self {
        Self {
            text: LabelFace::Bitmap,
            date: LabelFace::Bitmap,
        }
    }

    pub fn text(&self) -> &LabelFace {
        &self.text
    }

    pub fn date(&self) -> &LabelFace {
        &self.date
    }
}

/// Candidates are tried in order; each one skipped is logged.
fn first_loadable(paths: &[PathBuf]) -> Option<LabelFace> {
    paths.iter().find_map(|p| LabelFace::from_file(p))
}

/// Text font candidates for this platform.
pub fn default_text_fonts() -> Vec<PathBuf> {
    let paths: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/System/Library/Fonts/Avenir.ttc",
            "/System/Library/Fonts/Futura.ttc",
            "/System/Library/Fonts/Optima.ttc",
            "/System/Library/Fonts/Palatino.ttc",
            "/System/Library/Fonts/Supplemental/Baskerville.ttc",
            "/System/Library/Fonts/Supplemental/Garamond.ttc",
            "/Library/Fonts/Georgia.ttf",
            "/System/Library/Fonts/Supplemental/Hoefler Text.ttc",
        ]
    } else {
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
        ]
    };
    paths.iter().map(PathBuf::from).collect()
}

/// Date font candidates for this platform.
pub fn default_date_fonts() -> Vec<PathBuf> {
    let paths: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/System/Library/Fonts/Helvetica.ttf",
            "/System/Library/Fonts/Arial.ttf",
            "/System/Library/Fonts/Avenir.ttc",
        ]
    } else {
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        ]
    };
    paths.iter().map(PathBuf::from).collect()
}
