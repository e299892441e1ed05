//! Label composition: a date stamp in the corner and the text auto-fitted
//! into the space below it.

use image::{GrayImage, Luma};
use tracing::debug;

use super::font::{FontBook, LabelFace, TextExtent};
use super::{LabelRequest, Rect, RenderedLabel};

/// Smallest size tried when the text does not fit the normal range.
const FONT_FLOOR: u32 = 4;

/// Canvas geometry and fitting parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    /// Space between the date stamp and the text area
    pub date_gap: u32,
    pub date_size: f32,
    /// chrono format string
    pub date_format: String,
    /// Texts longer than this (in chars) go on two lines
    pub split_threshold: usize,
    pub max_font: u32,
    pub min_font: u32,
    pub font_step: u32,
    /// Fraction of the available area the text block may fill
    pub fill: f32,
    pub line_spacing: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 696,
            height: 271,
            margin: 4,
            date_gap: 8,
            date_size: 40.0,
            date_format: "%Y-%m-%d %H:%M".to_string(),
            split_threshold: 25,
            max_font: 140,
            min_font: 32,
            font_step: 2,
            fill: 0.95,
            line_spacing: 4,
        }
    }
}

impl LayoutConfig {
    /// Default layout on a canvas of the given size.
    pub fn with_canvas(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Current local time in `date_format`.
    pub fn stamp_now(&self) -> String {
        chrono::Local::now().format(&self.date_format).to_string()
    }

    /// Everything inside the margins.
    fn inner_box(&self) -> Rect {
        Rect {
            x: self.margin as i32,
            y: self.margin as i32,
            width: self.width.saturating_sub(2 * self.margin),
            height: self.height.saturating_sub(2 * self.margin),
        }
    }
}

/// Face size used to compare candidate splits. Advances scale linearly, so
/// any size ranks splits the same way.
const SPLIT_MEASURE_PX: f32 = 100.0;

/// Break text into one line, or two balanced lines when it is longer than
/// `threshold` characters.
///
/// Runs of whitespace collapse to a single space. Two-line splits happen at
/// the word boundary that keeps the longer line shortest in characters; a
/// single long word is cut at its midpoint.
pub fn split_lines(text: &str, threshold: usize) -> Vec<String> {
    split_lines_by(text, threshold, |line| line.chars().count() as f32)
}

/// Like [`split_lines`], but balances the two lines by `width` instead of
/// character count.
///
/// With a proportional face, pass its advance so the split minimizes the
/// drawn width of the wider line. Since advances add up word by word,
/// appending a word never makes that minimum smaller.
pub fn split_lines_by(text: &str, threshold: usize, width: impl Fn(&str) -> f32) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let joined = words.join(" ");
    let total = joined.chars().count();

    if total <= threshold {
        return vec![joined];
    }

    if words.len() < 2 {
        let chars: Vec<char> = joined.chars().collect();
        let mid = chars.len().div_ceil(2);
        return vec![
            chars[..mid].iter().collect(),
            chars[mid..].iter().collect(),
        ];
    }

    let wider = |k: usize| width(&words[..k].join(" ")).max(width(&words[k..].join(" ")));

    // First boundary wins ties
    let mut best = 1;
    let mut best_width = wider(1);
    for k in 2..words.len() {
        let w = wider(k);
        if w < best_width {
            best = k;
            best_width = w;
        }
    }

    vec![words[..best].join(" "), words[best..].join(" ")]
}

/// Size of a block of lines set in `face` at `px`.
pub fn block_extent(face: &LabelFace, lines: &[String], px: f32, spacing: u32) -> TextExtent {
    let width = lines
        .iter()
        .map(|l| face.measure(l, px).width)
        .max()
        .unwrap_or(0);
    let count = lines.len() as u32;
    let height = face.line_height(px) * count + spacing * count.saturating_sub(1);

    TextExtent { width, height }
}

/// Largest font size at which `lines` fit `fill` of the available box.
///
/// Walks `max_font` down to `min_font` in `font_step` steps, then 1px at a
/// time down to a floor of 4px.
pub fn fit_font(
    face: &LabelFace,
    lines: &[String],
    available_w: u32,
    available_h: u32,
    config: &LayoutConfig,
) -> u32 {
    let limit_w = config.fill * available_w as f32;
    let limit_h = config.fill * available_h as f32;
    let fits = |size: u32| {
        let block = block_extent(face, lines, size as f32, config.line_spacing);
        block.width as f32 <= limit_w && block.height as f32 <= limit_h
    };

    let step = config.font_step.max(1);
    let min = config.min_font.max(FONT_FLOOR);
    let mut size = config.max_font.max(min);
    loop {
        if fits(size) {
            return size;
        }
        if size <= min {
            break;
        }
        size = size.saturating_sub(step).max(min);
    }

    (FONT_FLOOR..min).rev().find(|&s| fits(s)).unwrap_or(FONT_FLOOR)
}

/// Compose a label: date stamp in the top-left, text fitted below it.
///
/// `stamp` is drawn verbatim; pass [`LayoutConfig::stamp_now`] for the
/// current time.
pub fn render_label(
    request: &LabelRequest,
    config: &LayoutConfig,
    fonts: &FontBook,
    stamp: &str,
) -> RenderedLabel {
    let mut canvas = GrayImage::from_pixel(config.width, config.height, Luma([255]));
    let margin = config.margin;
    let inner = config.inner_box();

    let text_top = if request.timestamp {
        let date_face = fonts.date();
        date_face.draw(
            &mut canvas,
            stamp,
            margin as i32,
            margin as i32,
            config.date_size,
            inner,
        );
        date_face.line_height(config.date_size) + margin + config.date_gap
    } else {
        margin
    };

    let available_w = config.width.saturating_sub(2 * margin);
    let available_h = config.height.saturating_sub(text_top + margin);
    let content_box = Rect {
        x: margin as i32,
        y: text_top as i32,
        width: available_w,
        height: available_h,
    };

    let face = fonts.text();
    let lines = split_lines_by(&request.formatted_text(), config.split_threshold, |line| {
        face.advance(line, SPLIT_MEASURE_PX)
    });
    let font_size = fit_font(face, &lines, available_w, available_h, config);
    let px = font_size as f32;

    let block = block_extent(face, &lines, px, config.line_spacing);
    let line_height = face.line_height(px);
    let block_top = text_top as i32 + (available_h as i32 - block.height as i32) / 2;

    let mut left = i32::MAX;
    for (i, line) in lines.iter().enumerate() {
        let extent = face.measure(line, px);
        let x = (config.width as i32 - extent.width as i32) / 2;
        let y = block_top + i as i32 * (line_height + config.line_spacing) as i32;
        face.draw(&mut canvas, line, x, y, px, content_box);
        left = left.min(x);
    }

    debug!(
        lines = lines.len(),
        font_size,
        face = %face.name(),
        "label laid out"
    );

    RenderedLabel {
        image: canvas,
        font_size,
        lines,
        text_box: Rect {
            x: if left == i32::MAX { margin as i32 } else { left },
            y: block_top,
            width: block.width,
            height: block.height,
        },
        content_box,
        fallback: face.is_fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_short_text_single_line() {
        assert_eq!(split_lines("Hello World!", 25), vec!["Hello World!"]);
        assert_eq!(split_lines("  Hello   World!  ", 25), vec!["Hello World!"]);
    }

    #[test]
    fn test_split_exactly_threshold() {
        let text = "a".repeat(25);
        assert_eq!(split_lines(&text, 25).len(), 1);
    }

    #[test]
    fn test_split_balanced_on_words() {
        assert_eq!(
            split_lines("Apple Juice For The Break Room", 25),
            vec!["Apple Juice For", "The Break Room"]
        );
        assert_eq!(
            split_lines("Leftover lasagna from Thursday night", 25),
            vec!["Leftover lasagna", "from Thursday night"]
        );
    }

    #[test]
    fn test_split_single_long_word() {
        let lines = split_lines("Pneumonoultramicroscopicsilicovolcanoconiosis", 25);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Pneumonoultramicroscopi");
        assert_eq!(lines[1], "csilicovolcanoconiosis");
    }

    #[test]
    fn test_split_by_width_prefers_narrow_glyphs() {
        // Narrow 'i' and wide 'W': three chars each side by count, but
        // by width "WWW" is the wide half
        let width = |line: &str| {
            line.chars()
                .map(|c| match c {
                    'W' => 3.0,
                    'i' => 1.0,
                    _ => 1.5,
                })
                .sum::<f32>()
        };
        let text = "WWW WWW iii iii iii iii iii";
        assert_eq!(
            split_lines(text, 25),
            vec!["WWW WWW iii", "iii iii iii iii"]
        );
        assert_eq!(
            split_lines_by(text, 25, width),
            vec!["WWW WWW", "iii iii iii iii iii"]
        );
    }

    #[test]
    fn test_split_by_width_single_word_uses_midpoint() {
        let lines = split_lines_by("Pneumonoultramicroscopicsilicovolcanoconiosis", 25, |l| {
            l.len() as f32 * 7.0
        });
        assert_eq!(lines[0], "Pneumonoultramicroscopi");
    }

    #[test]
    fn test_fit_font_bitmap_sizes() {
        let face = LabelFace::Bitmap;
        let config = LayoutConfig::default();

        // 12 chars at 6px per char of size: 108 * 6 = 648 <= 0.95 * 688
        let lines = vec!["Hello World!".to_string()];
        assert_eq!(fit_font(&face, &lines, 688, 215, &config), 108);

        // Tiny text is height-bound: 0.95 * 215 = 204.25
        let lines = vec!["Hi".to_string()];
        assert_eq!(fit_font(&face, &lines, 688, 215, &config), 140);
        assert_eq!(fit_font(&face, &lines, 688, 100, &config), 94);
    }

    #[test]
    fn test_fit_font_shrinks_below_range() {
        let face = LabelFace::Bitmap;
        let config = LayoutConfig::default();
        let lines = vec!["x".repeat(60)];

        // 60 chars at 32px = 960px, too wide; 21px = 630px fits 653.6
        assert_eq!(fit_font(&face, &lines, 688, 215, &config), 21);
    }

    #[test]
    fn test_fit_font_floor() {
        let face = LabelFace::Bitmap;
        let config = LayoutConfig::default();
        let lines = vec!["x".repeat(5000)];
        assert_eq!(fit_font(&face, &lines, 688, 215, &config), FONT_FLOOR);
    }

    #[test]
    fn test_render_hello_world_centered() {
        let request = LabelRequest::new("hello world!");
        let config = LayoutConfig::default();
        let label = render_label(&request, &config, &FontBook::builtin(), "2026-10-19 14:05");

        assert_eq!(label.lines, vec!["Hello World!"]);
        assert_eq!(label.font_size, 108);
        assert!(label.fallback);
        assert_eq!(
            label.content_box,
            Rect {
                x: 4,
                y: 52,
                width: 688,
                height: 215
            }
        );

        // 648 wide in a 696 canvas
        assert_eq!(label.text_box.x, 24);
        // 108 tall in 215 starting at 52
        assert_eq!(label.text_box.y, 52 + (215 - 108) / 2);
        assert!(label.content_box.encloses(&label.text_box));
    }

    #[test]
    fn test_render_without_timestamp_uses_full_height() {
        let mut request = LabelRequest::new("hi");
        request.timestamp = false;
        let config = LayoutConfig::default();
        let label = render_label(&request, &config, &FontBook::builtin(), "unused");

        assert_eq!(label.content_box.y, 4);
        assert_eq!(label.content_box.height, 263);
        // Nothing in the stamp corner
        for y in 4..44 {
            for x in 4..100 {
                assert_eq!(label.image.get_pixel(x, y)[0], 255);
            }
        }
    }

    #[test]
    fn test_stamp_drawn_top_left() {
        let request = LabelRequest::new("hi");
        let config = LayoutConfig::default();
        let label = render_label(&request, &config, &FontBook::builtin(), "2026-10-19 14:05");

        let inked = (4..44).any(|y| (4..100).any(|x| label.image.get_pixel(x, y)[0] < 255));
        assert!(inked);
    }

    #[test]
    fn test_title_case_hint_respected() {
        let mut request = LabelRequest::new("keep CAPS");
        request.title_case = false;
        let label = render_label(
            &request,
            &LayoutConfig::default(),
            &FontBook::builtin(),
            "",
        );
        assert_eq!(label.lines, vec!["keep CAPS"]);
    }
}
