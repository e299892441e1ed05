//! # Label Layout Tests
//!
//! Properties of the text layout that must hold for any input:
//!
//! - **Line count**: one line up to the split threshold, two above it
//! - **Bounds**: ink never leaves the margins, text never enters the stamp area
//! - **Monotonic sizing**: longer text never gets a bigger font
//! - **Fallback**: missing fonts degrade to the built-in bitmap font
//!
//! Exact pixel numbers use the built-in bitmap font so they do not depend on
//! which system fonts are installed. Property tests also run against the
//! system fonts when they are present.

use std::path::PathBuf;

use image::GrayImage;
use pretty_assertions::assert_eq;
use qlabel::render::font::{default_date_fonts, default_text_fonts};
use qlabel::render::{FontBook, LabelRequest, LayoutConfig, Rect, RenderedLabel, render_label};

const STAMP: &str = "2026-10-19 14:05";

/// Strings of many shapes: short, long, one huge word, odd whitespace.
const SAMPLES: &[&str] = &[
    "a",
    "Hi",
    "Hello World!",
    "apple juice",
    "exactly twenty-five chars",
    "exactly twenty-six chars!!",
    "Apple Juice For The Break Room",
    "Leftover lasagna from Thursday night, do not eat",
    "Pneumonoultramicroscopicsilicovolcanoconiosis",
    "   lots    of   spaces   between   words   here   ",
    "WWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWW",
    "Ünïcödé Ça Marche",
];

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn render(text: &str, fonts: &FontBook) -> RenderedLabel {
    render_label(
        &LabelRequest::new(text),
        &LayoutConfig::default(),
        fonts,
        STAMP,
    )
}

fn system_fonts() -> FontBook {
    FontBook::load(&default_text_fonts(), &default_date_fonts())
}

/// Horizontal extent of dark pixels within rows `y0..y1`.
fn ink_columns(img: &GrayImage, y0: u32, y1: u32) -> Option<(u32, u32)> {
    let mut span: Option<(u32, u32)> = None;
    for y in y0..y1.min(img.height()) {
        for x in 0..img.width() {
            if img.get_pixel(x, y)[0] < 128 {
                span = Some(match span {
                    Some((lo, hi)) => (lo.min(x), hi.max(x)),
                    None => (x, x),
                });
            }
        }
    }
    span
}

fn assert_ink_within(label: &RenderedLabel, margin: u32) {
    let inner = Rect {
        x: margin as i32,
        y: margin as i32,
        width: label.width() - 2 * margin,
        height: label.height() - 2 * margin,
    };
    for (x, y, p) in label.image.enumerate_pixels() {
        if p[0] == 255 {
            continue;
        }
        let (x, y) = (x as i32, y as i32);
        assert!(inner.contains(x, y), "ink in margin at ({}, {})", x, y);
        if y >= label.content_box.y {
            assert!(
                label.content_box.contains(x, y),
                "text ink outside content box at ({}, {})",
                x,
                y
            );
        }
    }
}

// ============================================================================
// LINE COUNT
// ============================================================================

#[test]
fn test_line_count_follows_threshold() {
    let fonts = FontBook::builtin();
    for len in 1..=60 {
        let text: String = "abcde fghij ".chars().cycle().take(len).collect();
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let label = render(&text, &fonts);

        let expected = if normalized.chars().count() <= 25 { 1 } else { 2 };
        assert_eq!(label.lines.len(), expected, "text {:?}", text);
    }
}

#[test]
fn test_lines_preserve_words() {
    let label = render("apple juice for the break room", &FontBook::builtin());
    assert_eq!(label.lines, vec!["Apple Juice For", "The Break Room"]);
}

// ============================================================================
// BOUNDS
// ============================================================================

#[test]
fn test_text_stays_inside_margins_bitmap() {
    let fonts = FontBook::builtin();
    for text in SAMPLES {
        let label = render(text, &fonts);
        assert!(
            label.content_box.encloses(&label.text_box),
            "{:?}: {:?} outside {:?}",
            text,
            label.text_box,
            label.content_box
        );
        assert_ink_within(&label, 4);
    }
}

#[test]
fn test_text_stays_inside_margins_system_fonts() {
    let fonts = system_fonts();
    for text in SAMPLES {
        let label = render(text, &fonts);
        assert!(label.content_box.encloses(&label.text_box), "{:?}", text);
        assert_ink_within(&label, 4);
    }
}

#[test]
fn test_small_canvas_still_bounded() {
    let config = LayoutConfig::with_canvas(306, 120);
    for text in SAMPLES {
        let label = render_label(&LabelRequest::new(*text), &config, &FontBook::builtin(), STAMP);
        assert_eq!((label.width(), label.height()), (306, 120));
        assert_ink_within(&label, config.margin);
    }
}

// ============================================================================
// FONT SIZE
// ============================================================================

#[test]
fn test_font_size_monotonic_single_line() {
    let fonts = FontBook::builtin();
    let mut previous = u32::MAX;
    for len in 1..=25 {
        let text = "M".repeat(len);
        let label = render(&text, &fonts);
        assert_eq!(label.lines.len(), 1);
        assert!(
            label.font_size <= previous,
            "{} chars got {}px, fewer got {}px",
            len,
            label.font_size,
            previous
        );
        previous = label.font_size;
    }
}

#[test]
fn test_font_size_monotonic_two_lines() {
    let words = [
        "Leftover", "lasagna", "from", "Thursday", "night", "please", "do", "not", "eat",
        "without", "asking",
    ];
    let fonts = FontBook::builtin();
    let mut previous = u32::MAX;
    for n in 1..=words.len() {
        let text = words[..n].join(" ");
        let label = render(&text, &fonts);
        if label.lines.len() < 2 {
            continue;
        }
        assert!(label.font_size <= previous, "{:?}", text);
        previous = label.font_size;
    }
    assert_ne!(previous, u32::MAX);
}

/// Word sequences whose prefixes are rendered one after another. Mixed
/// narrow and wide glyphs make character counts a poor stand-in for width.
const WORD_RUNS: &[&[&str]] = &[
    &["MOM", "iii", "tilt", "Mmm", "ill", "mill", "Mmm", "ill", "WWW", "lil"],
    &["Leftover", "lasagna", "from", "Thursday", "night", "please", "do", "not", "eat"],
    &["WW", "ii", "WW", "ii", "WW", "ii", "WW", "ii", "WW", "ii", "WW", "ii", "WW"],
    &["illicit", "lily", "mummy", "wow", "little", "MMMM", "jilt", "Wombat", "if"],
];

fn assert_monotonic_over_prefixes(fonts: &FontBook) {
    for run in WORD_RUNS {
        // Largest size seen so far, per line count
        let mut previous = [u32::MAX; 3];
        let mut previous_text = [String::new(), String::new(), String::new()];
        for n in 1..=run.len() {
            let text = run[..n].join(" ");
            let label = render(&text, fonts);
            let count = label.lines.len();
            assert!(
                label.font_size <= previous[count],
                "{:?} got {}px, shorter {:?} got {}px",
                text,
                label.font_size,
                previous_text[count],
                previous[count]
            );
            previous[count] = label.font_size;
            previous_text[count] = text;
        }
    }
}

#[test]
fn test_font_size_monotonic_over_prefixes_bitmap() {
    assert_monotonic_over_prefixes(&FontBook::builtin());
}

#[test]
fn test_font_size_monotonic_over_prefixes_system_fonts() {
    let fonts = system_fonts();
    if fonts.text().is_fallback() {
        // No outline font installed; the bitmap case covers this
        return;
    }
    assert_monotonic_over_prefixes(&fonts);
}

#[test]
fn test_two_line_split_balances_drawn_width() {
    let fonts = system_fonts();
    let face = fonts.text();
    let label = render("MOM iii tilt Mmm ill mill Mmm ill", &fonts);
    assert_eq!(label.lines.len(), 2);

    // No other word boundary gives a narrower wide line
    let words: Vec<&str> = label.lines.iter().flat_map(|l| l.split(' ')).collect();
    let chosen = label
        .lines
        .iter()
        .map(|l| face.advance(l, 100.0))
        .fold(0.0, f32::max);
    for k in 1..words.len() {
        let wider = face
            .advance(&words[..k].join(" "), 100.0)
            .max(face.advance(&words[k..].join(" "), 100.0));
        assert!(chosen <= wider + 0.01, "split at {} is narrower", k);
    }
}

#[test]
fn test_font_size_within_range_for_normal_text() {
    let fonts = FontBook::builtin();
    for text in ["Hi", "Hello World!", "Apple Juice For The Break Room"] {
        let label = render(text, &fonts);
        assert!((32..=140).contains(&label.font_size), "{:?}", text);
        assert_eq!(label.font_size % 2, 0);
    }
}

// ============================================================================
// EXAMPLES
// ============================================================================

#[test]
fn test_hello_world_single_centered_line() {
    let label = render("Hello World!", &FontBook::builtin());

    assert_eq!(label.lines, vec!["Hello World!"]);
    assert_eq!(label.font_size, 108);

    // Centered horizontally in the canvas
    let left = label.text_box.x;
    let right = label.width() as i32 - label.text_box.right();
    assert!((left - right).abs() <= 1, "left {} right {}", left, right);

    // Centered vertically in the content box
    let top = label.text_box.y - label.content_box.y;
    let bottom = label.content_box.bottom() - label.text_box.bottom();
    assert!((top - bottom).abs() <= 1, "top {} bottom {}", top, bottom);
}

#[test]
fn test_long_text_two_lines_each_centered() {
    let label = render("Apple Juice For The Break Room", &FontBook::builtin());

    assert_eq!(label.lines.len(), 2);
    assert_eq!(label.font_size, 86);

    // Block of 2 * 86 + 4 = 176 rows centered in 215 starting at 52
    let first = (71, 157);
    let second = (161, 247);
    assert_eq!(label.text_box.y, first.0 as i32);

    let (lo1, hi1) = ink_columns(&label.image, first.0, first.1).unwrap();
    let (lo2, hi2) = ink_columns(&label.image, second.0, second.1).unwrap();

    // "Apple Juice For" is 645 wide at x = 25, "The Break Room" 602 at x = 47
    assert!(lo1 >= 25 && hi1 < 25 + 645);
    assert!(lo2 >= 47 && hi2 < 47 + 602);
    assert!(lo2 > lo1);
    assert!(hi2 < hi1);
}

#[test]
fn test_preview_png_matches_canvas() {
    let label = render("Hello World!", &FontBook::builtin());
    let png = label.to_png().unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (696, 271));
}

// ============================================================================
// FALLBACK
// ============================================================================

#[test]
fn test_missing_fonts_fall_back() {
    let fonts = FontBook::load(
        &[PathBuf::from("/nonexistent/Avenir.ttc")],
        &[PathBuf::from("/nonexistent/Helvetica.ttf")],
    );
    let label = render("apple juice", &fonts);

    assert!(label.fallback);
    assert_eq!(label.lines, vec!["Apple Juice"]);
    assert!(label.image.pixels().any(|p| p[0] == 0));
}

#[test]
fn test_text_font_falls_back_to_date_font() {
    let date_fonts: Vec<PathBuf> = default_date_fonts()
        .into_iter()
        .filter(|p| p.exists())
        .collect();
    let fonts = FontBook::load(&[PathBuf::from("/nonexistent/Fancy.ttf")], &date_fonts);

    if date_fonts.is_empty() {
        assert!(fonts.text().is_fallback());
        assert!(fonts.date().is_fallback());
        return;
    }

    assert!(!fonts.text().is_fallback());
    assert_eq!(fonts.text().name(), fonts.date().name());
}
