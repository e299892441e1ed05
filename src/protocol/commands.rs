//! # Brother QL Job Control Commands
//!
//! Every print job follows the same fixed sequence:
//!
//! ```text
//! invalidate → ESC @ → ESC i a 01 → ESC i z … → ESC i M → ESC i A
//!            → ESC i K → ESC i d → M 02 → raster rows → 0x1A
//! ```
//!
//! Models without compression support (QL-500/570/700/800) skip `M 02` and
//! get raw rows.
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding, same as the rest of
//! the Brother raster command set.

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// Print command with feeding (last page of a job)
pub const PRINT_LAST: u8 = 0x1A;

/// Media type byte for continuous-length tape
pub const MEDIA_CONTINUOUS: u8 = 0x0A;

/// Media type byte for die-cut labels
pub const MEDIA_DIE_CUT: u8 = 0x0B;

// ============================================================================
// INITIALIZATION COMMANDS
// ============================================================================

/// # Invalidate
///
/// A run of NUL bytes that flushes whatever half-received command the
/// printer might still be parsing. The QL-5xx/7xx series and the QL-1060N
/// want 200 bytes, the QL-8xx series and the QL-1100 want 400.
pub fn invalidate(count: usize) -> Vec<u8> {
    vec![0x00; count]
}

/// # Initialize (ESC @)
///
/// ```
/// use qlabel::protocol::commands;
///
/// assert_eq!(commands::initialize(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn initialize() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Status Information Request (ESC i S)
///
/// The printer answers with a 32-byte status block, see
/// [`crate::protocol::status`].
#[inline]
pub fn status_request() -> Vec<u8> {
    vec![ESC, b'i', b'S']
}

/// # Switch Dynamic Command Mode (ESC i a 01)
///
/// Selects raster mode. Models without mode switching ignore the command.
#[inline]
pub fn switch_to_raster() -> Vec<u8> {
    vec![ESC, b'i', b'a', 0x01]
}

// ============================================================================
// PAGE SETUP COMMANDS
// ============================================================================

/// Media description sent with [`print_information`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaInfo {
    /// [`MEDIA_CONTINUOUS`] or [`MEDIA_DIE_CUT`]
    pub media_type: u8,
    /// Tape width in millimeters
    pub width_mm: u8,
    /// Label length in millimeters, 0 for continuous tape
    pub length_mm: u8,
}

/// # Print Information (ESC i z n1..n10)
///
/// | Byte | Meaning |
/// |------|---------|
/// | n1 | Valid flags (0x80 recover, 0x02 type, 0x04 width, 0x08 length, 0x40 quality) |
/// | n2 | Media type |
/// | n3 | Media width (mm) |
/// | n4 | Media length (mm) |
/// | n5-n8 | Raster line count, u32 LE |
/// | n9 | 0 = first page, 1 = other pages |
/// | n10 | Fixed 0 |
pub fn print_information(
    media: MediaInfo,
    high_quality: bool,
    raster_lines: u32,
    first_page: bool,
) -> Vec<u8> {
    let mut flags = 0x80 | 0x02 | 0x04 | 0x08;
    if high_quality {
        flags |= 0x40;
    }

    let mut cmd = Vec::with_capacity(13);
    cmd.extend_from_slice(&[ESC, b'i', b'z']);
    cmd.push(flags);
    cmd.push(media.media_type);
    cmd.push(media.width_mm);
    cmd.push(media.length_mm);
    cmd.extend_from_slice(&raster_lines.to_le_bytes());
    cmd.push(if first_page { 0 } else { 1 });
    cmd.push(0);
    cmd
}

/// # Various Mode Settings (ESC i M)
///
/// Bit 6 enables the auto cutter.
#[inline]
pub fn various_mode(autocut: bool) -> Vec<u8> {
    vec![ESC, b'i', b'M', if autocut { 0x40 } else { 0x00 }]
}

/// # Cut Every N Labels (ESC i A n)
#[inline]
pub fn cut_every(labels: u8) -> Vec<u8> {
    vec![ESC, b'i', b'A', labels.max(1)]
}

/// # Expanded Mode (ESC i K)
///
/// - bit 0: two-color (black/red) printing
/// - bit 3: cut at end of job
/// - bit 6: 600 dpi high resolution
pub fn expanded_mode(two_color: bool, cut_at_end: bool, dpi_600: bool) -> Vec<u8> {
    let mut flags = 0u8;
    if two_color {
        flags |= 0x01;
    }
    if cut_at_end {
        flags |= 0x08;
    }
    if dpi_600 {
        flags |= 0x40;
    }
    vec![ESC, b'i', b'K', flags]
}

/// # Feed Margin (ESC i d nL nH)
///
/// Blank feed before and after the printed area, in dots. Die-cut labels
/// use 0, continuous tape uses 35.
///
/// ```
/// use qlabel::protocol::commands;
///
/// assert_eq!(commands::margins(35), vec![0x1B, b'i', b'd', 35, 0]);
/// ```
pub fn margins(dots: u16) -> Vec<u8> {
    let [lo, hi] = dots.to_le_bytes();
    vec![ESC, b'i', b'd', lo, hi]
}

/// # Select Compression Mode (M n)
///
/// `0x02` selects TIFF PackBits, `0x00` sends rows uncompressed.
#[inline]
pub fn compression(enabled: bool) -> Vec<u8> {
    vec![b'M', if enabled { 0x02 } else { 0x00 }]
}

// ============================================================================
// RASTER ROW COMMANDS
// ============================================================================

/// Color plane for two-color raster rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Black,
    Red,
}

/// # One-Color Raster Row (g 00 n d1..dn)
pub fn raster_row(data: &[u8]) -> Vec<u8> {
    let mut cmd = Vec::with_capacity(3 + data.len());
    cmd.push(b'g');
    cmd.push(0x00);
    cmd.push(data.len() as u8);
    cmd.extend_from_slice(data);
    cmd
}

/// # Two-Color Raster Row (w p n d1..dn)
///
/// `p` is 0x01 for the high-energy (black) plane and 0x02 for the
/// low-energy (red) plane. Both planes must be sent for every row.
pub fn raster_row_two_color(plane: Plane, data: &[u8]) -> Vec<u8> {
    let mut cmd = Vec::with_capacity(3 + data.len());
    cmd.push(b'w');
    cmd.push(match plane {
        Plane::Black => 0x01,
        Plane::Red => 0x02,
    });
    cmd.push(data.len() as u8);
    cmd.extend_from_slice(data);
    cmd
}

/// Print the buffered page and feed (end of job).
#[inline]
pub fn print_last() -> Vec<u8> {
    vec![PRINT_LAST]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_is_all_zero() {
        let cmd = invalidate(200);
        assert_eq!(cmd.len(), 200);
        assert!(cmd.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_print_information_continuous() {
        let media = MediaInfo {
            media_type: MEDIA_CONTINUOUS,
            width_mm: 62,
            length_mm: 0,
        };
        let cmd = print_information(media, false, 271, true);
        assert_eq!(&cmd[0..3], &[ESC, b'i', b'z']);
        assert_eq!(cmd[3], 0x8E);
        assert_eq!(cmd[4], 0x0A);
        assert_eq!(cmd[5], 62);
        assert_eq!(cmd[6], 0);
        assert_eq!(&cmd[7..11], &[0x0F, 0x01, 0x00, 0x00]); // 271 LE
        assert_eq!(cmd[11], 0);
        assert_eq!(cmd.len(), 13);
    }

    #[test]
    fn test_print_information_quality_flag() {
        let media = MediaInfo {
            media_type: MEDIA_DIE_CUT,
            width_mm: 29,
            length_mm: 90,
        };
        let cmd = print_information(media, true, 10, false);
        assert_eq!(cmd[3] & 0x40, 0x40);
        assert_eq!(cmd[11], 1);
    }

    #[test]
    fn test_expanded_mode_flags() {
        assert_eq!(expanded_mode(false, false, false)[3], 0x00);
        assert_eq!(expanded_mode(true, true, false)[3], 0x09);
        assert_eq!(expanded_mode(false, true, true)[3], 0x48);
    }

    #[test]
    fn test_various_mode_autocut() {
        assert_eq!(various_mode(true), vec![ESC, b'i', b'M', 0x40]);
        assert_eq!(various_mode(false), vec![ESC, b'i', b'M', 0x00]);
    }

    #[test]
    fn test_cut_every_never_zero() {
        assert_eq!(cut_every(0)[3], 1);
        assert_eq!(cut_every(3)[3], 3);
    }

    #[test]
    fn test_raster_rows() {
        let data = [0xFF, 0x00, 0xAA];
        assert_eq!(raster_row(&data), vec![b'g', 0x00, 3, 0xFF, 0x00, 0xAA]);
        assert_eq!(
            raster_row_two_color(Plane::Red, &data),
            vec![b'w', 0x02, 3, 0xFF, 0x00, 0xAA]
        );
    }

    #[test]
    fn test_compression_mode() {
        assert_eq!(compression(true), vec![b'M', 0x02]);
        assert_eq!(compression(false), vec![b'M', 0x00]);
    }
}
