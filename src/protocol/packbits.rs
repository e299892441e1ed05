//! TIFF PackBits run-length compression for raster rows.
//!
//! ```text
//! header 0..=127    → copy the next header+1 bytes literally
//! header -127..=-1  → repeat the next byte 1-header times
//! ```

const MAX_RUN: usize = 128;

/// Compress one raster row.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / MAX_RUN + 1);
    let mut literal_start = 0;
    let mut i = 0;

    while i < data.len() {
        let run = run_length(&data[i..]);

        if run >= 2 {
            flush_literal(&mut out, &data[literal_start..i]);
            out.push((1 - run as i16) as i8 as u8);
            out.push(data[i]);
            i += run;
            literal_start = i;
        } else {
            i += 1;
            if i - literal_start == MAX_RUN {
                flush_literal(&mut out, &data[literal_start..i]);
                literal_start = i;
            }
        }
    }

    flush_literal(&mut out, &data[literal_start..]);
    out
}

fn run_length(data: &[u8]) -> usize {
    let first = data[0];
    data.iter()
        .take(MAX_RUN)
        .take_while(|&&b| b == first)
        .count()
}

fn flush_literal(out: &mut Vec<u8>, literal: &[u8]) {
    if literal.is_empty() {
        return;
    }
    out.push((literal.len() - 1) as u8);
    out.extend_from_slice(literal);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decompress(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < data.len() {
            let header = data[i] as i8;
            i += 1;
            if header >= 0 {
                let n = header as usize + 1;
                out.extend_from_slice(&data[i..i + n]);
                i += n;
            } else if header != -128 {
                let n = (1 - header as i16) as usize;
                out.extend(std::iter::repeat_n(data[i], n));
                i += 1;
            }
        }
        out
    }

    #[test]
    fn test_empty_row() {
        assert!(compress(&[]).is_empty());
    }

    #[test]
    fn test_blank_row_collapses() {
        // A blank 90-byte QL-800 row is a single repeat packet
        let row = vec![0u8; 90];
        assert_eq!(compress(&row), vec![(1i16 - 90) as i8 as u8, 0x00]);
    }

    #[test]
    fn test_literal_only() {
        let row = [1, 2, 3, 4];
        assert_eq!(compress(&row), vec![3, 1, 2, 3, 4]);
    }

    #[test]
    fn test_mixed_runs_decode_to_input() {
        let mut row = vec![0xAA, 0xBB];
        row.extend([0x00; 40]);
        row.extend([0x12, 0x34, 0x56]);
        row.extend([0xFF; 3]);
        assert_eq!(decompress(&compress(&row)), row);
    }

    #[test]
    fn test_long_literal_split_at_128() {
        let row: Vec<u8> = (0..162u16).map(|v| (v % 251) as u8).collect();
        let packed = compress(&row);
        assert_eq!(packed[0], 127);
        assert_eq!(decompress(&packed), row);
    }

    #[test]
    fn test_long_run_split_at_128() {
        let row = vec![0x7Fu8; 200];
        let packed = compress(&row);
        assert_eq!(packed.len(), 4);
        assert_eq!(decompress(&packed), row);
    }
}
