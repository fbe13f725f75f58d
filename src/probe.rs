//! Width guess for headerless flat frames.
//!
//! Decoding always uses a width of 32 for flat frames. This guess is only
//! reported (see `cel-to-png info`) so files whose first line wraps at some
//! other width can be found.

/// Walks the first line of runs until the run pattern suggests a line wrap.
///
/// Literal runs are at most 127 pixels, so a line wider than that is a chain of
/// 127-pixel runs closed by a shorter one. Lines that start or end transparent
/// are closed by the second transparency run. Returns `None` when the walk needs
/// a byte past the end of the frame.
pub fn headerless_width(frame: &[u8]) -> Option<usize> {
    let mut width = 0;
    let mut has_trans = false;
    let mut last = 0u8;
    let mut last_trans = 0u8;

    let mut i = 0;

    while i < frame.len() {
        let command = frame[i];
        let next = *frame.get(i + 1)?;

        if command <= 127 {
            width += command as usize;
            i += command as usize;

            // a few pixels, then transparent to the end of the line
            if next >= 128 {
                has_trans = true;
            }
        } else {
            // transparent, then a few pixels at the end of the line
            if command == last_trans && last <= 127 && last == next {
                break;
            }

            width += 256 - command as usize;

            if (has_trans || next >= 128) && command != 128 {
                break;
            }

            has_trans = true;
            last_trans = command;
        }

        if command != 127 && !has_trans {
            break;
        }

        last = command;
        i += 1;
    }

    (width > 0).then_some(width)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn single_literal_line() {
        let mut frame = vec![20];
        frame.extend([1u8; 20]);
        frame.push(20);
        frame.extend([1u8; 20]);

        assert_eq!(headerless_width(&frame), Some(20));
    }

    #[test]
    fn wide_line_chains_full_runs() {
        let mut frame = vec![127];
        frame.extend([1u8; 127]);
        frame.push(33);
        frame.extend([1u8; 33]);
        frame.push(0);

        assert_eq!(headerless_width(&frame), Some(160));
    }

    #[test]
    fn transparent_then_pixels() {
        // 22 transparent and 10 pixels per line, repeated on the second line
        let mut frame = Vec::new();
        for _ in 0..2 {
            frame.extend([(256 - 22) as u8, 10]);
            frame.extend([1u8; 10]);
        }

        assert_eq!(headerless_width(&frame), Some(32));
    }

    #[test]
    fn needs_bytes_past_end() {
        assert_eq!(headerless_width(&[0xF0]), None);
        assert_eq!(headerless_width(&[]), None);
    }
}
