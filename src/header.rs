use binread::{io::Cursor, BinRead};

use crate::error::{CelError, Result};

pub const HEADER_LEN: usize = 10;

/// Leading block of every headered-family frame.
#[derive(BinRead, Debug, Clone, Copy, PartialEq, Eq)]
#[br(little)]
pub struct FrameHeader {
    pub size: u16,
    pub row_offsets: [u16; 4],
}

impl FrameHeader {
    pub fn parse(frame: &[u8]) -> Result<FrameHeader> {
        if frame.len() < HEADER_LEN {
            return Err(CelError::TruncatedFrame {
                at: HEADER_LEN,
                length: frame.len(),
            });
        }

        let mut reader = Cursor::new(frame);

        FrameHeader::read(&mut reader).map_err(|_| CelError::TruncatedFrame {
            at: HEADER_LEN,
            length: frame.len(),
        })
    }

    /// Frame-relative offset of the command that starts row 32.
    pub fn width_marker(&self) -> usize {
        self.row_offsets[0] as usize
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_little_endian_fields() {
        let frame = [10, 0, 0x34, 0x12, 1, 0, 2, 0, 3, 0, 0xff];
        let header = FrameHeader::parse(&frame).unwrap();

        assert_eq!(header.size, 10);
        assert_eq!(header.width_marker(), 0x1234);
        assert_eq!(header.row_offsets, [0x1234, 1, 2, 3]);
    }

    #[test]
    fn short_frame_is_truncated() {
        assert!(matches!(
            FrameHeader::parse(&[10, 0, 0]),
            Err(CelError::TruncatedFrame { at: 10, length: 3 })
        ));
    }
}
