use crate::Family;

/// Size of an uncompressed 32x32 block.
pub const RAW_FRAME_LEN: usize = 1024;

/// Zero-byte pairs expected at fixed offsets, plus the shortest frame that can carry them.
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub min_length: usize,
    pub offsets: &'static [usize],
}

impl Signature {
    pub fn matches(&self, frame: &[u8]) -> bool {
        frame.len() >= self.min_length
            && self
                .offsets
                .iter()
                .all(|&off| frame.get(off..off + 2) == Some(&[0, 0][..]))
    }
}

// These tables match the legacy asset files byte for byte. Do not derive them.
pub const ASCENDING_UPPER: Signature = Signature {
    min_length: 226,
    offsets: &[0, 8, 24, 48, 80, 120, 168, 224],
};

pub const ASCENDING_LOWER: Signature = Signature {
    min_length: 530,
    offsets: &[288, 348, 400, 444, 480, 508, 528],
};

pub const DESCENDING_UPPER: Signature = Signature {
    min_length: 196,
    offsets: &[2, 14, 34, 62, 98, 142, 194],
};

pub const DESCENDING_LOWER: Signature = Signature {
    min_length: 196,
    offsets: &[254, 318, 374, 422, 462, 494, 518, 534],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Padding before the pixels of each row.
    Ascending,
    /// Padding after the pixels of each row.
    Descending,
}

impl Orientation {
    pub fn upper(self) -> Signature {
        match self {
            Orientation::Ascending => ASCENDING_UPPER,
            Orientation::Descending => DESCENDING_UPPER,
        }
    }

    pub fn lower(self) -> Signature {
        match self {
            Orientation::Ascending => ASCENDING_LOWER,
            Orientation::Descending => DESCENDING_LOWER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    RawIndexed,
    Headered,
    Flat,
    Diagonal(Orientation),
}

impl std::fmt::Display for FrameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FrameKind::RawIndexed => "raw",
            FrameKind::Headered => "headered",
            FrameKind::Flat => "flat",
            FrameKind::Diagonal(Orientation::Ascending) => "diagonal-ascending",
            FrameKind::Diagonal(Orientation::Descending) => "diagonal-descending",
        };

        f.write_str(name)
    }
}

/// Picks the decoder for one frame. The format has no tag, so this sniffs bytes.
pub fn classify(frame: &[u8], family: Family) -> FrameKind {
    if family == Family::Headered {
        return FrameKind::Headered;
    }

    if frame.len() == RAW_FRAME_LEN {
        return FrameKind::RawIndexed;
    }

    // descending wins when a frame carries both tables
    [Orientation::Descending, Orientation::Ascending]
        .into_iter()
        .find(|orientation| orientation.upper().matches(frame))
        .map_or(FrameKind::Flat, FrameKind::Diagonal)
}

#[cfg(test)]
mod test {
    use super::*;

    fn with_zeros(len: usize, signature: Signature) -> Vec<u8> {
        let mut frame = vec![0xAA; len];

        for &off in signature.offsets {
            frame[off] = 0;
            frame[off + 1] = 0;
        }

        frame
    }

    #[test]
    fn headered_family_ignores_contents() {
        assert_eq!(classify(&[0; 1024], Family::Headered), FrameKind::Headered);
    }

    #[test]
    fn raw_by_length() {
        assert_eq!(classify(&[0; 1024], Family::Flat), FrameKind::RawIndexed);
    }

    #[test]
    fn descending_signature() {
        let frame = with_zeros(300, DESCENDING_UPPER);

        assert_eq!(
            classify(&frame, Family::Flat),
            FrameKind::Diagonal(Orientation::Descending)
        );
    }

    #[test]
    fn ascending_signature() {
        let frame = with_zeros(300, ASCENDING_UPPER);

        assert_eq!(
            classify(&frame, Family::Flat),
            FrameKind::Diagonal(Orientation::Ascending)
        );
    }

    #[test]
    fn signature_needs_minimum_length() {
        let signature = Signature {
            min_length: 10,
            offsets: &[0, 2],
        };

        assert!(signature.matches(&[0; 10]));
        assert!(!signature.matches(&[0; 9]));
    }

    #[test]
    fn one_nonzero_byte_breaks_signature() {
        let mut frame = with_zeros(300, DESCENDING_UPPER);
        frame[143] = 1;

        assert_eq!(classify(&frame, Family::Flat), FrameKind::Flat);
    }

    #[test]
    fn offsets_past_frame_do_not_match() {
        let frame = with_zeros(540, DESCENDING_LOWER);

        assert!(DESCENDING_LOWER.matches(&frame));
        assert!(!DESCENDING_LOWER.matches(&frame[..400]));
    }

    #[test]
    fn descending_checked_first() {
        let frame = vec![0u8; 600];

        assert_eq!(
            classify(&frame, Family::Flat),
            FrameKind::Diagonal(Orientation::Descending)
        );
    }

    #[test]
    fn short_frame_is_flat() {
        assert_eq!(classify(&[0x02, 0x01, 0x02, 0xFE], Family::Flat), FrameKind::Flat);
    }
}
