#[derive(Debug, thiserror::Error)]
pub enum CelError {
    #[error("Truncated frame table at byte {at}")]
    TruncatedHeader { at: u64 },
    #[error("Frame {index} spans {offset}..{end}, past the end of a {blob_len} byte file")]
    FrameOutOfBounds {
        index: usize,
        offset: usize,
        end: usize,
        blob_len: usize,
    },
    #[error("Frame {index} ends before it starts")]
    DecreasingOffsets { index: usize },
    #[error("Read past the end of a {length} byte frame at byte {at}")]
    TruncatedFrame { at: usize, length: usize },
    #[error("Command stream never lands on width marker {marker}")]
    WidthMarkerMissed { marker: usize },
    #[error("Frame width resolved to zero")]
    ZeroWidth,
    #[error("{len} pixel bytes do not split into rows of width {width}")]
    InexactHeight { len: usize, width: usize },
    #[error("Frame decoded to no pixels")]
    EmptyFrame,
    #[error("Frame {index} out of range, file has {count} frames")]
    Index { index: usize, count: usize },
    #[error("Palette must be 768 bytes, got {len}")]
    PaletteSize { len: usize },
    #[error("IOError: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl CelError {
    /// True for every error caused by malformed frame or table data.
    pub fn is_format(&self) -> bool {
        !matches!(
            self,
            CelError::Index { .. } | CelError::PaletteSize { .. } | CelError::Io { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CelError>;
