use std::borrow::Cow;
use std::fs;
use std::path::Path;

use log::debug;

pub mod diagonal;
pub mod error;
pub mod frame;
pub mod header;
pub mod kind;
pub mod pack;
pub mod palette;
pub mod probe;
pub mod rle;

pub use error::{CelError, Result};
pub use frame::Frame;
pub use header::FrameHeader;
pub use kind::{FrameKind, Orientation};
pub use pack::FrameDescriptor;
pub use palette::Palette;

/// Container family, fixed per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// `.cel`: raw, flat RLE and diagonal frames.
    Flat,
    /// `.cl2`: every frame carries a 10 byte header.
    Headered,
}

impl Family {
    pub fn from_path(path: impl AsRef<Path>) -> Family {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("cl2") => Family::Headered,
            _ => Family::Flat,
        }
    }
}

/// A sprite file with its frame table. Decoding borrows it immutably, so one
/// decoder can serve any number of threads.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    blob: Cow<'a, [u8]>,
    family: Family,
    frames: Vec<FrameDescriptor>,
}

impl<'a> Decoder<'a> {
    pub fn load(blob: impl Into<Cow<'a, [u8]>>, family: Family) -> Result<Self> {
        let blob = blob.into();
        let frames = pack::build_index(&blob, family)?;

        debug!("{family:?} sprite: {} frames", frames.len());

        Ok(Decoder {
            blob,
            family,
            frames,
        })
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn descriptors(&self) -> &[FrameDescriptor] {
        &self.frames
    }

    pub fn frame_bytes(&self, index: usize) -> Result<&[u8]> {
        let frame = self.frames.get(index).ok_or(CelError::Index {
            index,
            count: self.frames.len(),
        })?;

        Ok(&self.blob[frame.offset..frame.end()])
    }

    pub fn kind(&self, index: usize) -> Result<FrameKind> {
        Ok(kind::classify(self.frame_bytes(index)?, self.family))
    }

    pub fn decode_frame(&self, index: usize, palette: &Palette) -> Result<Frame> {
        let bytes = self.frame_bytes(index)?;
        let kind = kind::classify(bytes, self.family);

        debug!("frame {index}: {kind}, {} bytes", bytes.len());

        let (pixels, width) = match kind {
            FrameKind::RawIndexed => (frame::decode_raw(bytes, palette), frame::FIXED_WIDTH),
            FrameKind::Headered => (
                rle::decode_headered(bytes, palette)?,
                rle::headered_width(bytes)?,
            ),
            FrameKind::Flat => (rle::decode_flat(bytes, palette)?, frame::FIXED_WIDTH),
            FrameKind::Diagonal(orientation) => (
                diagonal::decode_diagonal(bytes, palette, orientation)?,
                frame::FIXED_WIDTH,
            ),
        };

        Frame::assemble(pixels, width)
    }

    pub fn decode_all(&self, palette: &Palette) -> Vec<Result<Frame>> {
        (0..self.frame_count())
            .map(|index| self.decode_frame(index, palette))
            .collect()
    }
}

impl Decoder<'static> {
    /// Reads a sprite file, taking the family from its extension.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let blob = fs::read(path)?;

        Decoder::load(blob, Family::from_path(path))
    }
}
