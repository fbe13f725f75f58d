use image::RgbaImage;

use crate::error::{CelError, Result};
use crate::palette::Palette;

/// Width of every frame outside the headered family.
pub const FIXED_WIDTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl Frame {
    /// Pairs decoded RGBA bytes with a width. The bytes must split into whole rows.
    pub fn assemble(pixels: Vec<u8>, width: usize) -> Result<Frame> {
        if width == 0 {
            return Err(CelError::ZeroWidth);
        }

        if pixels.is_empty() {
            return Err(CelError::EmptyFrame);
        }

        let stride = width * 4;

        if pixels.len() % stride != 0 {
            return Err(CelError::InexactHeight {
                len: pixels.len(),
                width,
            });
        }

        Ok(Frame {
            width,
            height: pixels.len() / stride,
            pixels,
        })
    }

    pub fn to_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width as u32, self.height as u32, self.pixels.clone())
    }
}

/// Forward-only reader over one frame's bytes; every read is checked against the frame length.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        ByteCursor { bytes, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn truncated(&self, at: usize) -> CelError {
        CelError::TruncatedFrame {
            at,
            length: self.bytes.len(),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = *self.bytes.get(self.pos).ok_or(self.truncated(self.pos))?;
        self.pos += 1;

        Ok(byte)
    }

    pub fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.bytes;
        let end = self.pos + count;
        let run = bytes.get(self.pos..end).ok_or(self.truncated(end))?;
        self.pos = end;

        Ok(run)
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.bytes.len() {
            return Err(self.truncated(pos));
        }

        self.pos = pos;

        Ok(())
    }

    pub fn rest(&mut self) -> &'a [u8] {
        let bytes = self.bytes;
        let rest = &bytes[self.pos.min(bytes.len())..];
        self.pos = self.bytes.len();

        rest
    }
}

/// Scratch state of a single decode call.
pub struct DecodeContext<'a> {
    pub src: ByteCursor<'a>,
    palette: &'a Palette,
    out: Vec<u8>,
}

impl<'a> DecodeContext<'a> {
    pub fn new(frame: &'a [u8], palette: &'a Palette) -> Self {
        DecodeContext {
            src: ByteCursor::new(frame),
            palette,
            out: Vec::with_capacity(FIXED_WIDTH * FIXED_WIDTH * 4),
        }
    }

    pub fn put_color(&mut self, idx: u8) {
        let [r, g, b] = self.palette.color(idx);

        self.out.extend_from_slice(&[r, g, b, 255]);
    }

    pub fn put_colors(&mut self, indices: &[u8]) {
        for &idx in indices {
            self.put_color(idx);
        }
    }

    pub fn fill_transparent(&mut self, count: usize) {
        self.out.resize(self.out.len() + count * 4, 0);
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.out
    }
}

/// Uncompressed 32x32 block, one palette index per byte.
pub fn decode_raw(frame: &[u8], palette: &Palette) -> Vec<u8> {
    let mut ctx = DecodeContext::new(frame, palette);
    let indices = ctx.src.rest();
    ctx.put_colors(indices);

    ctx.into_pixels()
}
