use std::{fs, path::Path};

use crate::error::{CelError, Result};

pub const PALETTE_SIZE: usize = 256 * 3;

/// 256 RGB entries, as stored in a raw `.pal` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette([[u8; 3]; 256]);

impl Palette {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PALETTE_SIZE {
            return Err(CelError::PaletteSize { len: bytes.len() });
        }

        let mut colors = [[0u8; 3]; 256];

        for (color, chunk) in colors.iter_mut().zip(bytes.chunks_exact(3)) {
            *color = [chunk[0], chunk[1], chunk[2]];
        }

        Ok(Palette(colors))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path)?;

        Self::from_bytes(&bytes)
    }

    pub fn grayscale() -> Self {
        let mut colors = [[0u8; 3]; 256];

        for (idx, color) in colors.iter_mut().enumerate() {
            *color = [idx as u8; 3];
        }

        Palette(colors)
    }

    pub fn color(&self, idx: u8) -> [u8; 3] {
        self.0[idx as usize]
    }
}

impl From<[[u8; 3]; 256]> for Palette {
    fn from(colors: [[u8; 3]; 256]) -> Self {
        Palette(colors)
    }
}
