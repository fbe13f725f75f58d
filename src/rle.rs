use crate::error::{CelError, Result};
use crate::frame::{ByteCursor, DecodeContext};
use crate::header::{FrameHeader, HEADER_LEN};
use crate::palette::Palette;

/// Headered frames always hold 32 rows above the width marker.
pub const HEADERED_ROWS: usize = 32;
/// Largest literal run of the headered dialect; longer counts are repeats.
pub const LITERAL_MAX: usize = 65;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Run<'a> {
    Literal(&'a [u8]),
    Repeat { idx: u8, count: usize },
    Transparent(usize),
}

impl Run<'_> {
    pub fn pixels(&self) -> usize {
        match self {
            Run::Literal(indices) => indices.len(),
            Run::Repeat { count, .. } => *count,
            Run::Transparent(count) => *count,
        }
    }

    fn emit(&self, ctx: &mut DecodeContext) {
        match *self {
            Run::Literal(indices) => ctx.put_colors(indices),
            Run::Repeat { idx, count } => {
                for _ in 0..count {
                    ctx.put_color(idx);
                }
            }
            Run::Transparent(count) => ctx.fill_transparent(count),
        }
    }
}

/// Reads one headered-dialect command.
pub fn headered_run<'a>(src: &mut ByteCursor<'a>) -> Result<Run<'a>> {
    let command = src.read_u8()?;

    if command <= 127 {
        return Ok(Run::Transparent(command as usize));
    }

    let value = 256 - command as usize;

    if value <= LITERAL_MAX {
        Ok(Run::Literal(src.take(value)?))
    } else {
        Ok(Run::Repeat {
            idx: src.read_u8()?,
            count: value - LITERAL_MAX,
        })
    }
}

/// Reads one flat-dialect command.
pub fn flat_run<'a>(src: &mut ByteCursor<'a>) -> Result<Run<'a>> {
    let command = src.read_u8()?;

    if command <= 127 {
        Ok(Run::Literal(src.take(command as usize)?))
    } else {
        Ok(Run::Transparent(256 - command as usize))
    }
}

pub fn decode_headered(frame: &[u8], palette: &Palette) -> Result<Vec<u8>> {
    let mut ctx = DecodeContext::new(frame, palette);
    ctx.src.seek(HEADER_LEN)?;

    while !ctx.src.is_done() {
        let run = headered_run(&mut ctx.src)?;
        run.emit(&mut ctx);
    }

    Ok(ctx.into_pixels())
}

/// Counts pixels up to the header's width marker; the count covers exactly 32 rows.
pub fn headered_width(frame: &[u8]) -> Result<usize> {
    let marker = FrameHeader::parse(frame)?.width_marker();

    let mut src = ByteCursor::new(frame);
    src.seek(HEADER_LEN)?;

    let mut pixels = 0;

    loop {
        if src.position() == marker {
            return Ok(pixels / HEADERED_ROWS);
        }

        if src.is_done() || src.position() > marker {
            return Err(CelError::WidthMarkerMissed { marker });
        }

        pixels += headered_run(&mut src)?.pixels();
    }
}

pub fn decode_flat(frame: &[u8], palette: &Palette) -> Result<Vec<u8>> {
    let mut ctx = DecodeContext::new(frame, palette);

    while !ctx.src.is_done() {
        let run = flat_run(&mut ctx.src)?;
        run.emit(&mut ctx);
    }

    Ok(ctx.into_pixels())
}
