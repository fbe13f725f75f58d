use binread::io::Cursor;
use binread::BinReaderExt;
use log::trace;

use crate::error::{CelError, Result};
use crate::Family;

/// First u32 of a file holding eight frame groups (one per facing direction).
pub const GROUPED_MARKER: u32 = 32;
pub const GROUP_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDescriptor {
    pub offset: usize,
    pub length: usize,
}

impl FrameDescriptor {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

fn read_u32(reader: &mut Cursor<&[u8]>) -> Result<u32> {
    let at = reader.position();

    reader
        .read_le::<u32>()
        .map_err(|_| CelError::TruncatedHeader { at })
}

fn seek(reader: &mut Cursor<&[u8]>, pos: u64) -> Result<()> {
    if pos > reader.get_ref().len() as u64 {
        return Err(CelError::TruncatedHeader { at: pos });
    }

    reader.set_position(pos);

    Ok(())
}

/// Reads one `count, offsets[count + 1]` table at the reader position.
///
/// Offsets are relative to `base`. With `relative_table` set, a table whose first
/// offset points back into the table itself is relative to the end of its offset
/// array instead; only a single-group file is read that way.
fn read_group(
    reader: &mut Cursor<&[u8]>,
    base: usize,
    relative_table: bool,
    frames: &mut Vec<FrameDescriptor>,
) -> Result<()> {
    let table_start = reader.position();
    let count = read_u32(reader)? as usize;

    let table_len = (count + 1) * 4;
    let remaining = reader.get_ref().len() as u64 - reader.position();

    if table_len as u64 > remaining {
        return Err(CelError::TruncatedHeader {
            at: reader.get_ref().len() as u64,
        });
    }

    let offsets = (0..=count)
        .map(|_| read_u32(reader).map(|offset| offset as usize))
        .collect::<Result<Vec<_>>>()?;

    let header_end = reader.position() as usize - base;
    let base = match offsets.first() {
        Some(&first) if relative_table && first < header_end => base + table_len,
        _ => base,
    };

    trace!("group at {table_start}: {count} frames, base {base}");

    for pair in offsets.windows(2) {
        let index = frames.len();

        if pair[1] < pair[0] {
            return Err(CelError::DecreasingOffsets { index });
        }

        frames.push(FrameDescriptor {
            offset: pair[0] + base,
            length: pair[1] - pair[0],
        });
    }

    Ok(())
}

/// Builds the ordered frame table of a whole file.
pub fn build_index(blob: &[u8], family: Family) -> Result<Vec<FrameDescriptor>> {
    let mut reader = Cursor::new(blob);
    let mut frames = Vec::new();

    let first = read_u32(&mut reader)?;

    match (first == GROUPED_MARKER, family) {
        (true, Family::Headered) => {
            seek(&mut reader, 0)?;

            let bases = (0..GROUP_COUNT)
                .map(|_| read_u32(&mut reader))
                .collect::<Result<Vec<_>>>()?;

            for base in bases {
                seek(&mut reader, base as u64)?;
                read_group(&mut reader, base as usize, false, &mut frames)?;
            }
        }
        (true, Family::Flat) => {
            seek(&mut reader, GROUPED_MARKER as u64)?;

            for _ in 0..GROUP_COUNT {
                read_group(&mut reader, 0, false, &mut frames)?;
            }
        }
        (false, _) => {
            seek(&mut reader, 0)?;
            read_group(&mut reader, 0, true, &mut frames)?;
        }
    }

    for (index, frame) in frames.iter().enumerate() {
        if frame.end() > blob.len() {
            return Err(CelError::FrameOutOfBounds {
                index,
                offset: frame.offset,
                end: frame.end(),
                blob_len: blob.len(),
            });
        }
    }

    Ok(frames)
}
