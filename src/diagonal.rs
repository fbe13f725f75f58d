use crate::error::Result;
use crate::frame::{DecodeContext, FIXED_WIDTH};
use crate::kind::Orientation;
use crate::palette::Palette;

const HALF_ROWS: usize = 16;
const MARKER_LEN: usize = 2;
/// Start of the uncompressed lower half when the lower signature is absent.
const FLAT_LOWER_OFFSET: usize = 256;

fn row_width(row: usize) -> usize {
    if row < HALF_ROWS {
        2 + row * 2
    } else {
        FIXED_WIDTH - (row - HALF_ROWS) * 2
    }
}

fn has_marker(row: usize, orientation: Orientation) -> bool {
    let even = row % 2 == 0;
    let upper = row < HALF_ROWS;

    match orientation {
        Orientation::Ascending => upper == even,
        Orientation::Descending => upper != even,
    }
}

fn draw_rows(
    ctx: &mut DecodeContext,
    rows: std::ops::Range<usize>,
    orientation: Orientation,
) -> Result<()> {
    for row in rows {
        if has_marker(row, orientation) {
            ctx.src.skip(MARKER_LEN)?;
        }

        let width = row_width(row);
        let indices = ctx.src.take(width)?;

        match orientation {
            Orientation::Ascending => {
                ctx.fill_transparent(FIXED_WIDTH - width);
                ctx.put_colors(indices);
            }
            Orientation::Descending => {
                ctx.put_colors(indices);
                ctx.fill_transparent(FIXED_WIDTH - width);
            }
        }
    }

    Ok(())
}

/// Isometric 32x32 diamond, stored row by row with alignment markers.
pub fn decode_diagonal(
    frame: &[u8],
    palette: &Palette,
    orientation: Orientation,
) -> Result<Vec<u8>> {
    let mut ctx = DecodeContext::new(frame, palette);

    draw_rows(&mut ctx, 0..HALF_ROWS, orientation)?;

    if orientation.lower().matches(frame) {
        draw_rows(&mut ctx, HALF_ROWS..FIXED_WIDTH, orientation)?;
    } else {
        ctx.src.seek(FLAT_LOWER_OFFSET)?;

        let indices = ctx.src.rest();
        ctx.put_colors(indices);
    }

    Ok(ctx.into_pixels())
}
