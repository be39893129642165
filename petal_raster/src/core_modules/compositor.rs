// THEORY:
// The compositor paints. It takes the classifier's `Region`, the scan row and the
// active-video flag, and produces the final 2-bit color triple. It is the last
// stage of the per-pixel path and, like the stages before it, is a total pure
// function: every input has an answer and nothing is remembered.
//
// The background is a four-step sky. Bits 8:7 of the row pick a band 128 rows
// tall, and that band value is written to both red and blue, so the sky runs
// from black at the top to full magenta at the bottom of the visible area.
//
// Blanking is absolute. Outside the active area the output is black no matter
// what the pixel would otherwise have been.

use crate::core_modules::color::color::{Channel, Color, MAX_CHANNEL, Region};
use crate::core_modules::geometry::Coordinate;

/// Row bits below this shift are ignored by the sky gradient.
pub const SKY_BAND_SHIFT: u32 = 7;

pub const CENTER_COLOR: Color = Color::new(3, 3, 0);
pub const PETAL_COLOR: Color = Color::new(3, 1, 2);

/// The 2-bit sky gradient sample for a scan row.
#[inline]
pub fn sky_blue(y: Coordinate) -> Channel {
    ((y >> SKY_BAND_SHIFT) & MAX_CHANNEL as Coordinate) as Channel
}

/// Maps a region on a given row to its output color, or black when blanked.
#[inline]
pub fn composite(region: Region, y: Coordinate, active: bool) -> Color {
    if !active {
        return Color::BLACK;
    }

    match region {
        Region::Center => CENTER_COLOR,
        Region::Petal => PETAL_COLOR,
        Region::Background => {
            let sky = sky_blue(y);
            Color::new(sky, 0, sky)
        }
    }
}
