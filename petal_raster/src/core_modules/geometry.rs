// THEORY:
// The `geometry` module measures how far a pixel is from every landmark in the
// scene. It is the analytical layer of the engine: given a coordinate it produces
// squared distances, and it never decides what those distances mean.
//
// Key architectural principles:
// 1.  **Squared Distance Field**: Membership in a circle of radius r is tested as
//     `dx² + dy² < r²`. No square roots, no floats; every boundary is exact.
// 2.  **Width Discipline**: Deltas are `i32` and squares are `u32`. Coordinates are
//     clamped below `MAX_SCAN_EXTENT`, so the widest delta is roughly ±2000 and
//     its square sum fits comfortably for any input. Narrower types would wrap
//     silently and bend the petals.
// 3.  **One Table, One Loop**: The six petals are not six copies of the same
//     arithmetic. They are a fixed table of offsets folded over by the same
//     squared-distance routine as the center.
// 4.  **Integer Hexagon**: Petals sit on a hexagon whose 60° positions use
//     `7·D/8` in place of `D·sin 60°`. The approximation is part of the picture
//     and is kept exactly.

pub type Coordinate = u32;
pub type Delta = i32;
pub type SquaredDistance = u32;

/// Coordinates at or beyond this are clamped to the last supported position.
/// Every valid scan mode fits below it.
pub const MAX_SCAN_EXTENT: Coordinate = 2048;

/// Horizontal position of the flower's center.
pub const CENTER_X: Delta = 320;
/// Vertical position of the flower's center.
pub const CENTER_Y: Delta = 240;
/// Squared radius of the center disk.
pub const CENTER_R2: SquaredDistance = 256;
/// Squared radius of a petal before modulation.
pub const BASE_PETAL_R2: SquaredDistance = 784;
/// Distance from the flower center to each petal center.
pub const PETAL_DISTANCE: Delta = 48;

pub const PETAL_COUNT: usize = 6;

const HALF: Delta = PETAL_DISTANCE / 2;
const SLANT: Delta = 7 * PETAL_DISTANCE / 8;

/// Petal centers relative to the flower center, counter-clockwise from +x.
pub const PETAL_OFFSETS: [(Delta, Delta); PETAL_COUNT] = [
    (PETAL_DISTANCE, 0),
    (HALF, SLANT),
    (-HALF, SLANT),
    (-PETAL_DISTANCE, 0),
    (-HALF, -SLANT),
    (HALF, -SLANT),
];

/// Squared distances from one pixel to the center and to each petal center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Distances {
    pub center: SquaredDistance,
    pub petals: [SquaredDistance; PETAL_COUNT],
}

#[inline]
fn squared(dx: Delta, dy: Delta) -> SquaredDistance {
    (dx * dx + dy * dy) as SquaredDistance
}

/// Measures the pixel at `(x, y)` against every landmark. Coordinates past
/// the supported scan extent measure as if they sat on its last row or column.
#[inline]
pub fn evaluate(x: Coordinate, y: Coordinate) -> Distances {
    let x = x.min(MAX_SCAN_EXTENT - 1);
    let y = y.min(MAX_SCAN_EXTENT - 1);
    let dx = x as Delta - CENTER_X;
    let dy = y as Delta - CENTER_Y;

    let petals = PETAL_OFFSETS.map(|(offset_x, offset_y)| squared(dx - offset_x, dy - offset_y));

    Distances {
        center: squared(dx, dy),
        petals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn petal_offsets_use_integer_hexagon() {
        assert_eq!(
            PETAL_OFFSETS,
            [(48, 0), (24, 42), (-24, 42), (-48, 0), (-24, -42), (24, -42)]
        );
    }

    #[test]
    fn center_pixel_is_zero_from_center() {
        let distances = evaluate(320, 240);
        assert_eq!(distances.center, 0);
        assert_eq!(distances.petals[0], 48 * 48);
        assert_eq!(distances.petals[3], 48 * 48);
        // 24² + 42² for the slanted petals.
        assert_eq!(distances.petals[1], 2340);
    }

    #[test]
    fn each_petal_center_is_zero_from_its_petal() {
        for (index, (offset_x, offset_y)) in PETAL_OFFSETS.iter().enumerate() {
            let x = (CENTER_X + offset_x) as Coordinate;
            let y = (CENTER_Y + offset_y) as Coordinate;
            assert_eq!(evaluate(x, y).petals[index], 0, "petal {index}");
        }
    }

    #[test]
    fn scan_corners_do_not_overflow() {
        // Far corner of an 800x525 scan.
        let far = evaluate(799, 524);
        assert_eq!(far.center, 479 * 479 + 284 * 284);
        // Origin sits up and to the left of every landmark.
        let origin = evaluate(0, 0);
        assert_eq!(origin.center, 320 * 320 + 240 * 240);
        assert_eq!(origin.petals[3], 272 * 272 + 240 * 240);
    }

    #[test]
    fn oversized_coordinates_clamp_instead_of_overflowing() {
        let edge = evaluate(MAX_SCAN_EXTENT - 1, MAX_SCAN_EXTENT - 1);
        assert_eq!(evaluate(u32::MAX, u32::MAX), edge);
        assert_eq!(evaluate(50_000, 2047), edge);
        assert_eq!(edge.center, 1727 * 1727 + 1807 * 1807);
    }
}
