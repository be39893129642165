// THEORY:
// The shape classifier is where distances become meaning. It reads the squared
// distances the geometry layer measured, compares them against the fixed center
// radius and the current petal threshold, and returns exactly one `Region`.
//
// Key architectural principles:
// 1.  **Precedence, not geometry**: Center beats Petal beats Background. Nothing
//     about the shapes guarantees they are disjoint, and the classifier does not
//     rely on it. With a fully swollen petal (threshold 2254) and the petal
//     centers only 48 pixels out, petals do reach into the center disk; the
//     ordering of the checks is what keeps the disk whole.
// 2.  **Strict inequality**: A pixel exactly on a boundary (`d² == r²`) is
//     outside. This matches the `<` used throughout the squared distance field.

use crate::core_modules::color::color::Region;
use crate::core_modules::geometry::{CENTER_R2, Distances, SquaredDistance};

/// Whether the pixel lies inside the center disk.
#[inline]
pub fn in_center(distances: &Distances) -> bool {
    distances.center < CENTER_R2
}

/// Whether the pixel lies inside any petal at the given squared radius.
#[inline]
pub fn in_petal(distances: &Distances, petal_r2: SquaredDistance) -> bool {
    distances.petals.iter().any(|&d2| d2 < petal_r2)
}

/// Resolves a pixel's region with fixed precedence: center, then petal, then background.
#[inline]
pub fn classify(distances: &Distances, petal_r2: SquaredDistance) -> Region {
    if in_center(distances) {
        Region::Center
    } else if in_petal(distances, petal_r2) {
        Region::Petal
    } else {
        Region::Background
    }
}
