// THEORY:
// The radius modulator turns the frame counter into motion. It maps the
// counter's low nibble onto a petal acceptance threshold that grows by one
// eighth of the base squared radius per frame, then snaps back to the base size
// when the nibble wraps. The result is a 16-frame sawtooth, not a sine: petals
// swell for fifteen frames and collapse in one.

use crate::core_modules::frame_counter::SCALE_MASK;
use crate::core_modules::geometry::{BASE_PETAL_R2, SquaredDistance};

/// Divisor applied to `BASE_PETAL_R2 * scale`; each scale step adds 1/8 of the base.
pub const SCALE_DIVISOR: SquaredDistance = 8;

/// Squared petal radius for a modulation step. Only the low four bits of
/// `scale` are used.
#[inline]
pub fn threshold(scale: u8) -> SquaredDistance {
    let scale = (scale & SCALE_MASK) as SquaredDistance;
    BASE_PETAL_R2 + (BASE_PETAL_R2 * scale) / SCALE_DIVISOR
}

/// Squared petal radius for a full frame counter value.
#[inline]
pub fn threshold_for_counter(value: u8) -> SquaredDistance {
    threshold(value & SCALE_MASK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_of_the_pulse() {
        assert_eq!(threshold(0), 784);
        assert_eq!(threshold(15), 2254);
    }

    #[test]
    fn truncates_toward_zero() {
        // 784 * 3 / 8 = 294
        assert_eq!(threshold(3), 784 + 294);
        // 784 * 5 / 8 = 490
        assert_eq!(threshold(5), 784 + 490);
    }

    #[test]
    fn rises_across_the_cycle() {
        let steps: Vec<SquaredDistance> = (0..16).map(threshold).collect();
        assert!(steps.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn depends_only_on_counter_mod_16() {
        for value in 0..=u8::MAX {
            assert_eq!(threshold_for_counter(value), threshold(value % 16), "counter {value}");
        }
    }

    #[test]
    fn snaps_back_after_wrap() {
        assert_eq!(threshold_for_counter(15), 2254);
        assert_eq!(threshold_for_counter(16), 784);
    }
}
