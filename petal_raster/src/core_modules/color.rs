// THEORY:
// The `Color` module is the output vocabulary of the raster engine. Like the
// pixel container it descends from, it is a "dumb" data holder: three 2-bit
// channel intensities and nothing else. It knows how to widen itself into the
// 8-bit bytes a framebuffer or PNG encoder expects, but it has no idea where a
// pixel sits on screen or why it got the color it has.
//
// Key principles:
// 1) Narrow by construction: every channel is masked to 0..=3 on the way in, so
//    no consumer ever has to range-check a `Color`.
// 2) `Region` lives here too. It is the classifier's verdict and the
//    compositor's input, and keeping both ends of that handoff in one leaf module
//    means neither of them depends on the other.

pub mod color {
    pub type Byte = u8;
    /// A 2-bit channel intensity carried in a byte. Only the low two bits are used.
    pub type Channel = Byte;

    /// Highest value a 2-bit channel can carry.
    pub const MAX_CHANNEL: Channel = 0b11;
    /// Multiplier that spreads 0..=3 evenly over 0..=255.
    pub const CHANNEL_EXPANSION: Byte = 85;

    const CHANNELS: usize = 4;

    /// The mutually exclusive scene regions a pixel can fall into.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Region {
        /// Inside the pulsating center disk. Wins over everything else.
        Center,
        /// Inside at least one of the six petals and not inside the center.
        Petal,
        /// Everything else: the vertical sky gradient.
        Background,
    }

    /// Three 2-bit channel intensities.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Color {
        /// The red channel value (0-3).
        pub red: Channel,
        /// The green channel value (0-3).
        pub green: Channel,
        /// The blue channel value (0-3).
        pub blue: Channel,
    }

    impl Color {
        /// All channels off. Also what blanking intervals emit.
        pub const BLACK: Color = Color { red: 0, green: 0, blue: 0 };

        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Color {
                red: red & MAX_CHANNEL,
                green: green & MAX_CHANNEL,
                blue: blue & MAX_CHANNEL,
            }
        }

        #[inline]
        fn expand(channel: Channel) -> Byte {
            channel * CHANNEL_EXPANSION
        }

        /// Widens the 2-bit channels to full bytes as opaque RGBA.
        #[inline]
        pub fn to_rgba8(self) -> [Byte; CHANNELS] {
            [
                Self::expand(self.red),
                Self::expand(self.green),
                Self::expand(self.blue),
                Byte::MAX,
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::color::*;

    #[test]
    fn new_masks_channels_to_two_bits() {
        let color = Color::new(7, 4, 0xFF);
        assert_eq!(color, Color { red: 3, green: 0, blue: 3 });
    }

    #[test]
    fn expansion_spans_full_byte_range() {
        let expanded: Vec<Byte> = (0..=MAX_CHANNEL).map(|c| Color::new(c, 0, 0).to_rgba8()[0]).collect();
        assert_eq!(expanded, vec![0, 85, 170, 255]);
    }

    #[test]
    fn petal_color_widens_to_opaque_rgba() {
        assert_eq!(Color::new(3, 1, 2).to_rgba8(), [255, 85, 170, 255]);
    }
}
