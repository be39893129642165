pub mod image_helper {
    use crate::core_modules::color::color::{Byte, Color};
    use image::ImageEncoder;
    use std::path::Path;

    const RGBA_CHANNELS: usize = 4;

    /// Packs 2-bit colors into a row-major RGBA8 buffer.
    pub fn pack_rgba(colors: &[Color]) -> Vec<Byte> {
        let mut buffer = Vec::with_capacity(colors.len() * RGBA_CHANNELS);
        for color in colors {
            buffer.extend_from_slice(&color.to_rgba8());
        }
        buffer
    }

    pub fn save(
        path: impl AsRef<Path>,
        width: u32,
        height: u32,
        buffer: &[Byte],
    ) -> Result<(), image::error::ImageError> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(buffer, width, height, image::ExtendedColorType::Rgba8)?;

        Ok(())
    }
}
