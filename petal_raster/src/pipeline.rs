// THEORY:
// The `pipeline` module is the top-level API for the raster engine. It ties the
// per-pixel stages into one call (`evaluate_pixel`) and wraps that call in a
// `RasterPipeline` that behaves the way the engine would inside real video
// hardware: a timing generator ticks once per pixel clock, every tick produces a
// color, and the frame counter advances on the vsync edge.
//
// The per-pixel path is a pure function of (x, y, counter value, active). The
// counter is passed in as a plain `u8` snapshot, never read from shared state, so
// the same function serves this sequential pipeline, the parallel renderer and
// any test that wants to probe a single pixel.

use crate::core_modules::color::color::{Color, Region};
use crate::core_modules::compositor::composite;
use crate::core_modules::frame_counter::FrameCounter;
use crate::core_modules::geometry::{self, Coordinate};
use crate::core_modules::radius_modulator::threshold_for_counter;
use crate::core_modules::raster_timing::{RasterScan, RasterTiming, ScanSignals};
use crate::core_modules::shape_classifier::classify;
use crate::core_modules::utils::image_helper::image_helper;
use log::debug;
use std::path::Path;

const DEFAULT_FRAMES_PER_SECOND: u32 = 60;

/// Configuration for the raster engine and the renderers built on it.
#[derive(Debug, Clone)]
pub struct RasterConfig {
    /// Scan geometry, including blanking.
    pub timing: RasterTiming,
    /// Number of band workers the parallel renderer spawns.
    pub worker_count: usize,
    /// Rate of the free-running frame clock in the parallel renderer.
    pub frames_per_second: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            timing: RasterTiming::default(),
            worker_count: num_cpus::get(),
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
        }
    }
}

/// Region of a pixel for a given frame counter value.
#[inline]
pub fn evaluate_region(x: Coordinate, y: Coordinate, counter: u8) -> Region {
    let distances = geometry::evaluate(x, y);
    classify(&distances, threshold_for_counter(counter))
}

/// Color of one pixel clock. Total and deterministic in its four inputs.
#[inline]
pub fn evaluate_pixel(x: Coordinate, y: Coordinate, counter: u8, active: bool) -> Color {
    composite(evaluate_region(x, y, counter), y, active)
}

/// The visible area of one rendered frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Sequential id assigned by the renderer that produced this frame.
    pub frame_id: u64,
    /// The counter value every pixel of this frame was evaluated with.
    pub counter: u8,
    pub width: u32,
    pub height: u32,
    /// Row-major colors, `width * height` long.
    pub pixels: Vec<Color>,
}

impl FrameBuffer {
    pub fn get(&self, x: Coordinate, y: Coordinate) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    pub fn to_rgba8(&self) -> Vec<u8> {
        image_helper::pack_rgba(&self.pixels)
    }

    /// Writes the frame as a PNG.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), image::error::ImageError> {
        image_helper::save(path, self.width, self.height, &self.to_rgba8())
    }
}

/// A clock-accurate software model of the engine: one `clock` call per pixel clock.
pub struct RasterPipeline {
    config: RasterConfig,
    scan: RasterScan,
    counter: FrameCounter,
    frames_rendered: u64,
}

impl RasterPipeline {
    pub fn new(config: RasterConfig) -> Result<Self, &'static str> {
        config.timing.validate()?;
        Ok(Self {
            scan: RasterScan::new(config.timing),
            counter: FrameCounter::new(),
            config,
            frames_rendered: 0,
        })
    }

    /// Advances one pixel clock. The pixel is colored with the counter value
    /// latched before this clock's vsync edge or reset takes effect.
    pub fn clock(&mut self, reset: bool) -> (ScanSignals, Color) {
        let signals = self.scan.tick();
        let color = evaluate_pixel(signals.x, signals.y, self.counter.value(), signals.active);
        self.counter.clock(signals.vsync_edge, reset);
        (signals, color)
    }

    /// Clocks out the rest of a partially scanned frame so the beam sits at the
    /// top-left of the visible area. Any vsync edge on the way is honored.
    fn finish_partial_frame(&mut self) {
        while !self.scan.at_origin() {
            self.clock(false);
        }
    }

    /// Runs one full scan from the top-left of the visible area and returns its
    /// visible pixels. A frame already in progress through `clock` is completed
    /// first and discarded. The counter advances exactly once during the
    /// returned scan, in vertical blanking.
    pub fn render_frame(&mut self) -> FrameBuffer {
        self.finish_partial_frame();

        let width = self.config.timing.h_active;
        let height = self.config.timing.v_active;
        let counter = self.counter.value();
        let mut pixels = vec![Color::BLACK; (width * height) as usize];

        for _ in 0..self.config.timing.clocks_per_frame() {
            let (signals, color) = self.clock(false);
            if signals.active {
                pixels[(signals.y * width + signals.x) as usize] = color;
            }
        }

        let frame_id = self.frames_rendered;
        self.frames_rendered += 1;
        debug!("Rendered frame {} with counter {}", frame_id, counter);

        FrameBuffer {
            frame_id,
            counter,
            width,
            height,
            pixels,
        }
    }

    /// Returns the counter and the beam to their power-on state.
    pub fn reset(&mut self) {
        self.counter.reset();
        self.scan.reset();
        self.frames_rendered = 0;
    }

    pub fn counter(&self) -> &FrameCounter {
        &self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::compositor::sky_blue;
    use crate::core_modules::geometry::CENTER_R2;
    use crate::core_modules::radius_modulator::threshold;
    use proptest::prelude::*;

    fn pipeline() -> RasterPipeline {
        RasterPipeline::new(RasterConfig::default()).expect("valid timing")
    }

    #[test]
    fn exact_center_is_yellow() {
        assert_eq!(evaluate_pixel(320, 240, 0, true), Color::new(3, 3, 0));
    }

    #[test]
    fn first_petal_center_is_pink() {
        assert_eq!(evaluate_region(368, 240, 0), Region::Petal);
        assert_eq!(evaluate_pixel(368, 240, 0, true), Color::new(3, 1, 2));
    }

    #[test]
    fn petal_pulse_reaches_further_late_in_the_cycle() {
        // 33 px beyond the +x petal center: 1089 lies between 784 and 2254.
        assert_eq!(evaluate_region(401, 240, 0), Region::Background);
        assert_eq!(evaluate_region(401, 240, 15), Region::Petal);
        assert_eq!(evaluate_region(401, 240, 16), Region::Background);
    }

    #[test]
    fn rejects_invalid_timing() {
        let config = RasterConfig {
            timing: RasterTiming { v_active: 0, ..RasterTiming::default() },
            ..RasterConfig::default()
        };
        assert!(RasterPipeline::new(config).is_err());
    }

    #[test]
    fn render_frame_advances_counter_once() {
        let mut pipeline = pipeline();
        let first = pipeline.render_frame();
        assert_eq!(first.counter, 0);
        assert_eq!(first.frame_id, 0);
        assert_eq!(pipeline.counter().value(), 1);

        let second = pipeline.render_frame();
        assert_eq!(second.counter, 1);
        assert_eq!(second.frame_id, 1);
        assert_eq!(pipeline.counter().value(), 2);
    }

    #[test]
    fn rendered_frame_matches_pure_evaluation() {
        let mut pipeline = pipeline();
        let frame = pipeline.render_frame();
        assert_eq!((frame.width, frame.height), (640, 480));
        assert_eq!(frame.pixels.len(), 640 * 480);
        for (x, y) in [(0, 0), (320, 240), (368, 240), (300, 200), (639, 479), (100, 400)] {
            assert_eq!(frame.get(x, y), Some(evaluate_pixel(x, y, 0, true)), "({x}, {y})");
        }
        assert_eq!(frame.get(640, 0), None);
    }

    #[test]
    fn blanking_clocks_are_black() {
        let mut pipeline = pipeline();
        for _ in 0..RasterTiming::default().clocks_per_frame() {
            let (signals, color) = pipeline.clock(false);
            if !signals.active {
                assert_eq!(color, Color::BLACK);
            }
        }
    }

    #[test]
    fn render_after_partial_scan_uses_one_counter_value() {
        let mut pipeline = pipeline();
        // Stop the beam 300 lines into a frame, before the vsync edge at line 490.
        for _ in 0..800 * 300 {
            pipeline.clock(false);
        }
        assert_eq!(pipeline.counter().value(), 0);

        let frame = pipeline.render_frame();
        // The interrupted frame's vsync edge lands before the new scan starts.
        assert_eq!(frame.counter, 1);
        assert_eq!(pipeline.counter().value(), 2);
        let mismatched = (0..frame.height)
            .flat_map(|y| (0..frame.width).map(move |x| (x, y)))
            .filter(|&(x, y)| frame.get(x, y) != Some(evaluate_pixel(x, y, frame.counter, true)))
            .count();
        assert_eq!(mismatched, 0);
    }

    #[test]
    fn held_reset_pins_counter_at_zero() {
        let mut pipeline = pipeline();
        pipeline.render_frame();
        assert_eq!(pipeline.counter().value(), 1);
        for _ in 0..RasterTiming::default().clocks_per_frame() {
            pipeline.clock(true);
        }
        assert_eq!(pipeline.counter().value(), 0);
    }

    #[test]
    fn reset_restarts_the_animation() {
        let mut pipeline = pipeline();
        let first = pipeline.render_frame();
        pipeline.render_frame();
        pipeline.reset();
        assert_eq!(pipeline.render_frame(), first);
    }

    #[test]
    fn saved_frame_round_trips_through_png() {
        let mut pipeline = pipeline();
        let frame = pipeline.render_frame();
        let path = std::env::temp_dir().join("petal_raster_pipeline_frame.png");
        frame.save(&path).expect("Error Saving File.");

        let decoded = image::open(&path).expect("Error Opening File.").to_rgba8();
        assert_eq!(decoded.dimensions(), (640, 480));
        assert_eq!(decoded.get_pixel(320, 240).0, [255, 255, 0, 255]);
        assert_eq!(decoded.get_pixel(368, 240).0, [255, 85, 170, 255]);
        let _ = std::fs::remove_file(&path);
    }

    proptest! {
        #[test]
        fn blanked_pixels_are_black(x in 0u32..800, y in 0u32..525, counter in any::<u8>()) {
            prop_assert_eq!(evaluate_pixel(x, y, counter, false), Color::BLACK);
        }

        #[test]
        fn center_disk_is_always_yellow(x in 300u32..340, y in 220u32..260, counter in any::<u8>()) {
            let dx = x as i32 - 320;
            let dy = y as i32 - 240;
            prop_assume!(((dx * dx + dy * dy) as u32) < CENTER_R2);
            prop_assert_eq!(evaluate_pixel(x, y, counter, true), Color::new(3, 3, 0));
        }

        #[test]
        fn background_is_sky_gradient(x in 0u32..640, y in 0u32..480, counter in any::<u8>()) {
            let distances = geometry::evaluate(x, y);
            let petal_r2 = threshold(counter & 0x0F);
            prop_assume!(distances.center >= CENTER_R2);
            prop_assume!(distances.petals.iter().all(|&d2| d2 >= petal_r2));
            let sky = sky_blue(y);
            prop_assert_eq!(evaluate_pixel(x, y, counter, true), Color::new(sky, 0, sky));
        }

        #[test]
        fn output_repeats_every_16_frames(x in 0u32..640, y in 0u32..480, counter in any::<u8>()) {
            prop_assert_eq!(
                evaluate_pixel(x, y, counter, true),
                evaluate_pixel(x, y, counter.wrapping_add(16), true)
            );
        }

        #[test]
        fn evaluation_is_deterministic(x in 0u32..800, y in 0u32..525, counter in any::<u8>(), active in any::<bool>()) {
            prop_assert_eq!(evaluate_pixel(x, y, counter, active), evaluate_pixel(x, y, counter, active));
        }
    }
}
