// THEORY:
// This file is the main entry point for the `petal_raster` library crate. It
// exports the per-pixel engine and the two frame renderers built on top of it.
//
// The engine answers one question per pixel clock: given a beam position, the
// current frame counter and whether the beam is inside the visible area, what
// 2-bit RGB triple goes out? The answer paints a six-petaled flower whose petals
// pulse on a 16-frame cycle, centered on a 640x480 screen over a banded sky.
//
// Layering, leaves first:
// - `core_modules` holds the stages themselves (frame counter, geometry, radius
//   modulator, shape classifier, compositor) plus a software raster timing
//   generator and the PNG signal packer that stand in for video hardware.
// - `pipeline` composes the stages into `evaluate_pixel` and a clock-accurate
//   sequential `RasterPipeline`.
// - `parallel_pipeline` renders frames over a tokio worker pool while an
//   independent frame clock task advances the counter.

pub mod core_modules;
pub mod pipeline;
pub mod parallel_pipeline;
