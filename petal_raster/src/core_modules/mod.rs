pub mod color;
pub mod compositor;
pub mod frame_counter;
pub mod geometry;
pub mod radius_modulator;
pub mod raster_timing;
pub mod shape_classifier;
pub mod utils;
