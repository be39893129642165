// THEORY:
// The raster timing generator stands in for the video hardware that would
// normally feed the engine. It walks the full scan, visible area and blanking
// alike, one pixel clock at a time, and reports where the beam is, whether that
// spot is visible, and when the sync pulses fire.
//
// Each line runs active → front porch → sync → back porch, and each frame runs
// the same sequence vertically, so the active area starts at (0, 0). The vsync
// edge is reported on the first clock of the vertical sync pulse, which falls in
// the vertical blanking interval after every visible pixel of the frame has been
// emitted. That placement is what lets a counter advanced on the edge stay
// constant across a whole visible frame.

use crate::core_modules::geometry::{Coordinate, MAX_SCAN_EXTENT};

/// Horizontal and vertical timing of a raster mode, in pixel clocks and lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterTiming {
    pub h_active: u32,
    pub h_front_porch: u32,
    pub h_sync: u32,
    pub h_back_porch: u32,

    pub v_active: u32,
    pub v_front_porch: u32,
    pub v_sync: u32,
    pub v_back_porch: u32,
}

/// Industry-standard 640x480 at 60 Hz: 800 clocks by 525 lines.
pub const VGA_640X480: RasterTiming = RasterTiming {
    h_active: 640,
    h_front_porch: 16,
    h_sync: 96,
    h_back_porch: 48,
    v_active: 480,
    v_front_porch: 10,
    v_sync: 2,
    v_back_porch: 33,
};

impl Default for RasterTiming {
    fn default() -> Self {
        VGA_640X480
    }
}

impl RasterTiming {
    pub fn h_total(&self) -> u32 {
        self.h_active + self.h_front_porch + self.h_sync + self.h_back_porch
    }

    pub fn v_total(&self) -> u32 {
        self.v_active + self.v_front_porch + self.v_sync + self.v_back_porch
    }

    pub fn clocks_per_frame(&self) -> u64 {
        self.h_total() as u64 * self.v_total() as u64
    }

    fn h_sync_start(&self) -> u32 {
        self.h_active + self.h_front_porch
    }

    fn v_sync_start(&self) -> u32 {
        self.v_active + self.v_front_porch
    }

    /// Rejects modes the engine cannot draw: an empty visible area, or a scan
    /// wide enough to overflow the distance arithmetic.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.h_active == 0 || self.v_active == 0 {
            return Err("Raster timing has no active area");
        }
        if self.v_sync == 0 {
            return Err("Raster timing has no vertical sync pulse");
        }
        if self.h_total() >= MAX_SCAN_EXTENT || self.v_total() >= MAX_SCAN_EXTENT {
            return Err("Raster timing exceeds the supported scan extent");
        }
        Ok(())
    }
}

/// Everything the timing generator reports for one pixel clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSignals {
    pub x: Coordinate,
    pub y: Coordinate,
    /// The beam is inside the visible area.
    pub active: bool,
    /// Horizontal sync pulse asserted.
    pub hsync: bool,
    /// Vertical sync pulse asserted.
    pub vsync: bool,
    /// First clock of the vertical sync pulse. True once per frame.
    pub vsync_edge: bool,
}

/// A free-running beam position counter for a `RasterTiming`.
#[derive(Debug, Clone)]
pub struct RasterScan {
    timing: RasterTiming,
    x: Coordinate,
    y: Coordinate,
}

impl RasterScan {
    pub fn new(timing: RasterTiming) -> Self {
        Self { timing, x: 0, y: 0 }
    }

    /// Whether the next clock is the top-left pixel of the visible area.
    pub fn at_origin(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Returns the beam to the top-left of the visible area.
    pub fn reset(&mut self) {
        self.x = 0;
        self.y = 0;
    }

    /// Signals for the current beam position, without moving the beam.
    pub fn signals(&self) -> ScanSignals {
        let t = &self.timing;
        let h_sync_start = t.h_sync_start();
        let v_sync_start = t.v_sync_start();
        let hsync = self.x >= h_sync_start && self.x < h_sync_start + t.h_sync;
        let vsync = self.y >= v_sync_start && self.y < v_sync_start + t.v_sync;

        ScanSignals {
            x: self.x,
            y: self.y,
            active: self.x < t.h_active && self.y < t.v_active,
            hsync,
            vsync,
            vsync_edge: self.y == v_sync_start && self.x == 0,
        }
    }

    /// Advance by one pixel clock, returning the signals for the position the
    /// beam was at before moving.
    pub fn tick(&mut self) -> ScanSignals {
        let signals = self.signals();

        self.x += 1;
        if self.x == self.timing.h_total() {
            self.x = 0;
            self.y += 1;
            if self.y == self.timing.v_total() {
                self.y = 0;
            }
        }

        signals
    }
}

impl Iterator for RasterScan {
    type Item = ScanSignals;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.tick())
    }
}
