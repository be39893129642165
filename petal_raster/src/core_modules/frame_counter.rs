// THEORY:
// The `FrameCounter` is the only piece of state in the whole engine that
// survives from one pixel to the next. Everything downstream of it is a pure
// function re-evaluated per pixel clock; the counter alone remembers how many
// frames have gone by, and that memory is what makes the flower breathe.
//
// It is deliberately an explicit value rather than a global. Whoever drives frame
// boundaries owns it and hands a snapshot of it to pixel evaluation, which keeps
// that evaluation independently testable.
//
// Only the low nibble (`scale`) feeds the radius modulator. The upper four bits
// still count and still wrap with the rest of the byte; they simply never reach
// the picture.

/// Mask selecting the bits of the counter that drive the petal pulse.
pub const SCALE_MASK: u8 = 0x0F;

/// An 8-bit frame counter advanced once per vertical sync edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameCounter {
    value: u8,
}

impl FrameCounter {
    /// A counter in its reset state.
    pub const fn new() -> Self {
        Self { value: 0 }
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }

    /// Moves to the next frame, wrapping from 255 back to 0.
    pub fn advance(&mut self) {
        self.value = self.value.wrapping_add(1);
    }

    /// Per-clock edge handler. While `reset` is held the counter stays at zero,
    /// even if a vsync edge arrives on the same clock.
    pub fn clock(&mut self, vsync_edge: bool, reset: bool) {
        if reset {
            self.reset();
        } else if vsync_edge {
            self.advance();
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// The low nibble consumed by the radius modulator.
    pub fn scale(&self) -> u8 {
        self.value & SCALE_MASK
    }
}
