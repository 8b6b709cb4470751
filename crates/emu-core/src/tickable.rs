//! Clock sink trait.

/// A component that can be advanced by clock ticks.
///
/// One tick is one CPU clock pulse. Machines implement this on their bus to
/// fan the pulse out to video, audio and DMA logic at their own ratios.
pub trait Tickable {
    /// Advance by one CPU cycle.
    fn tick(&mut self);

    /// Advance by multiple cycles.
    ///
    /// Default implementation calls `tick()` in a loop. Components may
    /// override for efficiency, but must produce identical results.
    fn tick_n(&mut self, count: u32) {
        for _ in 0..count {
            self.tick();
        }
    }
}
