//! The clock-tick contract shared by every harness.

/// Owns one scenario's device under test plus every peripheral model that is
/// simulated alongside it.
///
/// A [`tick`](Testbench::tick) is the atomic unit of simulated time: all
/// cross-model propagation and memory reactions happen first, then every
/// model's clock advances exactly once, then outputs are sampled. Drivers
/// only ever move time forward through `tick`.
pub trait Testbench {
    type Device;

    fn device(&self) -> &Self::Device;
    fn device_mut(&mut self) -> &mut Self::Device;

    /// Drives the reset input of every model in the bench.
    fn set_reset(&mut self, asserted: bool);

    fn tick(&mut self);

    /// Ticks elapsed since the bench was built.
    fn cycles(&self) -> u64;

    fn wait_clocks(&mut self, clocks: u32) {
        for _ in 0..clocks {
            self.tick();
        }
    }

    /// Holds reset for `clocks` ticks, then releases it.
    fn reset(&mut self, clocks: u32) {
        self.set_reset(true);
        self.wait_clocks(clocks);
        self.set_reset(false);
    }

    /// Ticks until `done` holds, giving up after `max_clocks`.
    ///
    /// Returns the number of ticks spent, or `None` on give-up. Drivers never
    /// use this; it exists so scenarios can bound their own waits.
    fn run_until<F>(&mut self, max_clocks: u64, mut done: F) -> Option<u64>
    where
        Self: Sized,
        F: FnMut(&Self) -> bool,
    {
        let start = self.cycles();
        while !done(self) {
            if self.cycles() - start >= max_clocks {
                return None;
            }
            self.tick();
        }
        Some(self.cycles() - start)
    }
}
