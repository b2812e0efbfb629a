//! Chip core interface consumed by the renderer.
//!
//! The renderer never synthesizes audio itself. It drives an implementation
//! of [`ChipCore`] through the chip's two-phase register bus and clocks it at
//! a fixed number of internal cycles per output frame.
//!
//! The `tone` submodule provides [`ToneChip`], a small register-compatible
//! tone generator that is good enough to preview a timeline.
pub mod tone;

pub use tone::ToneChip;

/// Bus port selected by a register bus operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusPort {
    /// Selects the register that the next data write targets.
    Address,
    /// Latches a value into the previously addressed register.
    Data,
}

/// Interface of a register-driven sound chip.
///
/// Implementations own all synthesis state. The renderer guarantees the
/// following call discipline:
///
/// - `reset` is called before any other method, once per render.
/// - `write_bus` is always called in `Address` then `Data` pairs.
/// - `tick` is called a fixed number of times per output frame.
pub trait ChipCore {
    /// Reinitialize all synthesis state for the given internal clock.
    ///
    /// # Arguments
    ///
    /// * `clock_hz` - Internal clock frequency in Hz
    fn reset(&mut self, clock_hz: u32);

    /// Perform one half of a register write.
    ///
    /// # Arguments
    ///
    /// * `port` - `Address` to select a register, `Data` to store into it
    /// * `value` - Register number or register value
    fn write_bus(&mut self, port: BusPort, value: u8);

    /// Advance the chip by one internal clock cycle.
    ///
    /// # Returns
    ///
    /// The current `(left, right)` output accumulator
    fn tick(&mut self) -> (i32, i32);
}

impl<C: ChipCore + ?Sized> ChipCore for Box<C> {
    fn reset(&mut self, clock_hz: u32) {
        (**self).reset(clock_hz);
    }

    fn write_bus(&mut self, port: BusPort, value: u8) {
        (**self).write_bus(port, value);
    }

    fn tick(&mut self) -> (i32, i32) {
        (**self).tick()
    }
}
