//! Fixed-rate sample clock.
//!
//! Each output frame advances the chip by exactly `clock_step` internal
//! cycles. Only the last cycle's output is kept as the frame's sample pair.
//! Intermediate outputs are dropped without averaging or filtering, which
//! is a simplification of real hardware resampling and part of the
//! renderer's observable output.

use crate::chip::ChipCore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleClock {
    clock_step: u32,
}

impl SampleClock {
    pub fn new(clock_step: u32) -> Self {
        Self { clock_step }
    }

    /// Internal cycles clocked per output frame.
    pub fn clock_step(&self) -> u32 {
        self.clock_step
    }

    /// Clock one output frame and return its `(left, right)` pair.
    pub fn step<C>(&self, chip: &mut C) -> (i32, i32)
    where
        C: ChipCore + ?Sized,
    {
        let mut output = (0, 0);
        for _ in 0..self.clock_step {
            output = chip.tick();
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::BusPort;

    /// Chip whose output is its tick count.
    #[derive(Default)]
    struct Counter {
        ticks: i32,
    }

    impl ChipCore for Counter {
        fn reset(&mut self, _clock_hz: u32) {
            self.ticks = 0;
        }

        fn write_bus(&mut self, _port: BusPort, _value: u8) {}

        fn tick(&mut self) -> (i32, i32) {
            self.ticks += 1;
            (self.ticks, -self.ticks)
        }
    }

    #[test]
    fn test_keeps_last_tick_only() {
        let clock = SampleClock::new(64);
        let mut chip = Counter::default();
        assert_eq!(clock.step(&mut chip), (64, -64));
        assert_eq!(clock.step(&mut chip), (128, -128));
        assert_eq!(chip.ticks, 128);
    }

    #[test]
    fn test_single_cycle_step() {
        let clock = SampleClock::new(1);
        let mut chip = Counter::default();
        assert_eq!(clock.step(&mut chip), (1, -1));
    }
}
