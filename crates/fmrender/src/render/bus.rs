//! Register bus timing model.
//!
//! After either half of a register write the chip needs `busy_cycles`
//! internal cycles before it accepts the next bus operation. The sequencer
//! runs once per output frame, so the interval is expressed in output frames:
//! `busy_cycles / clock_step`. The value is real-valued and never rounded;
//! the sequencer accumulates it as a fractional threshold.
//!
//! This conflates bus busy time with the per-frame clocking. Busy cycles are
//! assumed to elapse inside the fixed clocking of the frames that follow
//! rather than being ticked separately.

use crate::chip::BusPort;

/// Busy interval of the chip's register bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusTiming {
    /// Internal cycles the bus stays busy after an operation
    pub busy_cycles: u32,
    /// Internal cycles clocked per output frame
    pub clock_step: u32,
}

impl BusTiming {
    pub fn new(busy_cycles: u32, clock_step: u32) -> Self {
        Self {
            busy_cycles,
            clock_step,
        }
    }

    /// Busy interval in output frames.
    ///
    /// Returns 0.0 when `clock_step` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use fmrender::BusTiming;
    ///
    /// assert_eq!(BusTiming::new(128, 64).samples_per_access(), 2.0);
    /// assert_eq!(BusTiming::new(96, 64).samples_per_access(), 1.5);
    /// ```
    pub fn samples_per_access(&self) -> f64 {
        if self.clock_step == 0 {
            return 0.0;
        }
        self.busy_cycles as f64 / self.clock_step as f64
    }
}

/// One half of a two-phase register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusOperation {
    pub port: BusPort,
    pub value: u8,
}

/// A bus operation issued during rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusEvent {
    /// Output frame the operation was issued on
    pub frame: usize,
    /// Index of the timeline command the operation belongs to
    pub command_index: usize,
    pub operation: BusOperation,
}

impl BusEvent {
    pub fn port(&self) -> BusPort {
        self.operation.port
    }

    pub fn value(&self) -> u8 {
        self.operation.value
    }
}
