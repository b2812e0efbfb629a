//! Per-frame command sequencer.
//!
//! The sequencer walks the timeline strictly in order and issues each
//! command as two bus operations: the register address, then the data.
//! Each operation is gated on two conditions:
//!
//! - the command's trigger frame has been reached
//! - the bus busy interval from the previous operation has elapsed
//!
//! [`Sequencer::step`] is called once per output frame and issues at most one
//! bus operation, so two operations never reach the chip within one frame
//! regardless of how dense the timeline is.

use log::trace;

use super::bus::{BusEvent, BusOperation};
use super::timeline::Timeline;
use crate::chip::{BusPort, ChipCore};

/// Progress of the command at the head of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The next operation writes the command's register address.
    AddressPending,
    /// The address has been written; the next operation writes the data.
    DataPending,
    /// Every command has been issued.
    Exhausted,
}

/// Sequencer state for one render.
#[derive(Debug, Clone)]
pub struct Sequencer {
    current_index: usize,
    phase: Phase,
    next_available_frame: f64,
    samples_per_access: f64,
}

impl Sequencer {
    /// Create a sequencer positioned at the first command.
    ///
    /// # Arguments
    ///
    /// * `command_count` - Number of commands in the timeline
    /// * `samples_per_access` - Bus busy interval in output frames
    pub fn new(command_count: usize, samples_per_access: f64) -> Self {
        Self {
            current_index: 0,
            phase: if command_count == 0 {
                Phase::Exhausted
            } else {
                Phase::AddressPending
            },
            next_available_frame: 0.0,
            samples_per_access,
        }
    }

    /// Index of the next command to process.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Earliest frame at which the bus accepts the next operation.
    pub fn next_available_frame(&self) -> f64 {
        self.next_available_frame
    }

    pub fn is_exhausted(&self) -> bool {
        self.phase == Phase::Exhausted
    }

    /// Run one frame of the sequencer.
    ///
    /// # Arguments
    ///
    /// * `frame` - Current output frame index
    /// * `timeline` - Timeline the sequencer was created for
    /// * `sample_rate` - Output sample rate used to convert trigger times
    /// * `chip` - Chip receiving the bus operation
    ///
    /// # Returns
    ///
    /// Some(BusEvent) if an operation was issued on this frame, None otherwise
    pub fn step<C>(
        &mut self,
        frame: usize,
        timeline: &Timeline,
        sample_rate: f64,
        chip: &mut C,
    ) -> Option<BusEvent>
    where
        C: ChipCore + ?Sized,
    {
        if self.phase == Phase::Exhausted {
            return None;
        }
        let Some(cmd) = timeline.get(self.current_index) else {
            self.phase = Phase::Exhausted;
            return None;
        };

        let now = frame as f64;
        if now < cmd.trigger_frame(sample_rate) || now < self.next_available_frame {
            return None;
        }

        let command_index = self.current_index;
        let operation = match self.phase {
            Phase::AddressPending => {
                self.phase = Phase::DataPending;
                self.advance_busy(now);
                BusOperation {
                    port: BusPort::Address,
                    value: cmd.address(),
                }
            }
            Phase::DataPending => {
                self.current_index += 1;
                if self.current_index >= timeline.len() {
                    self.phase = Phase::Exhausted;
                } else {
                    self.phase = Phase::AddressPending;
                    self.advance_busy(now);
                }
                BusOperation {
                    port: BusPort::Data,
                    value: cmd.data(),
                }
            }
            Phase::Exhausted => return None,
        };

        chip.write_bus(operation.port, operation.value);
        trace!(
            "frame {} cmd {} {:?} 0x{:02X}",
            frame, command_index, operation.port, operation.value
        );

        Some(BusEvent {
            frame,
            command_index,
            operation,
        })
    }

    fn advance_busy(&mut self, now: f64) {
        // Never move the threshold backwards
        self.next_available_frame = self.next_available_frame.max(now + self.samples_per_access);
    }
}
