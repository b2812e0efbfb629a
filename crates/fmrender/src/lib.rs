//! fmrender — sample-accurate renderer for timed FM sound-chip register writes
//!
//! `fmrender` turns a list of timestamped register writes into an
//! interleaved stereo `f32` buffer by driving a register-level chip core the
//! way a real host CPU would: one two-phase bus write at a time, respecting
//! the chip's bus busy interval, while the chip is clocked at a fixed number
//! of internal cycles per output frame.
//!
//! Key features:
//! - `Timeline` / `TimelineBuilder`: validated, time-ordered register
//!   commands, also parseable from a simple text format.
//! - `Sequencer`: per-frame state machine issuing at most one bus operation
//!   per frame (address, then data) gated on trigger time and bus busy state.
//! - `SampleClock`: clocks the chip `clock_step` cycles per frame and keeps
//!   the last cycle's output.
//! - `Renderer`: owns chip, configuration and output buffer; exposes
//!   `render`, `sample` and `release`.
//! - `chip::ChipCore`: the seam for plugging in a synthesis engine, with
//!   `chip::ToneChip` as a YM2151-register-compatible preview core.
//!
//! Example
//!
//! ```rust
//! use fmrender::{RenderConfig, Renderer, TimelineBuilder};
//! use fmrender::chip::ToneChip;
//!
//! let mut builder = TimelineBuilder::new();
//! builder.add_writes(0.0, [(0x20, 0xC7), (0x08, 0x78)]);
//! let timeline = builder.finalize().expect("ordered timeline");
//!
//! // 128 busy cycles at 64 cycles per frame: two frames per bus operation
//! let config = RenderConfig::default().with_busy_cycles(128);
//! let mut renderer = Renderer::new(ToneChip::new(), config);
//! renderer.set_trace(true);
//!
//! assert_eq!(renderer.render(&timeline, 8), 8);
//! let frames: Vec<usize> = renderer.trace().iter().map(|e| e.frame).collect();
//! assert_eq!(frames, vec![0, 2, 4, 6]);
//! ```
pub mod chip;
mod error;
pub mod render;

pub use chip::{BusPort, ChipCore};
pub use error::{ConfigError, RenderError, TimelineError};
pub use render::{
    BusEvent, BusOperation, BusTiming, Command, Phase, RenderConfig, Renderer, SampleClock,
    Sequencer, Timeline, TimelineBuilder,
};
