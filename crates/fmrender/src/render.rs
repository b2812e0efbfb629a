//! Timeline rendering.
//!
//! Rendering couples two time bases: command trigger times expressed in
//! seconds, and the chip's internal clock divided down to the output sample
//! rate. Once per output frame the [`Sequencer`] may issue a single bus
//! operation, then the [`SampleClock`] advances the chip by a fixed number of
//! internal cycles and captures one stereo frame.
//!
//! ```
//! use fmrender::{RenderConfig, Renderer, Timeline};
//! use fmrender::chip::ToneChip;
//!
//! let timeline: Timeline = "
//!     0.0 0x20 0xC7   # RL on, algorithm 7
//!     0.0 0x28 0x4A   # A4
//!     0.0 0x08 0x78   # key on channel 0
//! "
//! .parse()
//! .expect("valid timeline");
//!
//! let mut renderer = Renderer::new(ToneChip::new(), RenderConfig::default());
//! let frames = renderer.render(&timeline, 1024);
//! assert_eq!(frames, 1024);
//! assert_eq!(renderer.samples().len(), 2048);
//! ```
pub mod bus;
pub mod clock;
pub mod config;
pub mod renderer;
pub mod sequencer;
pub mod timeline;

pub use bus::{BusEvent, BusOperation, BusTiming};
pub use clock::SampleClock;
pub use config::RenderConfig;
pub use renderer::Renderer;
pub use sequencer::{Phase, Sequencer};
pub use timeline::{Command, Timeline, TimelineBuilder};
