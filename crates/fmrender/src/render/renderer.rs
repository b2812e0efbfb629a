//! Render orchestration.
//!
//! [`Renderer`] owns the chip, the render configuration and the output
//! buffer. Every render call resets the chip, builds a fresh [`Sequencer`],
//! and overwrites the buffer with `2 * frame_count` interleaved stereo
//! samples. Renders with identical arguments produce identical buffers.

use log::{debug, warn};

use super::bus::BusEvent;
use super::clock::SampleClock;
use super::config::RenderConfig;
use super::sequencer::Sequencer;
use super::timeline::Timeline;
use crate::chip::ChipCore;
use crate::error::RenderError;

/// Scale from chip output to `-1.0..1.0` floats.
const SAMPLE_SCALE: f32 = 1.0 / 32768.0;

/// Renders register timelines through a chip into stereo float frames.
///
/// # Examples
///
/// ```
/// use fmrender::{RenderConfig, Renderer, TimelineBuilder};
/// use fmrender::chip::ToneChip;
///
/// let mut builder = TimelineBuilder::new();
/// builder.add_writes(0.0, [(0x20, 0xC7), (0x28, 0x4A), (0x08, 0x78)]);
/// let timeline = builder.finalize().unwrap();
///
/// let mut renderer = Renderer::new(ToneChip::new(), RenderConfig::default());
/// assert_eq!(renderer.render(&timeline, 4096), 4096);
/// assert_eq!(renderer.sample(8192), 0.0); // out of range reads are safe
///
/// renderer.release();
/// assert_eq!(renderer.frames(), 0);
/// ```
#[derive(Debug)]
pub struct Renderer<C> {
    chip: C,
    config: RenderConfig,
    buffer: Option<Vec<f32>>,
    trace_enabled: bool,
    trace: Vec<BusEvent>,
}

impl<C: ChipCore> Renderer<C> {
    pub fn new(chip: C, config: RenderConfig) -> Self {
        Self {
            chip,
            config,
            buffer: None,
            trace_enabled: false,
            trace: Vec::new(),
        }
    }

    /// Render `frame_count` frames, returning the frame count or 0 on failure.
    ///
    /// On failure the cause is logged; use [`Renderer::try_render`] to
    /// inspect it.
    pub fn render(&mut self, timeline: &Timeline, frame_count: usize) -> usize {
        match self.try_render(timeline, frame_count) {
            Ok(frames) => frames,
            Err(e) => {
                warn!("render rejected: {}", e);
                0
            }
        }
    }

    /// Render `frame_count` frames.
    ///
    /// # Errors
    ///
    /// - `RenderError::EmptyRequest` when `frame_count` is zero. The previous
    ///   buffer is left untouched.
    /// - `RenderError::Allocation` when the buffer cannot be allocated. The
    ///   previous buffer has already been released.
    pub fn try_render(
        &mut self,
        timeline: &Timeline,
        frame_count: usize,
    ) -> Result<usize, RenderError> {
        if frame_count == 0 {
            return Err(RenderError::EmptyRequest);
        }

        // The previous buffer is stale from here on
        self.buffer = None;
        self.trace.clear();
        let mut buffer = allocate(frame_count)?;

        let sample_rate = self.config.sample_rate();
        let timing = self.config.bus_timing();
        debug!(
            "render {} frames, {} commands, {:.3} Hz, {} samples per access",
            frame_count,
            timeline.len(),
            sample_rate,
            timing.samples_per_access()
        );

        self.chip.reset(self.config.clock_hz());
        let mut sequencer = Sequencer::new(timeline.len(), timing.samples_per_access());
        let clock = SampleClock::new(self.config.clock_step());

        for (frame, out) in buffer.chunks_exact_mut(2).enumerate() {
            if let Some(event) = sequencer.step(frame, timeline, sample_rate, &mut self.chip)
                && self.trace_enabled
            {
                self.trace.push(event);
            }
            let (left, right) = clock.step(&mut self.chip);
            out[0] = left as f32 * SAMPLE_SCALE;
            out[1] = right as f32 * SAMPLE_SCALE;
        }

        if !sequencer.is_exhausted() {
            debug!(
                "render ended with {} of {} commands issued",
                sequencer.current_index(),
                timeline.len()
            );
        }

        self.buffer = Some(buffer);
        Ok(frame_count)
    }

    /// Read one interleaved sample from the last render.
    ///
    /// Returns 0.0 when `index` is out of range or no buffer exists.
    pub fn sample(&self, index: usize) -> f32 {
        self.buffer
            .as_ref()
            .and_then(|buffer| buffer.get(index))
            .copied()
            .unwrap_or(0.0)
    }

    /// Interleaved samples of the last render, empty if none.
    pub fn samples(&self) -> &[f32] {
        self.buffer.as_deref().unwrap_or(&[])
    }

    /// Number of stereo frames available for reading.
    pub fn frames(&self) -> usize {
        self.samples().len() / 2
    }

    /// Free the output buffer and the recorded trace.
    pub fn release(&mut self) {
        self.buffer = None;
        self.trace.clear();
    }

    /// Record issued bus operations during subsequent renders.
    pub fn set_trace(&mut self, enabled: bool) {
        self.trace_enabled = enabled;
        if !enabled {
            self.trace.clear();
        }
    }

    /// Bus operations issued during the last traced render.
    pub fn trace(&self) -> &[BusEvent] {
        &self.trace
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Replace the configuration used by subsequent renders.
    pub fn set_config(&mut self, config: RenderConfig) {
        self.config = config;
    }

    pub fn chip(&self) -> &C {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut C {
        &mut self.chip
    }

    pub fn into_chip(self) -> C {
        self.chip
    }
}

fn allocate(frame_count: usize) -> Result<Vec<f32>, RenderError> {
    let err = RenderError::Allocation {
        frames: frame_count,
    };
    let len = frame_count.checked_mul(2).ok_or(err)?;
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|_| err)?;
    buffer.resize(len, 0.0);
    Ok(buffer)
}
