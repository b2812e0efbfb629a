use std::path::Path;

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};
use fmrender::chip::ToneChip;
use fmrender::{BusPort, RenderConfig, Renderer, Timeline};
use log::info;

/// Seconds rendered after the last command when no length is given
const DEFAULT_TAIL_SECS: f64 = 1.0;

/// Requested render length.
#[derive(Debug, Clone, Copy)]
pub enum Length {
    Frames(usize),
    Seconds(f64),
    /// Timeline duration plus a short tail
    Auto,
}

impl Length {
    pub fn frames(self, timeline: &Timeline, config: &RenderConfig) -> Result<usize> {
        let secs = match self {
            Length::Frames(0) => bail!("frame count must be positive"),
            Length::Frames(n) => return Ok(n),
            Length::Seconds(s) if !(s.is_finite() && s > 0.0) => {
                bail!("duration must be a positive number of seconds, got {}", s)
            }
            Length::Seconds(s) => s,
            Length::Auto => timeline.duration_secs() + DEFAULT_TAIL_SECS,
        };
        Ok((secs * config.sample_rate()).ceil() as usize)
    }
}

/// Render a timeline through the tone chip and write a float stereo WAV.
pub fn render_wav(
    timeline: &Timeline,
    config: RenderConfig,
    length: Length,
    output: &Path,
) -> Result<()> {
    let frames = length.frames(timeline, &config)?;
    let mut renderer = Renderer::new(ToneChip::new(), config);
    renderer
        .try_render(timeline, frames)
        .with_context(|| format!("failed to render {} frames", frames))?;

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: config.sample_rate().round() as u32,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(output, spec)
        .with_context(|| format!("failed to create WAV file: {}", output.display()))?;
    for &sample in renderer.samples() {
        writer.write_sample(sample)?;
    }
    writer
        .finalize()
        .with_context(|| format!("failed to finalize WAV file: {}", output.display()))?;

    info!(
        "wrote {} frames ({:.3}s) to {}",
        frames,
        frames as f64 / config.sample_rate(),
        output.display()
    );
    Ok(())
}

/// Render a timeline and print every issued bus operation.
pub fn print_trace(timeline: &Timeline, config: RenderConfig, length: Length) -> Result<()> {
    let frames = length.frames(timeline, &config)?;
    let mut renderer = Renderer::new(ToneChip::new(), config);
    renderer.set_trace(true);
    renderer
        .try_render(timeline, frames)
        .with_context(|| format!("failed to render {} frames", frames))?;

    let rate = config.sample_rate();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Frame"),
        Cell::new("Time (s)"),
        Cell::new("Command"),
        Cell::new("Due (s)"),
        Cell::new("Port"),
        Cell::new("Value"),
    ]);
    for event in renderer.trace() {
        let due = timeline
            .get(event.command_index)
            .map_or(0.0, |cmd| cmd.time_secs());
        let port = match event.port() {
            BusPort::Address => "address",
            BusPort::Data => "data",
        };
        table.add_row(vec![
            Cell::new(event.frame),
            Cell::new(format!("{:.6}", event.frame as f64 / rate)),
            Cell::new(event.command_index),
            Cell::new(format!("{:.6}", due)),
            Cell::new(port),
            Cell::new(format!("0x{:02X}", event.value())),
        ]);
    }
    println!("{table}");

    let issued = renderer.trace().len();
    let expected = timeline.len() * 2;
    if issued < expected {
        println!(
            "{} of {} bus operations issued within {} frames",
            issued, expected, frames
        );
    }
    Ok(())
}

/// Print a summary of a timeline and the render clocking.
pub fn print_info(path: &Path, timeline: &Timeline, config: RenderConfig) {
    let timing = config.bus_timing();
    println!("=== Timeline: {} ===", path.display());
    println!("Commands: {}", timeline.len());
    println!("Duration: {:.6}s", timeline.duration_secs());
    println!("Internal Clock: {} Hz", config.clock_hz());
    println!("Clock Step: {} cycles/frame", config.clock_step());
    println!("Sample Rate: {:.3} Hz", config.sample_rate());
    println!(
        "Bus Busy: {} cycles ({} frames per access)",
        timing.busy_cycles,
        timing.samples_per_access()
    );
    // Each command needs two accesses; a dense timeline is bus-bound
    let min_secs = timeline.len() as f64 * 2.0 * timing.samples_per_access().max(1.0)
        / config.sample_rate();
    println!("Minimum Bus Time: {:.6}s", min_secs);
}
