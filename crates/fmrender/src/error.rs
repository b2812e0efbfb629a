//! Error types for timeline construction, configuration and rendering.
use thiserror::Error;

/// Error returned when a timeline cannot be constructed or parsed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    /// A command's trigger time is negative, NaN or infinite.
    ///
    /// - `index` is the position of the offending command.
    /// - `time_secs` is the rejected value.
    #[error("invalid trigger time at command {index}: {time_secs}")]
    InvalidTime { index: usize, time_secs: f64 },

    /// A command triggers earlier than the command before it.
    #[error("command {index} at {time_secs}s precedes previous command at {previous_secs}s")]
    OutOfOrder {
        index: usize,
        time_secs: f64,
        previous_secs: f64,
    },

    /// A line of the text format could not be parsed.
    ///
    /// `line` is 1-based.
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },
}

/// Error returned when a render configuration is not usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("internal clock must be non-zero")]
    ZeroClock,

    #[error("clock step per frame must be non-zero")]
    ZeroClockStep,

    /// `sample_rate * clock_step` does not fit the clock range.
    #[error("internal clock overflows u32")]
    ClockOverflow,
}

/// Error returned by [`Renderer::try_render`](crate::Renderer::try_render).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The requested frame count was zero.
    #[error("frame count must be positive")]
    EmptyRequest,

    /// The output buffer for `frames` stereo frames could not be allocated.
    #[error("failed to allocate output buffer for {frames} frames")]
    Allocation { frames: usize },
}
