//! Register command timeline.
//!
//! A [`Timeline`] is an immutable, time-ordered list of register writes.
//! Ordering and trigger times are validated when the timeline is built so
//! the sequencer can trust them.
//!
//! # Text format
//!
//! One command per line: `<seconds> <address> <data>`. Numbers are decimal
//! or `0x`-prefixed hex. `#` starts a comment; blank lines are ignored.
//!
//! ```text
//! # A4 on channel 0
//! 0.0   0x20 0xC7
//! 0.0   0x28 0x4A
//! 0.0   0x08 0x78
//! 1.0   0x08 0x00
//! ```

use std::str::FromStr;

use crate::error::TimelineError;

/// A timestamped register write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    time_secs: f64,
    address: u8,
    data: u8,
}

impl Command {
    pub fn new(time_secs: f64, address: u8, data: u8) -> Self {
        Self {
            time_secs,
            address,
            data,
        }
    }

    /// Trigger time in seconds from the start of the render.
    pub fn time_secs(&self) -> f64 {
        self.time_secs
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn data(&self) -> u8 {
        self.data
    }

    /// Output frame at which the command becomes due.
    ///
    /// Real-valued; a command fires once `frame >= trigger_frame`.
    pub fn trigger_frame(&self, sample_rate: f64) -> f64 {
        self.time_secs * sample_rate
    }
}

/// Ordered, validated sequence of register commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    commands: Vec<Command>,
}

impl Timeline {
    /// Build a timeline from commands already in time order.
    ///
    /// # Errors
    ///
    /// - `TimelineError::InvalidTime` for a negative or non-finite time
    /// - `TimelineError::OutOfOrder` when a time decreases
    pub fn new(commands: Vec<Command>) -> Result<Self, TimelineError> {
        validate_times(&commands)?;
        for (index, pair) in commands.windows(2).enumerate() {
            if pair[1].time_secs < pair[0].time_secs {
                return Err(TimelineError::OutOfOrder {
                    index: index + 1,
                    time_secs: pair[1].time_secs,
                    previous_secs: pair[0].time_secs,
                });
            }
        }
        Ok(Self { commands })
    }

    /// Build a timeline from commands in any order.
    ///
    /// Commands are stable-sorted by trigger time, so writes sharing a time
    /// keep their relative order.
    ///
    /// # Errors
    ///
    /// `TimelineError::InvalidTime` for a negative or non-finite time.
    pub fn sorted(mut commands: Vec<Command>) -> Result<Self, TimelineError> {
        validate_times(&commands)?;
        commands.sort_by(|a, b| a.time_secs.total_cmp(&b.time_secs));
        Ok(Self { commands })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// Trigger frame of the command at `index`, `None` past the end.
    pub fn trigger_frame(&self, index: usize, sample_rate: f64) -> Option<f64> {
        self.get(index).map(|cmd| cmd.trigger_frame(sample_rate))
    }

    /// Trigger time of the last command, 0.0 for an empty timeline.
    pub fn duration_secs(&self) -> f64 {
        self.commands.last().map_or(0.0, |cmd| cmd.time_secs)
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

impl TryFrom<Vec<Command>> for Timeline {
    type Error = TimelineError;

    fn try_from(commands: Vec<Command>) -> Result<Self, Self::Error> {
        Timeline::new(commands)
    }
}

impl FromStr for Timeline {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut builder = TimelineBuilder::new();
        for (i, raw) in s.lines().enumerate() {
            let line = i + 1;
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            let fields: Vec<&str> = content.split_whitespace().collect();
            if fields.len() != 3 {
                return Err(TimelineError::Syntax {
                    line,
                    message: format!("expected 3 fields, found {}", fields.len()),
                });
            }
            let time_secs: f64 = fields[0].parse().map_err(|_| TimelineError::Syntax {
                line,
                message: format!("invalid time '{}'", fields[0]),
            })?;
            let address = parse_byte(fields[1], line)?;
            let data = parse_byte(fields[2], line)?;
            builder.add_write(time_secs, address, data);
        }
        builder.finalize()
    }
}

/// Incremental timeline construction.
///
/// # Examples
///
/// ```
/// use fmrender::TimelineBuilder;
///
/// let mut builder = TimelineBuilder::new();
/// builder.add_write(0.0, 0x20, 0xC7);
/// builder.add_writes(0.5, [(0x28, 0x4A), (0x08, 0x78)]);
/// let timeline = builder.finalize().expect("ordered");
/// assert_eq!(timeline.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TimelineBuilder {
    commands: Vec<Command>,
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single register write.
    pub fn add_write(&mut self, time_secs: f64, address: u8, data: u8) -> &mut Self {
        self.commands.push(Command::new(time_secs, address, data));
        self
    }

    /// Append several `(address, data)` writes sharing one trigger time.
    pub fn add_writes<I>(&mut self, time_secs: f64, writes: I) -> &mut Self
    where
        I: IntoIterator<Item = (u8, u8)>,
    {
        for (address, data) in writes {
            self.add_write(time_secs, address, data);
        }
        self
    }

    /// Validate and return the timeline.
    pub fn finalize(self) -> Result<Timeline, TimelineError> {
        Timeline::new(self.commands)
    }
}

fn validate_times(commands: &[Command]) -> Result<(), TimelineError> {
    match commands
        .iter()
        .position(|cmd| !cmd.time_secs.is_finite() || cmd.time_secs < 0.0)
    {
        Some(index) => Err(TimelineError::InvalidTime {
            index,
            time_secs: commands[index].time_secs,
        }),
        None => Ok(()),
    }
}

fn parse_byte(field: &str, line: usize) -> Result<u8, TimelineError> {
    let parsed = match field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => field.parse::<u8>(),
    };
    parsed.map_err(|_| TimelineError::Syntax {
        line,
        message: format!("invalid byte '{}'", field),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_negative_time() {
        let err = Timeline::new(vec![Command::new(0.0, 0, 0), Command::new(-1.0, 0, 0)])
            .unwrap_err();
        assert_eq!(
            err,
            TimelineError::InvalidTime {
                index: 1,
                time_secs: -1.0
            }
        );
    }

    #[test]
    fn test_new_rejects_nan() {
        let err = Timeline::new(vec![Command::new(f64::NAN, 0, 0)]).unwrap_err();
        assert!(matches!(err, TimelineError::InvalidTime { index: 0, .. }));
    }

    #[test]
    fn test_new_rejects_decreasing_time() {
        let err = Timeline::new(vec![
            Command::new(0.5, 0x20, 0xC7),
            Command::new(0.25, 0x08, 0x78),
        ])
        .unwrap_err();
        assert!(matches!(err, TimelineError::OutOfOrder { index: 1, .. }));
    }

    #[test]
    fn test_equal_times_are_ordered() {
        let timeline = Timeline::new(vec![
            Command::new(0.0, 0x20, 0xC7),
            Command::new(0.0, 0x08, 0x78),
        ])
        .unwrap();
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn test_sorted_is_stable() {
        let timeline = Timeline::sorted(vec![
            Command::new(1.0, 0x08, 0x00),
            Command::new(0.0, 0x28, 0x4A),
            Command::new(0.0, 0x08, 0x78),
        ])
        .unwrap();
        let addresses: Vec<u8> = timeline.iter().map(|c| c.address()).collect();
        assert_eq!(addresses, vec![0x28, 0x08, 0x08]);
        assert_eq!(timeline.get(1).unwrap().data(), 0x78);
    }

    #[test]
    fn test_trigger_frame() {
        let timeline = Timeline::new(vec![Command::new(0.5, 0, 0)]).unwrap();
        assert_eq!(timeline.trigger_frame(0, 44_100.0), Some(22_050.0));
        assert_eq!(timeline.trigger_frame(1, 44_100.0), None);
    }

    #[test]
    fn test_parse_text() {
        let text = "
            # header comment
            0     0x20 0xC7
            0.0   0x28 74   # decimal data

            1.5   0X08 0x78
        ";
        let timeline: Timeline = text.parse().unwrap();
        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline.get(1).unwrap().data(), 74);
        assert_eq!(timeline.get(2).unwrap().address(), 0x08);
        assert_eq!(timeline.duration_secs(), 1.5);
    }

    #[test]
    fn test_parse_reports_line() {
        let err = "0 0x20 0xC7\n0 0x28\n".parse::<Timeline>().unwrap_err();
        assert!(matches!(err, TimelineError::Syntax { line: 2, .. }));

        let err = "0 0x20 0x1FF".parse::<Timeline>().unwrap_err();
        assert!(matches!(err, TimelineError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_empty_timeline() {
        let timeline: Timeline = "# nothing\n".parse().unwrap();
        assert!(timeline.is_empty());
        assert_eq!(timeline.duration_secs(), 0.0);
    }
}
