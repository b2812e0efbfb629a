use super::bus::BusTiming;
use crate::error::ConfigError;

/// YM2151 master clock (NTSC colorburst)
pub const DEFAULT_CLOCK_HZ: u32 = 3_579_545;

/// YM2151 produces one sample every 64 master clock cycles
pub const DEFAULT_CLOCK_STEP: u32 = 64;

/// Cycles the YM2151 bus stays busy after a write
pub const DEFAULT_BUSY_CYCLES: u32 = 64;

/// Clocking parameters of a render.
///
/// The output sample rate is `clock_hz / clock_step`.
///
/// # Examples
///
/// ```
/// use fmrender::RenderConfig;
///
/// let config = RenderConfig::for_sample_rate(44_100, 64).unwrap();
/// assert_eq!(config.clock_hz(), 2_822_400);
/// assert_eq!(config.sample_rate(), 44_100.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    clock_hz: u32,
    clock_step: u32,
    busy_cycles: u32,
}

impl RenderConfig {
    /// # Errors
    ///
    /// `ConfigError` when `clock_step` or `clock_hz` is zero.
    pub fn new(clock_hz: u32, clock_step: u32, busy_cycles: u32) -> Result<Self, ConfigError> {
        if clock_step == 0 {
            return Err(ConfigError::ZeroClockStep);
        }
        if clock_hz == 0 {
            return Err(ConfigError::ZeroClock);
        }
        Ok(Self {
            clock_hz,
            clock_step,
            busy_cycles,
        })
    }

    /// Derive the internal clock from a target output rate.
    ///
    /// Busy cycles default to one frame's worth of cycles.
    pub fn for_sample_rate(sample_rate: u32, clock_step: u32) -> Result<Self, ConfigError> {
        let clock_hz = sample_rate
            .checked_mul(clock_step)
            .ok_or(ConfigError::ClockOverflow)?;
        Self::new(clock_hz, clock_step, clock_step)
    }

    /// Replace the bus busy interval.
    pub fn with_busy_cycles(mut self, busy_cycles: u32) -> Self {
        self.busy_cycles = busy_cycles;
        self
    }

    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    pub fn clock_step(&self) -> u32 {
        self.clock_step
    }

    pub fn busy_cycles(&self) -> u32 {
        self.busy_cycles
    }

    /// Output frames per second.
    pub fn sample_rate(&self) -> f64 {
        self.clock_hz as f64 / self.clock_step as f64
    }

    pub fn bus_timing(&self) -> BusTiming {
        BusTiming::new(self.busy_cycles, self.clock_step)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK_HZ,
            clock_step: DEFAULT_CLOCK_STEP,
            busy_cycles: DEFAULT_BUSY_CYCLES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_ym2151() {
        let config = RenderConfig::default();
        assert!((config.sample_rate() - 55_930.390625).abs() < 1e-6);
        assert_eq!(config.bus_timing().samples_per_access(), 1.0);
    }

    #[test]
    fn test_rejects_zero() {
        assert_eq!(RenderConfig::new(0, 64, 64), Err(ConfigError::ZeroClock));
        assert_eq!(
            RenderConfig::new(3_579_545, 0, 64),
            Err(ConfigError::ZeroClockStep)
        );
        assert_eq!(
            RenderConfig::for_sample_rate(44_100, 0),
            Err(ConfigError::ZeroClockStep)
        );
    }

    #[test]
    fn test_busy_cycles_override() {
        let config = RenderConfig::default().with_busy_cycles(128);
        assert_eq!(config.bus_timing().samples_per_access(), 2.0);
    }
}
