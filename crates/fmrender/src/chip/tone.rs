//! YM2151-compatible tone generator.
//!
//! `ToneChip` understands the subset of the YM2151 (OPM) register map needed
//! to turn a register timeline into audible pitches. Each channel is a single
//! sine oscillator: operators, envelopes and LFO are not modelled.
//!
//! # Register Layout
//!
//! - 0x08: Key On (bits 2-0: channel, bits 6-3: operator mask)
//! - 0x20-0x27: RL / FB / CON (bit 6: left, bit 7: right, bits 2-0: algorithm)
//! - 0x28-0x2F: Key Code (KC) - bits 6-4: block, bits 3-0: note code
//! - 0x30-0x37: Key Fraction (KF) - bits 7-2: fine frequency
//! - 0x60-0x7F: Total Level (TL) per operator slot

use super::{BusPort, ChipCore};

/// YM2151 has 8 FM channels
const CHANNELS: usize = 8;

/// Internal cycles between two output samples (OPM sample cadence)
const OUTPUT_CYCLES: u32 = 64;

/// Clock the KC/KF pitch table is defined for
const NOMINAL_CLOCK_HZ: f64 = 3_579_545.0;

/// Peak amplitude of one channel; eight channels at full level fit in 16 bits
const CHANNEL_PEAK: f64 = 4095.0;

/// Operator slot offsets for M1, C1, M2, C2
const SLOT_M1: u8 = 0;
const SLOT_C1: u8 = 8;
const SLOT_M2: u8 = 16;
const SLOT_C2: u8 = 24;

const REG_KEY_ON: u8 = 0x08;
const REG_RL_FB_CON: u8 = 0x20;
const REG_KC: u8 = 0x28;
const REG_KF: u8 = 0x30;
const REG_TL: u8 = 0x60;

#[derive(Debug, Clone, Copy, Default)]
struct ToneChannel {
    key_on: bool,
    /// Oscillator phase in turns (0.0..1.0)
    phase: f64,
    /// Phase increment per output sample
    step: f64,
}

/// Sine-per-channel tone generator driven through the YM2151 register bus.
///
/// # Examples
///
/// ```
/// use fmrender::chip::{BusPort, ChipCore, ToneChip};
///
/// let mut chip = ToneChip::new();
/// chip.reset(3_579_545);
///
/// // Both outputs enabled, A4 on channel 0, key on
/// for (reg, val) in [(0x20, 0xC7), (0x28, 0x4A), (0x08, 0x78)] {
///     chip.write_bus(BusPort::Address, reg);
///     chip.write_bus(BusPort::Data, val);
/// }
/// let frame = (0..64).map(|_| chip.tick()).last();
/// assert!(frame.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ToneChip {
    registers: [u8; 256],
    selected: u8,
    channels: [ToneChannel; CHANNELS],
    clock_hz: u32,
    cycle: u32,
    output: (i32, i32),
}

impl ToneChip {
    /// Create a silent chip. Call [`ChipCore::reset`] before use.
    pub fn new() -> Self {
        Self {
            registers: [0; 256],
            selected: 0,
            channels: [ToneChannel::default(); CHANNELS],
            clock_hz: NOMINAL_CLOCK_HZ as u32,
            cycle: 0,
            output: (0, 0),
        }
    }

    /// Read back a register value.
    pub fn register(&self, register: u8) -> u8 {
        self.registers[register as usize]
    }

    /// Whether a channel is currently keyed on.
    ///
    /// Returns false for channel indices outside 0-7.
    pub fn is_key_on(&self, channel: u8) -> bool {
        self.channels
            .get(channel as usize)
            .is_some_and(|ch| ch.key_on)
    }

    /// Frequency in Hz a channel currently plays at.
    pub fn frequency(&self, channel: u8) -> Option<f64> {
        let ch = channel as usize;
        if ch >= CHANNELS {
            return None;
        }
        let kc = self.registers[(REG_KC + channel) as usize];
        let kf = self.registers[(REG_KF + channel) as usize];
        Some(kc_kf_to_freq(kc, kf, self.clock_hz))
    }

    fn store(&mut self, register: u8, value: u8) {
        self.registers[register as usize] = value;

        match register {
            REG_KEY_ON => {
                let ch = (value & 0x07) as usize;
                let key_on = (value >> 3) & 0x0F != 0;
                let channel = &mut self.channels[ch];
                if key_on && !channel.key_on {
                    channel.phase = 0.0;
                }
                channel.key_on = key_on;
            }
            0x28..=0x37 => self.update_step((register & 0x07) as usize),
            _ => {}
        }
    }

    fn update_step(&mut self, ch: usize) {
        let freq = self.frequency(ch as u8).unwrap_or(0.0);
        self.channels[ch].step = freq * OUTPUT_CYCLES as f64 / self.clock_hz as f64;
    }

    /// Linear amplitude of a channel from the loudest output operator.
    fn amplitude(&self, channel: u8) -> f64 {
        let con = self.registers[(REG_RL_FB_CON + channel) as usize] & 0x07;
        let slots: &[u8] = match con {
            0..=3 => &[SLOT_C2],
            4 => &[SLOT_C1, SLOT_C2],
            5 | 6 => &[SLOT_C1, SLOT_M2, SLOT_C2],
            _ => &[SLOT_M1, SLOT_C1, SLOT_M2, SLOT_C2],
        };
        let tl = slots
            .iter()
            .map(|slot| self.registers[(REG_TL + channel + slot) as usize] & 0x7F)
            .min()
            .unwrap_or(0x7F);
        // 0.75 dB per TL step
        10f64.powf(-0.75 * tl as f64 / 20.0)
    }

    fn mix(&mut self) -> (i32, i32) {
        let mut left = 0i32;
        let mut right = 0i32;
        for ch in 0..CHANNELS {
            if !self.channels[ch].key_on {
                continue;
            }
            let rl = self.registers[REG_RL_FB_CON as usize + ch];
            let amp = self.amplitude(ch as u8);
            let channel = &mut self.channels[ch];
            let value =
                ((channel.phase * std::f64::consts::TAU).sin() * amp * CHANNEL_PEAK) as i32;
            channel.phase = (channel.phase + channel.step).fract();
            if rl & 0x40 != 0 {
                left += value;
            }
            if rl & 0x80 != 0 {
                right += value;
            }
        }
        (left, right)
    }
}

impl Default for ToneChip {
    fn default() -> Self {
        Self::new()
    }
}

impl ChipCore for ToneChip {
    fn reset(&mut self, clock_hz: u32) {
        *self = Self::new();
        self.clock_hz = clock_hz.max(1);
        for ch in 0..CHANNELS {
            self.update_step(ch);
        }
    }

    fn write_bus(&mut self, port: BusPort, value: u8) {
        match port {
            BusPort::Address => self.selected = value,
            BusPort::Data => self.store(self.selected, value),
        }
    }

    fn tick(&mut self) -> (i32, i32) {
        self.cycle += 1;
        if self.cycle >= OUTPUT_CYCLES {
            self.cycle = 0;
            self.output = self.mix();
        }
        self.output
    }
}

/// Convert a KC/KF register pair into a frequency in Hertz.
///
/// The low nibble of KC is the OPM note code: 0, 1, 2, 4, 5, 6, 8, 9, 10,
/// 12, 13, 14 map to C#..C, so every fourth code is skipped. `KC = 0x4A`
/// (block 4, note code 10) is A4. KF adds 64 steps per semitone. The result
/// scales linearly with `clock_hz` relative to 3,579,545 Hz.
fn kc_kf_to_freq(kc: u8, kf: u8, clock_hz: u32) -> f64 {
    let block = ((kc >> 4) & 0x07) as f64;
    let code = (kc & 0x0F) as i32;
    let semitone = (code - code / 4) as f64;
    let fraction = ((kf >> 2) & 0x3F) as f64 / 64.0;
    let midi = block * 12.0 + semitone + 13.0 + fraction;
    let base = 440.0 * 2f64.powf((midi - 69.0) / 12.0);
    base * clock_hz as f64 / NOMINAL_CLOCK_HZ
}
