//! Static opcode table.
//!
//! Maps each known code to the size its data must have and the function that
//! builds the [`Reading`]. The table is immutable and consulted by value.

use byteorder::{BigEndian, ByteOrder};
use num_enum::{FromPrimitive, IntoPrimitive};
use strum_macros::Display;

use crate::constants::{EEG_POWERS_SIZE, RAW_WAVE_SIZE};
use crate::data_point::{EegPowers, Reading};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum Opcode {
    // single byte codes (< 0x80)
    #[strum(to_string = "BATTERY")]
    Battery = 0x01,
    #[strum(to_string = "POOR_SIGNAL")]
    PoorSignal = 0x02,
    #[strum(to_string = "ATTENTION")]
    Attention = 0x04,
    #[strum(to_string = "MEDITATION")]
    Meditation = 0x05,
    #[strum(to_string = "BLINK")]
    Blink = 0x16,

    // multi byte codes
    #[strum(to_string = "RAW_WAVE")]
    RawWave = 0x80,
    #[strum(to_string = "ASIC_EEG_POWER")]
    EegPowers = 0x83,

    #[num_enum(catch_all)]
    #[strum(to_string = "UNKNOWN")]
    Unknown(u8),
}

/// One registered code
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    pub opcode: Opcode,
    /// Minimum data length the reading needs
    pub required_size: usize,
    build: fn(&[u8]) -> Reading,
}

impl Entry {
    /// Build the reading, or `None` when `data` is shorter than required.
    pub fn build(&self, data: &[u8]) -> Option<Reading> {
        (data.len() >= self.required_size).then(|| (self.build)(data))
    }
}

fn battery(data: &[u8]) -> Reading {
    Reading::BatteryLevel { value: data[0] }
}

fn poor_signal(data: &[u8]) -> Reading {
    Reading::signal_quality(data[0])
}

fn attention(data: &[u8]) -> Reading {
    Reading::AttentionLevel { value: data[0] }
}

fn meditation(data: &[u8]) -> Reading {
    Reading::MeditationLevel { value: data[0] }
}

fn blink(data: &[u8]) -> Reading {
    Reading::BlinkStrength { value: data[0] }
}

fn raw_wave(data: &[u8]) -> Reading {
    Reading::RawWave {
        value: BigEndian::read_i16(data),
    }
}

fn eeg_powers(data: &[u8]) -> Reading {
    Reading::EegPowers(EegPowers::from_be_bytes(data))
}

static REGISTRY: [Entry; 7] = [
    Entry {
        opcode: Opcode::Battery,
        required_size: 1,
        build: battery,
    },
    Entry {
        opcode: Opcode::PoorSignal,
        required_size: 1,
        build: poor_signal,
    },
    Entry {
        opcode: Opcode::Attention,
        required_size: 1,
        build: attention,
    },
    Entry {
        opcode: Opcode::Meditation,
        required_size: 1,
        build: meditation,
    },
    Entry {
        opcode: Opcode::Blink,
        required_size: 1,
        build: blink,
    },
    Entry {
        opcode: Opcode::RawWave,
        required_size: RAW_WAVE_SIZE,
        build: raw_wave,
    },
    Entry {
        opcode: Opcode::EegPowers,
        required_size: EEG_POWERS_SIZE,
        build: eeg_powers,
    },
];

/// Registered entry for `code`, if any
pub fn lookup(code: u8) -> Option<&'static Entry> {
    let opcode = Opcode::from(code);
    REGISTRY.iter().find(|entry| entry.opcode == opcode)
}

/// All registered entries
pub fn entries() -> &'static [Entry] {
    &REGISTRY
}
