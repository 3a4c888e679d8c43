//! Decoded sensor readings.
//!
//! A payload record becomes one [`DataPoint`]: the code it was tagged with,
//! the raw data slice, the extended code level and the interpreted
//! [`Reading`].

use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;
use std::fmt;

use crate::constants::{EEG_BAND_COUNT, EEG_BAND_SIZE, NO_CONTACT_THRESHOLD};
use crate::registry::Opcode;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// ASIC_EEG_POWER band powers. Units are relative; only the ratios between
/// bands are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EegPowers {
    pub delta: u32,
    pub theta: u32,
    pub low_alpha: u32,
    pub high_alpha: u32,
    pub low_beta: u32,
    pub high_beta: u32,
    pub low_gamma: u32,
    pub mid_gamma: u32,
}

impl EegPowers {
    pub const BAND_NAMES: [&'static str; EEG_BAND_COUNT] = [
        "delta",
        "theta",
        "lowAlpha",
        "highAlpha",
        "lowBeta",
        "highBeta",
        "lowGamma",
        "midGamma",
    ];

    /// Decode eight 3-byte big-endian values. `data` must hold at least 24 bytes.
    pub(crate) fn from_be_bytes(data: &[u8]) -> Self {
        let band = |i: usize| BigEndian::read_u24(&data[i * EEG_BAND_SIZE..(i + 1) * EEG_BAND_SIZE]);
        Self {
            delta: band(0),
            theta: band(1),
            low_alpha: band(2),
            high_alpha: band(3),
            low_beta: band(4),
            high_beta: band(5),
            low_gamma: band(6),
            mid_gamma: band(7),
        }
    }

    /// Band values in protocol order
    pub fn values(&self) -> [u32; EEG_BAND_COUNT] {
        [
            self.delta,
            self.theta,
            self.low_alpha,
            self.high_alpha,
            self.low_beta,
            self.high_beta,
            self.low_gamma,
            self.mid_gamma,
        ]
    }

    /// `(name, value)` pairs in protocol order
    pub fn bands(&self) -> [(&'static str, u32); EEG_BAND_COUNT] {
        let values = self.values();
        std::array::from_fn(|i| (Self::BAND_NAMES[i], values[i]))
    }
}

/// The interpreted value of a data point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum Reading {
    BatteryLevel { value: u8 },
    /// POOR_SIGNAL quality, 0 is best. 200 means the sensor is off the skin.
    SignalQuality { value: u8, has_contact: bool },
    AttentionLevel { value: u8 },
    MeditationLevel { value: u8 },
    BlinkStrength { value: u8 },
    RawWave { value: i16 },
    EegPowers(EegPowers),
    /// Unregistered code, or data too short for the registered reading.
    Unknown { opcode: u8, value: i64 },
}

impl Reading {
    pub fn signal_quality(value: u8) -> Self {
        Reading::SignalQuality {
            value,
            has_contact: value < NO_CONTACT_THRESHOLD,
        }
    }

    /// The opcode this reading is decoded from
    pub fn kind(&self) -> Opcode {
        match self {
            Reading::BatteryLevel { .. } => Opcode::Battery,
            Reading::SignalQuality { .. } => Opcode::PoorSignal,
            Reading::AttentionLevel { .. } => Opcode::Attention,
            Reading::MeditationLevel { .. } => Opcode::Meditation,
            Reading::BlinkStrength { .. } => Opcode::Blink,
            Reading::RawWave { .. } => Opcode::RawWave,
            Reading::EegPowers(_) => Opcode::EegPowers,
            Reading::Unknown { opcode, .. } => Opcode::Unknown(*opcode),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Reading::Unknown { .. })
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::BatteryLevel { value } => write!(f, "Battery Level: {value}"),
            Reading::SignalQuality { value, has_contact } => {
                write!(f, "Poor Signal Level: {value}")?;
                if !has_contact {
                    write!(f, " - NO CONTACT TO SKIN")?;
                }
                Ok(())
            }
            Reading::AttentionLevel { value } => write!(f, "Attention Level: {value}"),
            Reading::MeditationLevel { value } => write!(f, "Meditation Level: {value}"),
            Reading::BlinkStrength { value } => write!(f, "Blink Level: {value}"),
            Reading::RawWave { value } => write!(f, "Raw Value: {value}"),
            Reading::EegPowers(powers) => {
                write!(f, "EEG Powers:")?;
                for (name, value) in powers.bands() {
                    write!(f, "\n    {name}: {value}")?;
                }
                Ok(())
            }
            Reading::Unknown { opcode, value } => write!(f, "Unknown OpCode {opcode:#04x}. Value: {value}"),
        }
    }
}

/// One decoded record of a payload
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DataPoint {
    /// Number of EXCODE bytes in front of the code. Unused by current devices.
    pub extended_code_level: u32,
    pub opcode: u8,
    /// The data bytes the reading was decoded from
    pub data: Bytes,
    pub reading: Reading,
}

impl DataPoint {
    pub fn kind(&self) -> Opcode {
        Opcode::from(self.opcode)
    }

    /// RAW_WAVE points arrive at 512 Hz; most consumers filter them out.
    pub fn is_raw_wave(&self) -> bool {
        matches!(self.reading, Reading::RawWave { .. })
    }

    /// Skin contact, for signal quality points only
    pub fn has_contact(&self) -> Option<bool> {
        match self.reading {
            Reading::SignalQuality { has_contact, .. } => Some(has_contact),
            _ => None,
        }
    }
}

impl fmt::Display for DataPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.reading.fmt(f)
    }
}

/// Interpret `data` as a signed big-endian integer. Empty data is 0; data
/// longer than eight bytes keeps its low 64 bits.
pub fn signed_be(data: &[u8]) -> i64 {
    match data.len() {
        0 => 0,
        len @ 1..=8 => BigEndian::read_int(data, len),
        len => BigEndian::read_i64(&data[len - 8..]),
    }
}
