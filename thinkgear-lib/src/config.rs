use std::time::Duration;

use crate::constants::{DEFAULT_READ_CHUNK_SIZE, MULTI_BYTE_CODE_START, SINGLE_BYTE_VENDOR_CODES};
use crate::registry::Opcode;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default timeout for a single async receive
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// How the data length of a payload record is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LengthRule {
    /// Only RAW_WAVE (0x80) and ASIC_EEG_POWER (0x83) carry a length byte.
    #[default]
    KnownMultiByte,
    /// Every code >= 0x80 carries a length byte, except the single byte
    /// vendor codes 0xBA and 0xBC (older protocol revision).
    CodeRange,
}

impl LengthRule {
    /// Whether `code` is followed by an explicit length byte
    pub fn has_length_prefix(&self, code: u8) -> bool {
        match self {
            LengthRule::KnownMultiByte => matches!(Opcode::from(code), Opcode::RawWave | Opcode::EegPowers),
            LengthRule::CodeRange => code >= MULTI_BYTE_CODE_START && !SINGLE_BYTE_VENDOR_CODES.contains(&code),
        }
    }
}

/// Value used for records with an unregistered code or undersized data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FallbackPolicy {
    /// The whole data slice as a signed big-endian integer.
    #[default]
    RawInteger,
    /// The first data byte.
    FirstByte,
}

/// Decoder tuning. The defaults follow the current protocol revision.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecoderConfig {
    /// Soft cap on the declared payload length; `None` trusts the length byte.
    pub max_payload_len: Option<u8>,
    pub length_rule: LengthRule,
    pub fallback: FallbackPolicy,
    /// Discard every record of a payload that ends in the middle of a record.
    pub drop_truncated_payloads: bool,
    pub read_chunk_size: usize,
    pub read_timeout: Duration,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_payload_len: None,
            length_rule: LengthRule::default(),
            fallback: FallbackPolicy::default(),
            drop_truncated_payloads: false,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_payload_len(mut self, max: Option<u8>) -> Self {
        self.max_payload_len = max;
        self
    }

    pub fn with_length_rule(mut self, rule: LengthRule) -> Self {
        self.length_rule = rule;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_drop_truncated_payloads(mut self, drop: bool) -> Self {
        self.drop_truncated_payloads = drop;
        self
    }

    /// A chunk size of zero is bumped to one byte.
    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size.max(1);
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_multi_byte_rule_only_prefixes_raw_and_eeg() {
        let rule = LengthRule::KnownMultiByte;
        assert!(rule.has_length_prefix(0x80));
        assert!(rule.has_length_prefix(0x83));
        assert!(!rule.has_length_prefix(0x02));
        assert!(!rule.has_length_prefix(0x86));
        assert!(!rule.has_length_prefix(0xF0));
    }

    #[test]
    fn code_range_rule_skips_vendor_codes() {
        let rule = LengthRule::CodeRange;
        assert!(rule.has_length_prefix(0x80));
        assert!(rule.has_length_prefix(0x86));
        assert!(rule.has_length_prefix(0xF0));
        assert!(!rule.has_length_prefix(0x7F));
        assert!(!rule.has_length_prefix(0xBA));
        assert!(!rule.has_length_prefix(0xBC));
    }

    #[test]
    fn chunk_size_never_zero() {
        assert_eq!(DecoderConfig::new().with_read_chunk_size(0).read_chunk_size, 1);
    }
}
