//! Payload decoder.
//!
//! A checksum-valid payload is a run of records:
//! `[EXCODE]* CODE [VLENGTH] DATA`. Records are decoded left to right until
//! the payload is exhausted.

use bytes::Bytes;
use tracing::{debug, trace};

use crate::config::{DecoderConfig, FallbackPolicy};
use crate::constants::EXCODE;
use crate::data_point::{DataPoint, Reading, signed_be};
use crate::error::{Result, TgError};
use crate::registry;

/// Records decoded from one payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPayload {
    pub points: Vec<DataPoint>,
    /// Offset of the record that ran past the end of the payload, if any.
    /// A record whose data was cut short is still emitted as an unknown point.
    pub truncated_at: Option<usize>,
}

impl ParsedPayload {
    pub fn is_truncated(&self) -> bool {
        self.truncated_at.is_some()
    }
}

/// Decode every record of `payload`. Never panics on malformed input.
pub fn parse_payload(payload: &Bytes, config: &DecoderConfig) -> ParsedPayload {
    let mut parser = PayloadParser::new(payload, config);
    let mut parsed = ParsedPayload::default();
    while !parser.is_exhausted() {
        let start = parser.index;
        match parser.pop_data_point() {
            Record::Complete(point) => parsed.points.push(point),
            Record::Clipped(point) => {
                parsed.points.push(point);
                parsed.truncated_at = Some(start);
            }
            Record::Missing => {
                parsed.truncated_at = Some(start);
                break;
            }
        }
    }
    if let Some(offset) = parsed.truncated_at {
        debug!(offset, len = payload.len(), "payload ends inside a record");
    }
    parsed
}

/// Like [`parse_payload`], but a payload that ends inside a record is an error.
pub fn parse_payload_strict(payload: &Bytes, config: &DecoderConfig) -> Result<Vec<DataPoint>> {
    let parsed = parse_payload(payload, config);
    match parsed.truncated_at {
        Some(offset) => Err(TgError::TruncatedPayload {
            offset,
            len: payload.len(),
        }),
        None => Ok(parsed.points),
    }
}

enum Record {
    Complete(DataPoint),
    /// Data shorter than its declared length
    Clipped(DataPoint),
    /// Payload ended before a code or length byte
    Missing,
}

struct PayloadParser<'a> {
    payload: &'a Bytes,
    config: &'a DecoderConfig,
    index: usize,
}

impl<'a> PayloadParser<'a> {
    fn new(payload: &'a Bytes, config: &'a DecoderConfig) -> Self {
        Self {
            payload,
            config,
            index: 0,
        }
    }

    fn is_exhausted(&self) -> bool {
        self.index >= self.payload.len()
    }

    fn pop_byte(&mut self) -> Option<u8> {
        let byte = self.payload.get(self.index).copied()?;
        self.index += 1;
        Some(byte)
    }

    fn pop_data_point(&mut self) -> Record {
        let mut extended_code_level = 0u32;
        let opcode = loop {
            match self.pop_byte() {
                Some(EXCODE) => extended_code_level += 1,
                Some(code) => break code,
                None => return Record::Missing,
            }
        };

        let size = if self.config.length_rule.has_length_prefix(opcode) {
            match self.pop_byte() {
                Some(len) => len as usize,
                None => return Record::Missing,
            }
        } else {
            1
        };

        let end = (self.index + size).min(self.payload.len());
        let clipped = end - self.index < size;
        let data = self.payload.slice(self.index..end);
        self.index = end;

        let reading = registry::lookup(opcode)
            .and_then(|entry| entry.build(&data))
            .unwrap_or_else(|| fallback(opcode, &data, self.config.fallback));
        trace!(opcode, extended_code_level, size = data.len(), %reading, "data point");

        let point = DataPoint {
            extended_code_level,
            opcode,
            data,
            reading,
        };
        if clipped {
            Record::Clipped(point)
        } else {
            Record::Complete(point)
        }
    }
}

fn fallback(opcode: u8, data: &[u8], policy: FallbackPolicy) -> Reading {
    let value = match policy {
        FallbackPolicy::RawInteger => signed_be(data),
        FallbackPolicy::FirstByte => data.first().copied().map_or(0, i64::from),
    };
    Reading::Unknown { opcode, value }
}
