//! Stream decoder: frame buffer + pending data point queue.
//!
//! Corrupt frames are dropped here and only show up in the logs and in
//! [`DecoderStats`].

use bytes::Bytes;
use std::collections::VecDeque;
use tracing::{debug, trace};

use crate::config::DecoderConfig;
use crate::data_point::DataPoint;
use crate::frame::{Extracted, FrameBuffer, Malformed, StreamState};
use crate::payload::parse_payload;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Counters for everything the decoder has seen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecoderStats {
    pub bytes_received: u64,
    /// Bytes dropped while looking for a SYNC marker
    pub noise_bytes: u64,
    /// Frames with a valid checksum
    pub frames: u64,
    pub checksum_errors: u64,
    pub zero_length_frames: u64,
    pub oversized_frames: u64,
    pub truncated_payloads: u64,
    pub data_points: u64,
    pub unknown_data_points: u64,
}

#[derive(Debug, Default)]
pub struct Decoder {
    buffer: FrameBuffer,
    config: DecoderConfig,
    pending: VecDeque<DataPoint>,
    stats: DecoderStats,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Bytes received but not yet resolved into a frame
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn state(&self) -> StreamState {
        self.buffer.state()
    }

    /// Data points decoded but not yet handed out
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Append received bytes and decode every complete frame.
    /// Returns the number of data points queued.
    pub fn push(&mut self, data: &[u8]) -> usize {
        self.stats.bytes_received += data.len() as u64;
        self.buffer.append(data);
        self.decode_frames()
    }

    /// Decode every complete frame currently buffered.
    pub fn decode_frames(&mut self) -> usize {
        let mut queued = 0;
        while let Some(payload) = self.next_payload() {
            let parsed = parse_payload(&payload, &self.config);
            if parsed.is_truncated() {
                self.stats.truncated_payloads += 1;
                if self.config.drop_truncated_payloads {
                    debug!(len = payload.len(), "dropping truncated payload");
                    continue;
                }
            }
            for point in parsed.points {
                self.stats.data_points += 1;
                if point.reading.is_unknown() {
                    self.stats.unknown_data_points += 1;
                }
                self.pending.push_back(point);
                queued += 1;
            }
        }
        queued
    }

    /// Take the next checksum-valid payload off the buffer, if one is complete.
    pub fn next_payload(&mut self) -> Option<Bytes> {
        loop {
            self.stats.noise_bytes += self.buffer.synchronize() as u64;
            match self.buffer.extract(self.config.max_payload_len) {
                Extracted::Frame(frame) if frame.is_valid() => {
                    self.stats.frames += 1;
                    return Some(frame.payload);
                }
                Extracted::Frame(frame) => {
                    self.stats.checksum_errors += 1;
                    debug!(
                        calculated = frame.expected_checksum(),
                        received = frame.checksum,
                        len = frame.payload.len(),
                        "checksum mismatch, frame dropped"
                    );
                }
                Extracted::Malformed(Malformed::ZeroLength) => self.stats.zero_length_frames += 1,
                Extracted::Malformed(Malformed::Oversized { .. }) => self.stats.oversized_frames += 1,
                Extracted::Incomplete => {
                    trace!(buffered = self.buffer.len(), "waiting for more data");
                    return None;
                }
            }
        }
    }

    /// Next decoded data point
    pub fn pop(&mut self) -> Option<DataPoint> {
        self.pending.pop_front()
    }

    /// Every decoded data point, in stream order
    pub fn drain(&mut self) -> Vec<DataPoint> {
        self.pending.drain(..).collect()
    }

    /// Forget buffered bytes and queued points. Statistics are kept.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_point::Reading;

    #[test]
    fn bad_checksum_is_skipped() {
        let mut decoder = Decoder::new();
        decoder.push(b"\xaa\xaa\x01\x23\x00\xaa\xaa\x01\x34\xcb");
        assert_eq!(decoder.stats().checksum_errors, 1);
        assert_eq!(decoder.stats().frames, 1);
        let point = decoder.pop().unwrap();
        assert_eq!(point.reading, Reading::Unknown { opcode: 0x34, value: 0 });
        assert!(decoder.pop().is_none());
    }

    #[test]
    fn partial_frame_stays_buffered() {
        let mut decoder = Decoder::new();
        assert_eq!(decoder.push(b"\xaa\xaa\x10\x02"), 0);
        assert_eq!(decoder.buffered(), 4);
        assert_eq!(decoder.push(b"\x00"), 0);
        assert_eq!(decoder.buffered(), 5);
        assert_eq!(decoder.state(), StreamState::AwaitingPayload { declared: 0x10, missing: 14 });
    }

    #[test]
    fn truncated_payloads_can_be_dropped() {
        // payload 04 10 80: attention, then a code missing its length byte
        let stream = b"\xaa\xaa\x03\x04\x10\x80\x6b";
        let mut keep = Decoder::new();
        assert_eq!(keep.push(stream), 1);
        assert_eq!(keep.stats().truncated_payloads, 1);

        let mut drop = Decoder::with_config(DecoderConfig::default().with_drop_truncated_payloads(true));
        assert_eq!(drop.push(stream), 0);
        assert_eq!(drop.stats().truncated_payloads, 1);
    }
}
