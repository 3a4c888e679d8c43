//! Frame buffer, synchronizer and extractor.
//!
//! Wire format: `SYNC SYNC PLENGTH PAYLOAD[PLENGTH] CHKSUM` where
//! `CHKSUM = !(sum(PAYLOAD) & 0xFF)`.
//!
//! Bytes leave the buffer only once they are classified: noise in front of a
//! marker, a discarded marker of a malformed frame, or a whole frame.

use bytes::{Buf, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::constants::{FRAME_HEADER_SIZE, FRAME_OVERHEAD, SYNC, SYNC_MARKER};
use crate::error::{Result, TgError};

/// One's complement of the 8-bit payload sum
pub fn checksum(payload: &[u8]) -> u8 {
    !payload.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte))
}

/// A frame removed from the buffer. The checksum is not verified yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub payload: Bytes,
    pub checksum: u8,
}

impl Frame {
    pub fn expected_checksum(&self) -> u8 {
        checksum(&self.payload)
    }

    pub fn is_valid(&self) -> bool {
        self.expected_checksum() == self.checksum
    }

    /// The payload, if the checksum matches
    pub fn verify(self) -> Result<Bytes> {
        if self.is_valid() {
            Ok(self.payload)
        } else {
            Err(TgError::InvalidFrame(format!(
                "checksum mismatch: calculated={:#04x}, received={:#04x}",
                self.expected_checksum(),
                self.checksum
            )))
        }
    }
}

/// Why the marker at the head of the buffer was discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    ZeroLength,
    /// Declared length above the configured soft cap
    Oversized { declared: u8, max: u8 },
}

/// Result of one extraction attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Frame(Frame),
    /// Not enough bytes buffered; nothing was consumed.
    Incomplete,
    /// A bad header was dropped; synchronize and try again.
    Malformed(Malformed),
}

/// Where the buffered bytes stand in the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    AwaitingSync,
    AwaitingLength,
    AwaitingPayload { declared: u8, missing: usize },
    AwaitingChecksum,
    /// A whole frame is buffered and can be extracted.
    FrameReady,
}

/// Byte accumulator owned by one decoder
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buffer: BytesMut,
    /// Prefix length already searched without finding a marker
    scanned: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.scanned = 0;
    }

    /// True when the buffer starts with the SYNC marker
    pub fn is_synchronized(&self) -> bool {
        self.buffer.starts_with(&SYNC_MARKER)
    }

    /// State of the frame at the head of the buffer
    pub fn state(&self) -> StreamState {
        if !self.is_synchronized() {
            return StreamState::AwaitingSync;
        }
        let Some(&declared) = self.buffer.get(2) else {
            return StreamState::AwaitingLength;
        };
        let payload_end = FRAME_HEADER_SIZE + declared as usize;
        match self.buffer.len() {
            len if len < payload_end => StreamState::AwaitingPayload {
                declared,
                missing: payload_end - len,
            },
            len if len == payload_end => StreamState::AwaitingChecksum,
            _ => StreamState::FrameReady,
        }
    }

    fn consume(&mut self, count: usize) {
        self.buffer.advance(count);
        self.scanned = self.scanned.saturating_sub(count);
    }

    /// Drop everything in front of the first SYNC marker and return the number
    /// of bytes dropped. Without a marker the buffer is left untouched, since a
    /// trailing SYNC may be completed by the next append.
    pub fn synchronize(&mut self) -> usize {
        // resume one byte early so a marker split across appends is found
        let start = self.scanned.saturating_sub(1);
        match self.buffer[start..].windows(2).position(|pair| pair == SYNC_MARKER) {
            Some(position) => {
                let noise = start + position;
                if noise > 0 {
                    debug!(noise, "discarding bytes before SYNC marker");
                    self.consume(noise);
                }
                self.scanned = 0;
                noise
            }
            None => {
                self.scanned = self.buffer.len();
                0
            }
        }
    }

    /// Try to take one frame off a synchronized buffer.
    ///
    /// `max_payload_len` is the soft length cap; `None` trusts the length byte.
    pub fn extract(&mut self, max_payload_len: Option<u8>) -> Extracted {
        if self.buffer.len() < FRAME_HEADER_SIZE || !self.is_synchronized() {
            return Extracted::Incomplete;
        }

        let declared = self.buffer[2];
        if declared == 0 {
            debug!("zero length frame, dropping marker");
            self.consume(SYNC_MARKER.len());
            return Extracted::Malformed(Malformed::ZeroLength);
        }
        if let Some(max) = max_payload_len {
            if declared > max {
                // A third SYNC is a repeated marker byte rather than a length.
                let dropped = if declared == SYNC { 1 } else { SYNC_MARKER.len() };
                debug!(declared, max, dropped, "payload length above cap");
                self.consume(dropped);
                return Extracted::Malformed(Malformed::Oversized { declared, max });
            }
        }

        let len = declared as usize;
        let total = len + FRAME_OVERHEAD;
        if self.buffer.len() < total {
            return Extracted::Incomplete;
        }

        let raw = self.buffer.split_to(total).freeze();
        self.scanned = 0;
        let frame = Frame {
            payload: raw.slice(FRAME_HEADER_SIZE..FRAME_HEADER_SIZE + len),
            checksum: raw[total - 1],
        };
        trace!(len, checksum = frame.checksum, "frame extracted");
        Extracted::Frame(frame)
    }
}
