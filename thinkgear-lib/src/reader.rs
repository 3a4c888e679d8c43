//! Synchronous read loop over a [`ByteSource`].

use bytes::Bytes;
use std::io::{self, Read};
use tracing::{debug, trace};

use crate::config::DecoderConfig;
use crate::data_point::DataPoint;
use crate::decoder::{Decoder, DecoderStats};
use crate::error::{Result, TgError};

/// Anything that can hand out received bytes.
///
/// `receive` may return fewer bytes than `buf` holds. `Ok(0)` means nothing
/// is available right now; a closed transport is reported as
/// [`TgError::ConnectionClosed`].
pub trait ByteSource {
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).receive(buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).receive(buf)
    }
}

/// Adapts a [`std::io::Read`] (serial device node, RFCOMM tty, capture file).
///
/// Timeouts and `WouldBlock` count as "nothing available"; end of stream is
/// [`TgError::ConnectionClosed`].
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
}

impl<R: Read> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for IoSource<R> {
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.inner.read(buf) {
            Ok(0) if !buf.is_empty() => Err(TgError::ConnectionClosed),
            Ok(n) => Ok(n),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory byte source handing out at most `chunk_size` bytes per receive.
#[derive(Debug, Clone)]
pub struct SliceSource {
    data: Bytes,
    chunk_size: usize,
    close_at_end: bool,
}

impl SliceSource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            chunk_size: usize::MAX,
            close_at_end: false,
        }
    }

    /// Parse a hex dump; whitespace is ignored.
    pub fn from_hex(hex_data: &str) -> Result<Self> {
        let compact: String = hex_data.split_whitespace().collect();
        Ok(Self::new(hex::decode(compact)?))
    }

    /// Chunk sizes of zero are bumped to one byte.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Report [`TgError::ConnectionClosed`] once the data is used up, instead
    /// of "nothing available".
    pub fn close_at_end(mut self) -> Self {
        self.close_at_end = true;
        self
    }

    pub fn remaining(&self) -> usize {
        self.data.len()
    }
}

impl ByteSource for SliceSource {
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.data.is_empty() {
            return if self.close_at_end {
                Err(TgError::ConnectionClosed)
            } else {
                Ok(0)
            };
        }
        let n = buf.len().min(self.chunk_size).min(self.data.len());
        let chunk = self.data.split_to(n);
        buf[..n].copy_from_slice(&chunk);
        Ok(n)
    }
}

/// Reads data points from a ThinkGear headset through a [`ByteSource`].
pub struct ThinkGear<S> {
    source: S,
    decoder: Decoder,
    scratch: Vec<u8>,
}

impl<S: ByteSource> ThinkGear<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, DecoderConfig::default())
    }

    pub fn with_config(source: S, config: DecoderConfig) -> Self {
        let scratch = vec![0u8; config.read_chunk_size.max(1)];
        Self {
            source,
            decoder: Decoder::with_config(config),
            scratch,
        }
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// One receive from the source, decoded. Returns the number of bytes received.
    fn fill(&mut self) -> Result<usize> {
        let n = self.source.receive(&mut self.scratch)?;
        if n > 0 {
            let queued = self.decoder.push(&self.scratch[..n]);
            trace!(received = n, queued, "decoded chunk");
        }
        Ok(n)
    }

    /// Next data point. Receives more bytes only while the queue is empty.
    ///
    /// `Ok(None)` means the source has nothing more right now; transport
    /// errors are returned as they are.
    pub fn read_one(&mut self) -> Result<Option<DataPoint>> {
        loop {
            if let Some(point) = self.decoder.pop() {
                return Ok(Some(point));
            }
            if self.fill()? == 0 {
                return Ok(None);
            }
        }
    }

    /// Return every data point decoded so far, receiving once if none are queued.
    ///
    /// An empty batch means no complete frame is available yet, which is not
    /// an error; a closed source is reported as [`TgError::ConnectionClosed`]
    /// only after the queue has been handed out.
    pub fn read_all(&mut self) -> Result<Vec<DataPoint>> {
        if self.decoder.pending() > 0 {
            return Ok(self.decoder.drain());
        }
        let received = self.fill()?;
        let points = self.decoder.drain();
        if points.is_empty() {
            debug!(received, buffered = self.decoder.buffered(), "no data points decoded yet");
        }
        Ok(points)
    }
}
