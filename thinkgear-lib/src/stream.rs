//! Async read loop for tokio transports (RFCOMM sockets, serial device files).

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;
use tracing::{debug, info, trace};

use crate::config::DecoderConfig;
use crate::data_point::DataPoint;
use crate::decoder::{Decoder, DecoderStats};
use crate::error::{Result, TgError};

pub struct AsyncThinkGear<R> {
    reader: R,
    decoder: Decoder,
    scratch: Vec<u8>,
}

impl<R: AsyncRead + Unpin> AsyncThinkGear<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, DecoderConfig::default())
    }

    pub fn with_config(reader: R, config: DecoderConfig) -> Self {
        info!(?config, "ThinkGear stream opened");
        let scratch = vec![0u8; config.read_chunk_size.max(1)];
        Self {
            reader,
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

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Wait for one chunk of bytes and decode it.
    async fn fill(&mut self) -> Result<usize> {
        let read_timeout = self.decoder.config().read_timeout;
        let n = timeout(read_timeout, self.reader.read(&mut self.scratch)).await??;
        if n == 0 {
            debug!("reader reached end of stream");
            return Err(TgError::ConnectionClosed);
        }
        let queued = self.decoder.push(&self.scratch[..n]);
        trace!(received = n, queued, "decoded chunk");
        Ok(n)
    }

    /// Wait for the next data point.
    ///
    /// Each receive is bounded by the configured read timeout; hitting it
    /// returns [`TgError::Timeout`] with every buffered byte kept.
    pub async fn read_one(&mut self) -> Result<DataPoint> {
        loop {
            if let Some(point) = self.decoder.pop() {
                return Ok(point);
            }
            self.fill().await?;
        }
    }

    /// Receive once and return every data point decoded so far. An empty batch
    /// means no complete frame has arrived yet.
    pub async fn read_all(&mut self) -> Result<Vec<DataPoint>> {
        if self.decoder.pending() == 0 {
            self.fill().await?;
        }
        Ok(self.decoder.drain())
    }
}
