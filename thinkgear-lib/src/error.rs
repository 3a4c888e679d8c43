use std::io;
use thiserror::Error;

/// The primary error type for the `thinkgear-lib` library.
///
/// Stream noise (bad checksums, zero-length frames, unknown codes) is never
/// reported through this type while streaming; it is logged and counted in
/// [`crate::decoder::DecoderStats`] instead.
#[derive(Error, Debug)]
pub enum TgError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Timeout while waiting for ThinkGear data: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("Connection closed by the byte source")]
    ConnectionClosed,

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Payload truncated at offset {offset} (payload length {len})")]
    TruncatedPayload { offset: usize, len: usize },

    #[error("Invalid hex input: {0}")]
    InvalidHex(String),
}

impl From<hex::FromHexError> for TgError {
    fn from(err: hex::FromHexError) -> Self {
        TgError::InvalidHex(err.to_string())
    }
}

impl TgError {
    /// True for errors that end the stream rather than a single read attempt
    pub fn is_disconnect(&self) -> bool {
        match self {
            TgError::ConnectionClosed => true,
            TgError::Io(err) => matches!(
                err.kind(),
                io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TgError>;
