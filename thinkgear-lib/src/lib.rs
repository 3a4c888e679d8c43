//! Decoder for the ThinkGear Serial Stream Protocol spoken by NeuroSky based
//! EEG headsets (MindWave, MindSet) over serial and Bluetooth RFCOMM links.

pub mod config;
pub mod constants;
pub mod data_point;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod payload;
pub mod reader;
pub mod registry;
pub mod stream;


pub use config::DecoderConfig;
pub use data_point::{DataPoint, EegPowers, Reading};
pub use decoder::{Decoder, DecoderStats};
pub use error::TgError;
pub use frame::StreamState;
pub use reader::{ByteSource, IoSource, SliceSource, ThinkGear};
pub use registry::Opcode;
pub use stream::AsyncThinkGear;
