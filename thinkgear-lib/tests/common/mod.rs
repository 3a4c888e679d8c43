//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use thinkgear_lib::config::{DecoderConfig, FallbackPolicy, LengthRule};
#[allow(unused_imports)]
pub use thinkgear_lib::data_point::{DataPoint, EegPowers, Reading};
#[allow(unused_imports)]
pub use thinkgear_lib::decoder::Decoder;
#[allow(unused_imports)]
pub use thinkgear_lib::error::TgError;
#[allow(unused_imports)]
pub use thinkgear_lib::frame::{Extracted, FrameBuffer, checksum};
#[allow(unused_imports)]
pub use thinkgear_lib::payload::{parse_payload, parse_payload_strict};
#[allow(unused_imports)]
pub use thinkgear_lib::reader::{ByteSource, IoSource, SliceSource, ThinkGear};
#[allow(unused_imports)]
pub use thinkgear_lib::registry::Opcode;

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Bytes {
    let compact: String = hex_data.split_whitespace().collect();
    Bytes::from(hex::decode(compact).expect("Failed to decode hex"))
}

/// Wrap a payload into a wire frame with a correct checksum
#[allow(dead_code)]
pub fn frame(payload: &[u8]) -> Vec<u8> {
    assert!(!payload.is_empty() && payload.len() <= 255);
    let mut bytes = vec![0xAA, 0xAA, payload.len() as u8];
    bytes.extend_from_slice(payload);
    bytes.push(checksum(payload));
    bytes
}

/// Example packet from the ThinkGear communications protocol datasheet:
/// poor signal 0, EEG powers, attention 13, meditation 61
#[allow(dead_code)]
pub const DATASHEET_EXAMPLE: &str =
    "aaaa20020083180000940000420000 0b00006400004d00003d000007000005 040d053d34";

/// A single raw wave sample of -100
#[allow(dead_code)]
pub const RAW_WAVE_FRAME: &[u8] = &[0xAA, 0xAA, 0x04, 0x80, 0x02, 0xFF, 0x9C, 0xE2];

/// Route decoder events to the test output; `RUST_LOG=thinkgear_lib=debug`
/// shows discarded noise and checksum failures
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
