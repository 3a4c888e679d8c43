// Protocol constants for the ThinkGear Serial Stream

/// Frame start marker, sent twice in a row
pub const SYNC: u8 = 0xAA;

/// Two SYNC bytes open every frame
pub const SYNC_MARKER: [u8; 2] = [SYNC, SYNC];

/// Extended code escape byte, may precede a code inside a payload
pub const EXCODE: u8 = 0x55;

/// Bytes before the payload: SYNC SYNC PLENGTH
pub const FRAME_HEADER_SIZE: usize = 3;

/// Header plus the trailing checksum byte
pub const FRAME_OVERHEAD: usize = FRAME_HEADER_SIZE + 1;

/// Payload cap used by one protocol revision (exceeding frames were dropped)
pub const PROTOCOL_MAX_PAYLOAD_LEN: u8 = 169;

/// Payload cap from the stricter protocol revision
pub const STRICT_MAX_PAYLOAD_LEN: u8 = 167;

/// Codes in this range carry a length prefix under the older length rule
pub const MULTI_BYTE_CODE_START: u8 = 0x80;

/// Vendor codes above 0x7F that are nevertheless single byte
pub const SINGLE_BYTE_VENDOR_CODES: [u8; 2] = [0xBA, 0xBC];

/// Poor signal values at or above this mean the sensor has no skin contact
pub const NO_CONTACT_THRESHOLD: u8 = 200;

/// Size of the raw wave sample (signed 16-bit big-endian)
pub const RAW_WAVE_SIZE: usize = 2;

/// Number of band powers in an ASIC_EEG_POWER record
pub const EEG_BAND_COUNT: usize = 8;

/// Each band power is a 3-byte big-endian unsigned integer
pub const EEG_BAND_SIZE: usize = 3;

/// Size of the ASIC_EEG_POWER record
pub const EEG_POWERS_SIZE: usize = EEG_BAND_COUNT * EEG_BAND_SIZE;

/// Default number of bytes requested from a byte source per receive
pub const DEFAULT_READ_CHUNK_SIZE: usize = 1024;
