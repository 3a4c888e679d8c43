//! Tests for malformed and hostile input

mod common;

use common::*;

/// Deterministic xorshift generator, enough to produce varied noise
fn noise(seed: u32, len: usize) -> Vec<u8> {
    let mut state = seed.max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

#[test]
fn test_random_noise_never_panics() {
    for seed in 1..200 {
        let bytes = noise(seed, 512);
        let mut decoder = Decoder::new();
        for chunk in bytes.chunks(7) {
            decoder.push(chunk);
        }
        let stats = decoder.stats();
        assert_eq!(stats.bytes_received, 512);
        assert_eq!(stats.data_points as usize, decoder.drain().len());
    }
}

#[test]
fn test_random_payloads_never_panic() {
    for seed in 1..500 {
        let len = (seed % 40) as usize;
        let payload = Bytes::from(noise(seed, len));
        for rule in [LengthRule::KnownMultiByte, LengthRule::CodeRange] {
            let config = DecoderConfig::default().with_length_rule(rule);
            let parsed = parse_payload(&payload, &config);
            let consumed: usize = parsed.points.iter().map(|p| p.data.len()).sum();
            assert!(consumed <= payload.len());
        }
    }
}

#[test]
fn test_valid_frame_survives_surrounding_noise() {
    init_tracing();
    let mut stream = vec![0x13, 0x37, 0x00, 0x55];
    stream.extend(frame(&[0x04, 0x2A]));
    stream.extend_from_slice(&[0xAA, 0x01]);
    stream.extend(frame(&[0x05, 0x2B]));

    let mut decoder = Decoder::new();
    decoder.push(&stream);
    let readings: Vec<Reading> = decoder.drain().into_iter().map(|p| p.reading).collect();
    assert_eq!(
        readings,
        vec![Reading::AttentionLevel { value: 0x2A }, Reading::MeditationLevel { value: 0x2B }]
    );
    assert_eq!(decoder.stats().noise_bytes, 6);
}

#[test]
fn test_corrupted_checksum_drops_only_that_frame() {
    init_tracing();
    let mut bad = frame(&[0x04, 0x10]);
    let last = bad.len() - 1;
    bad[last] ^= 0x01;
    let mut stream = bad;
    stream.extend(frame(&[0x04, 0x20]));

    let mut decoder = Decoder::new();
    decoder.push(&stream);
    let points = decoder.drain();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].reading, Reading::AttentionLevel { value: 0x20 });
    assert_eq!(decoder.stats().checksum_errors, 1);
}

#[test]
fn test_empty_and_tiny_payloads() {
    let config = DecoderConfig::default();
    assert!(parse_payload(&Bytes::new(), &config).points.is_empty());

    let parsed = parse_payload(&Bytes::from_static(&[0x80]), &config);
    assert!(parsed.points.is_empty());
    assert!(parsed.is_truncated());

    let strict = parse_payload_strict(&Bytes::from_static(&[0x80, 0x05, 0x01]), &config);
    assert!(matches!(strict, Err(TgError::TruncatedPayload { offset: 0, len: 3 })));
}

#[test]
fn test_undersized_known_codes_fall_back() {
    let parsed = parse_payload(&Bytes::from_static(&[0x80, 0x01, 0xFE]), &DecoderConfig::default());
    assert_eq!(parsed.points[0].reading, Reading::Unknown { opcode: 0x80, value: -2 });
    assert!(!parsed.is_truncated());

    let config = DecoderConfig::default().with_fallback(FallbackPolicy::FirstByte);
    let parsed = parse_payload(&Bytes::from_static(&[0x80, 0x01, 0xFE]), &config);
    assert_eq!(parsed.points[0].reading, Reading::Unknown { opcode: 0x80, value: 0xFE });
}

#[test]
fn test_reset_discards_buffer() {
    let mut decoder = Decoder::new();
    decoder.push(&[0xAA, 0xAA, 0x10, 0x01]);
    decoder.push(&frame(&[0x04, 0x01]));
    decoder.reset();
    assert_eq!(decoder.buffered(), 0);
    assert_eq!(decoder.pending(), 0);
}
