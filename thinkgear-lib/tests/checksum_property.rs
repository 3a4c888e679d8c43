//! Checksum acceptance: a frame is accepted iff !(sum(payload) & 0xFF) == checksum

mod common;

use common::*;

/// Deterministic payload generator covering every length 1..=255
fn payloads() -> impl Iterator<Item = Vec<u8>> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    (1..=255usize).map(move |len| {
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                (state >> 56) as u8
            })
            .collect()
    })
}

fn reference_checksum(payload: &[u8]) -> u8 {
    let sum: u32 = payload.iter().map(|b| *b as u32).sum();
    !(sum & 0xFF) as u8
}

#[test]
fn test_checksum_matches_reference() {
    for payload in payloads() {
        assert_eq!(checksum(&payload), reference_checksum(&payload));
    }
}

#[test]
fn test_frame_accepted_iff_checksum_matches() {
    for (i, payload) in payloads().enumerate() {
        let expected = reference_checksum(&payload);
        // every checksum byte for a sample of lengths, matching plus one neighbour otherwise
        let candidates: Vec<u8> = if i % 16 == 0 {
            (0..=255).collect()
        } else {
            vec![expected, expected.wrapping_add(1)]
        };

        for candidate in candidates {
            let mut stream = vec![0xAA, 0xAA, payload.len() as u8];
            stream.extend_from_slice(&payload);
            stream.push(candidate);

            let mut buffer = FrameBuffer::new();
            buffer.append(&stream);
            match buffer.extract(None) {
                Extracted::Frame(frame) => {
                    assert_eq!(frame.is_valid(), candidate == expected, "len {}", payload.len());
                    assert_eq!(frame.verify().is_ok(), candidate == expected);
                }
                other => panic!("Expected a frame, got {:?}", other),
            }
            assert!(buffer.is_empty());
        }
    }
}
