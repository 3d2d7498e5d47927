/// Particulate sensor frame validation and decoding
use thiserror::Error;

use crate::models::{Reading, FIELD_COUNT};

// Frame protocol constants
pub const START_BYTE_1: u8 = 0x42; // 'B'
pub const START_BYTE_2: u8 = 0x4D; // 'M'
pub const MIN_FRAME_LEN: usize = 32;
pub const MAX_FRAME_LEN: usize = 200;
const DATA_OFFSET: usize = 4; // First measurement word, after markers and frame length
const CHECKSUM_SPAN: usize = 30; // Bytes covered by the checksum
const FRAME_WORDS: usize = FIELD_COUNT + 2; // Measurements, reserved word, checksum
const CHECKSUM_WORD: usize = FIELD_COUNT + 1;

/// Why a chunk was not accepted as a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame length {len} outside {}..={} bytes", MIN_FRAME_LEN, MAX_FRAME_LEN)]
    InvalidLength { len: usize },

    #[error("bad start markers {first:#04x} {second:#04x}")]
    InvalidHeader { first: u8, second: u8 },

    #[error("only {words} words in frame, expected {}", FRAME_WORDS)]
    TruncatedFrame { words: usize },

    #[error("checksum mismatch: declared {declared}, computed {computed}")]
    ChecksumMismatch { declared: u16, computed: u32 },
}

/// Decode one sensor frame into a reading
///
/// The frame layout is:
/// - Bytes 0-1: Start markers 0x42 0x4D
/// - Bytes 2-3: Frame length as reported by the sensor (not used here)
/// - Bytes 4-27: Twelve big-endian measurement words, in `Reading` field order
/// - Bytes 28-29: Reserved word (skipped)
/// - Bytes 30-31: Checksum, the plain sum of bytes 0-29
///
/// Checks run in order and stop at the first failure: length, start markers,
/// word count, checksum. The function has no side effects, so the caller
/// decides whether a rejection is worth logging.
///
/// # Arguments
/// * `chunk` - Raw bytes delivered by the transport, 32 to 200 bytes long
///
/// # Returns
/// The decoded `Reading`, or the first `FrameError` encountered
pub fn decode_frame(chunk: &[u8]) -> Result<Reading, FrameError> {
    if !(MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&chunk.len()) {
        return Err(FrameError::InvalidLength { len: chunk.len() });
    }

    if chunk[0] != START_BYTE_1 || chunk[1] != START_BYTE_2 {
        return Err(FrameError::InvalidHeader {
            first: chunk[0],
            second: chunk[1],
        });
    }

    // Pack byte pairs into big-endian words; a trailing odd byte is ignored
    let mut words = [0u16; FRAME_WORDS];
    let mut count = 0;
    for (slot, pair) in words.iter_mut().zip(chunk[DATA_OFFSET..].chunks_exact(2)) {
        *slot = u16::from_be_bytes([pair[0], pair[1]]);
        count += 1;
    }

    if count < FRAME_WORDS {
        return Err(FrameError::TruncatedFrame { words: count });
    }

    let declared = words[CHECKSUM_WORD];
    let computed: u32 = chunk[..CHECKSUM_SPAN].iter().map(|&b| u32::from(b)).sum();
    if computed != u32::from(declared) {
        return Err(FrameError::ChecksumMismatch { declared, computed });
    }

    let mut fields = [0u16; FIELD_COUNT];
    fields.copy_from_slice(&words[..FIELD_COUNT]);

    Ok(Reading::from_words(fields))
}
