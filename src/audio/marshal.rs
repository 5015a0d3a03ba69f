//! Host audio → engine sample buffer.
//!
//! Callers hand over either base64 text or a raw byte buffer holding
//! **16-bit little-endian PCM, 16 kHz, mono**.  [`normalize`] checks the
//! structural preconditions (strict base64, non-empty, even length) and
//! reinterprets the bytes as `i16` samples.  Nothing here can tell a wrong
//! sample rate or channel count apart from a correct one; that part of the
//! contract is on the caller.
//!
//! ```rust
//! use lip_sync::audio::{normalize, AudioInput};
//!
//! let pcm = normalize(AudioInput::RawPcmBuffer(vec![0x01, 0x00, 0xff, 0xff])).unwrap();
//! assert_eq!(pcm.samples(), &[1, -1]);
//! ```

use base64::Engine as _;
use thiserror::Error;

/// The only sample rate the engine accepts.
pub const SAMPLE_RATE: u32 = 16_000;

/// Bytes per sample (16-bit PCM).
const BYTES_PER_SAMPLE: usize = 2;

// ---------------------------------------------------------------------------
// AudioError
// ---------------------------------------------------------------------------

/// Reason a piece of caller audio was rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AudioError {
    /// The base64 text did not decode.
    #[error("invalid base64 audio: {0}")]
    Base64(String),

    /// The decoded or raw buffer holds no bytes.
    #[error("audio buffer is empty")]
    Empty,

    /// The buffer cannot be split into whole 16-bit samples.
    #[error("audio buffer length {len} is not a multiple of 2 (16-bit PCM)")]
    OddLength { len: usize },

    /// The buffer was structurally valid but the engine refused it.
    #[error("audio rejected by engine: {0}")]
    Rejected(String),
}

// ---------------------------------------------------------------------------
// AudioInput
// ---------------------------------------------------------------------------

/// Caller-supplied audio in one of the two accepted encodings.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioInput {
    /// Base64 text of 16-bit LE PCM bytes.
    Base64Pcm(String),
    /// Raw 16-bit LE PCM bytes.
    RawPcmBuffer(Vec<u8>),
}

impl From<Vec<u8>> for AudioInput {
    fn from(bytes: Vec<u8>) -> Self {
        Self::RawPcmBuffer(bytes)
    }
}

impl From<&[u8]> for AudioInput {
    fn from(bytes: &[u8]) -> Self {
        Self::RawPcmBuffer(bytes.to_vec())
    }
}

impl From<String> for AudioInput {
    fn from(text: String) -> Self {
        Self::Base64Pcm(text)
    }
}

impl From<&str> for AudioInput {
    fn from(text: &str) -> Self {
        Self::Base64Pcm(text.to_owned())
    }
}

// ---------------------------------------------------------------------------
// PcmSamples
// ---------------------------------------------------------------------------

/// A validated, contiguous run of 16 kHz mono `i16` samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmSamples {
    samples: Vec<i16>,
}

impl PcmSamples {
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always `false` for values produced by [`normalize`].
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds at [`SAMPLE_RATE`].
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / SAMPLE_RATE as f64
    }

    pub fn into_inner(self) -> Vec<i16> {
        self.samples
    }
}

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

/// Validate `input` and reinterpret it as little-endian `i16` samples.
///
/// No resampling, channel mixing or format conversion happens here.
///
/// # Errors
///
/// - [`AudioError::Base64`]: the text is not strict standard base64.
/// - [`AudioError::Empty`]: zero bytes after decoding.
/// - [`AudioError::OddLength`]: an odd number of bytes.
pub fn normalize(input: AudioInput) -> Result<PcmSamples, AudioError> {
    let bytes = match input {
        AudioInput::Base64Pcm(text) => decode_base64(&text)?,
        AudioInput::RawPcmBuffer(bytes) => bytes,
    };
    samples_from_le_bytes(&bytes)
}

fn decode_base64(text: &str) -> Result<Vec<u8>, AudioError> {
    base64::engine::general_purpose::STANDARD
        .decode(text.as_bytes())
        .map_err(|e| AudioError::Base64(e.to_string()))
}

fn samples_from_le_bytes(bytes: &[u8]) -> Result<PcmSamples, AudioError> {
    if bytes.is_empty() {
        return Err(AudioError::Empty);
    }
    if bytes.len() % BYTES_PER_SAMPLE != 0 {
        return Err(AudioError::OddLength { len: bytes.len() });
    }

    let samples = bytes
        .chunks_exact(BYTES_PER_SAMPLE)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    Ok(PcmSamples { samples })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn raw_buffer_is_read_little_endian() {
        let pcm = normalize(AudioInput::RawPcmBuffer(vec![0x34, 0x12, 0x00, 0x80])).unwrap();
        assert_eq!(pcm.samples(), &[0x1234, i16::MIN]);
    }

    #[test]
    fn base64_and_raw_give_identical_samples() {
        let bytes: Vec<u8> = (0..64u8).collect();
        let from_raw = normalize(AudioInput::RawPcmBuffer(bytes.clone())).unwrap();
        let from_b64 = normalize(AudioInput::Base64Pcm(encode(&bytes))).unwrap();
        assert_eq!(from_raw, from_b64);
        assert_eq!(from_raw.len(), 32);
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let err = normalize(AudioInput::from("invalid-base64-data")).unwrap_err();
        assert!(matches!(err, AudioError::Base64(_)), "got {err:?}");
    }

    #[test]
    fn base64_with_whitespace_is_rejected() {
        let mut text = encode(&[1, 0, 2, 0]);
        text.insert(2, '\n');
        assert!(matches!(
            normalize(AudioInput::Base64Pcm(text)),
            Err(AudioError::Base64(_))
        ));
    }

    #[test]
    fn empty_base64_is_rejected_as_empty() {
        assert_eq!(
            normalize(AudioInput::Base64Pcm(String::new())).unwrap_err(),
            AudioError::Empty
        );
    }

    #[test]
    fn empty_raw_buffer_is_rejected() {
        assert_eq!(
            normalize(AudioInput::RawPcmBuffer(Vec::new())).unwrap_err(),
            AudioError::Empty
        );
    }

    #[test]
    fn odd_length_raw_buffer_is_rejected() {
        assert_eq!(
            normalize(AudioInput::RawPcmBuffer(vec![0; 3])).unwrap_err(),
            AudioError::OddLength { len: 3 }
        );
    }

    #[test]
    fn odd_length_after_decoding_is_rejected() {
        let err = normalize(AudioInput::Base64Pcm(encode(&[1, 2, 3]))).unwrap_err();
        assert_eq!(err, AudioError::OddLength { len: 3 });
    }

    #[test]
    fn duration_uses_fixed_sample_rate() {
        let pcm = normalize(AudioInput::RawPcmBuffer(vec![0; 16_000])).unwrap();
        assert!((pcm.duration_secs() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn audio_error_display_mentions_length() {
        let e = AudioError::OddLength { len: 7 };
        assert!(e.to_string().contains('7'));
    }
}
