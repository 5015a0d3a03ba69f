//! Audio marshalling: host encodings → engine sample buffer.
//!
//! ```text
//! AudioInput::Base64Pcm ──▶ strict base64 decode ─┐
//!                                                 ├─▶ length checks ─▶ PcmSamples (i16, 16 kHz mono)
//! AudioInput::RawPcmBuffer ───────────────────────┘
//! ```

pub mod marshal;

pub use marshal::{normalize, AudioError, AudioInput, PcmSamples, SAMPLE_RATE};
