//! Speech audio → time-aligned mouth-shape cues.
//!
//! The crate brokers access to one process-wide analysis engine:
//!
//! ```text
//! get_lip_sync(audio, options)
//!   └─▶ audio::normalize        base64 / raw bytes → i16 samples
//!   └─▶ engine::EngineLoader    one shared engine, built on first use
//!   └─▶ AnalysisEngine::analyze samples @ 16 kHz + dialog text
//!   └─▶ lipsync::to_public      native cues → MouthCue { start, end, value }
//! ```

pub mod audio;
pub mod config;
pub mod engine;
pub mod lipsync;

pub use audio::AudioInput;
pub use lipsync::{
    configure_global, get_lip_sync, LipSyncClient, LipSyncError, LipSyncResult, MouthCue,
    MouthShape, RecognitionOptions,
};
