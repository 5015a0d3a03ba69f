//! Lip-sync client module.
//!
//! This module provides:
//! * [`LipSyncClient`]: validates audio, obtains the shared engine, runs
//!   analysis and maps the result.
//! * [`get_lip_sync`]: the same call on a process-wide client.
//! * [`RecognitionOptions`], [`LipSyncResult`], [`MouthCue`], [`MouthShape`]
//!   are the public option and result types.
//! * [`LipSyncError`]: everything a call can fail with.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use lip_sync::audio::AudioInput;
//! use lip_sync::config::LipSyncConfig;
//! use lip_sync::lipsync::{LipSyncClient, RecognitionOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = LipSyncConfig::load().unwrap();
//!     let client = LipSyncClient::from_config(&config);
//!
//!     let pcm: Vec<u8> = std::fs::read("utterance.pcm").unwrap(); // 16 kHz mono s16le
//!     let result = client
//!         .get_lip_sync(AudioInput::RawPcmBuffer(pcm), &RecognitionOptions::with_dialog_text("hello"))
//!         .await
//!         .unwrap();
//!
//!     for cue in &result.mouth_cues {
//!         println!("{:.2}-{:.2} {}", cue.start, cue.end, cue.value);
//!     }
//! }
//! ```

pub mod client;
pub mod mapper;
pub mod types;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{configure_global, get_lip_sync, global_client, LipSyncClient, LipSyncError};
pub use mapper::to_public;
pub use types::{LipSyncResult, MouthCue, MouthShape, RecognitionOptions};
