//! Public entry point: audio in, mouth cues out.
//!
//! [`LipSyncClient::get_lip_sync`] runs strictly in order:
//!
//! ```text
//! normalize(audio)          ── InvalidAudio, engine untouched
//!   └─▶ loader.get()        ── EngineInit (first call constructs)
//!         └─▶ spawn_blocking(engine.analyze(samples, 16 000, dialog))
//!               └─▶ mapper::to_public
//! ```
//!
//! The process-wide façade [`get_lip_sync`] resolves against one lazily
//! created global client, so every caller in the process shares one engine.

use std::sync::{Arc, OnceLock};

use thiserror::Error;

use crate::audio::{normalize, AudioError, AudioInput, PcmSamples, SAMPLE_RATE};
use crate::config::LipSyncConfig;
use crate::engine::{EngineError, EngineHandle, EngineInitError, EngineLoader};

use super::mapper;
use super::types::{LipSyncResult, RecognitionOptions};

// ---------------------------------------------------------------------------
// LipSyncError
// ---------------------------------------------------------------------------

/// Everything a `get_lip_sync` call can fail with.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LipSyncError {
    /// Malformed input, or audio the engine could not recognise.
    #[error(transparent)]
    InvalidAudio(#[from] AudioError),

    /// The shared engine could not be constructed.
    #[error(transparent)]
    EngineInit(#[from] EngineInitError),

    /// Analysis was attempted with no constructed engine.
    #[error("analysis engine is not initialised")]
    Uninitialized,

    /// The engine failed for a reason other than the audio itself.
    #[error("lip sync analysis failed: {0}")]
    Analysis(String),

    /// The blocking analysis task panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<EngineError> for LipSyncError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::InvalidAudio(msg) => Self::InvalidAudio(AudioError::Rejected(msg)),
            EngineError::Analysis(msg) => Self::Analysis(msg),
        }
    }
}

// ---------------------------------------------------------------------------
// LipSyncClient
// ---------------------------------------------------------------------------

/// Brokers calls to the shared analysis engine.
///
/// Cheap to clone; clones share the same [`EngineLoader`] and therefore the
/// same engine.
#[derive(Debug, Clone)]
pub struct LipSyncClient {
    loader: Arc<EngineLoader>,
}

impl LipSyncClient {
    pub fn new(loader: Arc<EngineLoader>) -> Self {
        Self { loader }
    }

    pub fn from_config(config: &LipSyncConfig) -> Self {
        Self::new(Arc::new(EngineLoader::from_config(&config.engine)))
    }

    pub fn loader(&self) -> &EngineLoader {
        &self.loader
    }

    /// Construct the engine now instead of on the first request.
    pub async fn warm_up(&self) -> Result<(), LipSyncError> {
        self.loader.get().await?;
        Ok(())
    }

    /// Turn 16 kHz mono 16-bit PCM into ordered mouth cues.
    ///
    /// # Errors
    ///
    /// - [`LipSyncError::InvalidAudio`]: bad base64, empty or odd-length
    ///   buffer (checked before the engine is touched), or audio the engine
    ///   rejected.
    /// - [`LipSyncError::EngineInit`]: the shared engine could not be built.
    /// - [`LipSyncError::Analysis`]: any other engine failure.
    pub async fn get_lip_sync(
        &self,
        audio: AudioInput,
        options: &RecognitionOptions,
    ) -> Result<LipSyncResult, LipSyncError> {
        let pcm = normalize(audio)?;
        let engine = self.loader.get().await?;
        analyze(engine, pcm, options).await
    }

    /// Like [`get_lip_sync`](Self::get_lip_sync), but only against an engine
    /// that is already constructed.
    ///
    /// # Errors
    ///
    /// [`LipSyncError::Uninitialized`] when no engine has been constructed
    /// yet, plus the audio and analysis errors of `get_lip_sync`.
    pub async fn try_get_lip_sync(
        &self,
        audio: AudioInput,
        options: &RecognitionOptions,
    ) -> Result<LipSyncResult, LipSyncError> {
        let pcm = normalize(audio)?;
        let engine = self.loader.current().ok_or(LipSyncError::Uninitialized)?;
        analyze(engine, pcm, options).await
    }
}

async fn analyze(
    engine: EngineHandle,
    pcm: PcmSamples,
    options: &RecognitionOptions,
) -> Result<LipSyncResult, LipSyncError> {
    let dialog_text = options.dialog_text_or_empty().to_owned();
    let sample_count = pcm.len();

    let native_cues = tokio::task::spawn_blocking(move || {
        engine.analyze(pcm.samples(), SAMPLE_RATE, &dialog_text)
    })
    .await
    .map_err(|e| LipSyncError::Internal(e.to_string()))??;

    log::debug!(
        "lipsync: {} samples → {} cues",
        sample_count,
        native_cues.len()
    );

    Ok(mapper::to_public(native_cues))
}

// ---------------------------------------------------------------------------
// Process-wide client
// ---------------------------------------------------------------------------

static GLOBAL_CLIENT: OnceLock<LipSyncClient> = OnceLock::new();

/// Install the configuration the process-wide client is built from.
///
/// Returns `false` when the global client already exists (configured earlier
/// or created by a prior [`get_lip_sync`] call); the existing one is kept.
pub fn configure_global(config: &LipSyncConfig) -> bool {
    GLOBAL_CLIENT.set(LipSyncClient::from_config(config)).is_ok()
}

/// The process-wide client, created from `settings.toml` on first use.
pub fn global_client() -> &'static LipSyncClient {
    GLOBAL_CLIENT.get_or_init(|| LipSyncClient::from_config(&LipSyncConfig::load_or_default()))
}

/// [`LipSyncClient::get_lip_sync`] on the process-wide client.
pub async fn get_lip_sync(
    audio: impl Into<AudioInput>,
    options: &RecognitionOptions,
) -> Result<LipSyncResult, LipSyncError> {
    global_client().get_lip_sync(audio.into(), options).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
