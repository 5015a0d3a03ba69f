//! The analysis-engine seam.
//!
//! [`AnalysisEngine`] is the whole contract the runtime relies on: hand it a
//! contiguous 16-bit sample buffer, the sample rate and optional dialog text,
//! get back time-ordered labelled spans.  It is object-safe and
//! `Send + Sync` so the loader can hand out `Arc<dyn AnalysisEngine>`.

use thiserror::Error;

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// Failures reported by an engine during analysis.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// The engine judged the audio unrecognisable.
    #[error("invalid audio: {0}")]
    InvalidAudio(String),

    /// Any other engine-side failure.
    #[error("analysis failed: {0}")]
    Analysis(String),
}

// ---------------------------------------------------------------------------
// NativeCue
// ---------------------------------------------------------------------------

/// One span as produced by the engine, before public relabelling.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeCue {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Shape letter or ARPAbet phone, depending on the engine.
    pub label: String,
}

impl NativeCue {
    pub fn new(start: f64, end: f64, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AnalysisEngine trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for mouth-cue analysis engines.
///
/// # Contract
///
/// - `samples` are **16 kHz, mono, i16** PCM and never empty.
/// - The returned cues are ordered by `start` and non-overlapping.
/// - The call is blocking and CPU-bound; async callers run it on a blocking
///   thread.
pub trait AnalysisEngine: Send + Sync {
    fn analyze(
        &self,
        samples: &[i16],
        sample_rate: u32,
        dialog_text: &str,
    ) -> Result<Vec<NativeCue>, EngineError>;
}

// Compile-time assertion: Box<dyn AnalysisEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn AnalysisEngine>) {}
};
