//! In-process stand-in engine that returns a pre-configured cue sequence.
//!
//! Selected with `EngineBackend::Fixed`.  Useful for exercising the client,
//! marshalling and mapping paths on machines without the native library.

use crate::engine::analysis::{AnalysisEngine, EngineError, NativeCue};

/// Returns the same cues for every non-empty input.
#[derive(Debug, Clone)]
pub struct FixedEngine {
    cues: Vec<NativeCue>,
}

impl FixedEngine {
    pub fn new(cues: Vec<NativeCue>) -> Self {
        Self { cues }
    }

    pub fn cues(&self) -> &[NativeCue] {
        &self.cues
    }
}

impl Default for FixedEngine {
    /// Idle followed by a closed mouth, 0.2 s each.
    fn default() -> Self {
        Self::new(vec![
            NativeCue::new(0.0, 0.2, "X"),
            NativeCue::new(0.2, 0.4, "A"),
        ])
    }
}

impl AnalysisEngine for FixedEngine {
    fn analyze(
        &self,
        samples: &[i16],
        _sample_rate: u32,
        _dialog_text: &str,
    ) -> Result<Vec<NativeCue>, EngineError> {
        if samples.is_empty() {
            return Err(EngineError::InvalidAudio("no samples".into()));
        }
        Ok(self.cues.clone())
    }
}
