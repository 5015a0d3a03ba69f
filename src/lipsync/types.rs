//! Public option and result types.
//!
//! These serialise to the host-facing JSON shape:
//!
//! ```json
//! {"mouthCues":[{"start":0.0,"end":0.2,"value":"X"},{"start":0.2,"end":0.4,"value":"A"}]}
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RecognitionOptions
// ---------------------------------------------------------------------------

/// Per-call recognition options.
///
/// Unknown keys are ignored when parsing, so host option objects carrying
/// extra settings are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecognitionOptions {
    /// Transcript of the spoken text, used as a recognition hint.
    pub dialog_text: Option<String>,
}

impl RecognitionOptions {
    pub fn with_dialog_text(text: impl Into<String>) -> Self {
        Self {
            dialog_text: Some(text.into()),
        }
    }

    /// Parse a host options object such as `{"dialogText":"hello"}`.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Dialog text as passed to the engine; empty when absent.
    pub fn dialog_text_or_empty(&self) -> &str {
        self.dialog_text.as_deref().unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// MouthShape
// ---------------------------------------------------------------------------

/// The mouth-shape alphabet.
///
/// `A`–`F` are the basic shapes, `G` and `H` the extended ones, `X` is idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouthShape {
    /// Closed mouth (P, B, M).
    A,
    /// Slightly open, clenched teeth (most consonants, EE).
    B,
    /// Open mouth (EH, AH).
    C,
    /// Wide open (AA).
    D,
    /// Slightly rounded (AO, ER).
    E,
    /// Puckered lips (UW, OW, W).
    F,
    /// Upper teeth on lower lip (F, V).
    G,
    /// Tongue raised (long L).
    H,
    /// Idle / rest.
    X,
}

impl MouthShape {
    pub const ALL: [MouthShape; 9] = [
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
        Self::H,
        Self::X,
    ];

    pub fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
            Self::F => 'F',
            Self::G => 'G',
            Self::H => 'H',
            Self::X => 'X',
        }
    }

    /// Shape for an ARPAbet phone.  Unmapped phones (including silence) are idle.
    pub fn from_phone(phone: &str) -> Self {
        match phone.to_ascii_uppercase().as_str() {
            "P" | "B" | "M" => Self::A,
            "IY" | "T" | "D" | "N" | "S" | "Z" => Self::B,
            "EH" | "AH" => Self::C,
            "AA" | "AE" | "AY" => Self::D,
            "AO" | "OW" => Self::E,
            "UW" | "W" | "OY" => Self::F,
            "F" | "V" => Self::G,
            "L" => Self::H,
            _ => Self::X,
        }
    }
}

impl fmt::Display for MouthShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for MouthShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|shape| s.len() == 1 && s.starts_with(shape.as_char()))
            .ok_or_else(|| format!("unknown mouth shape `{s}`"))
    }
}

// ---------------------------------------------------------------------------
// MouthCue / LipSyncResult
// ---------------------------------------------------------------------------

/// One timed mouth shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouthCue {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    pub value: MouthShape,
}

/// Ordered mouth cues for one piece of audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LipSyncResult {
    pub mouth_cues: Vec<MouthCue>,
}

impl LipSyncResult {
    /// `true` when every cue has `0 <= start < end` and cues are sorted and
    /// non-overlapping.
    pub fn is_well_ordered(&self) -> bool {
        self.mouth_cues
            .iter()
            .all(|cue| cue.start >= 0.0 && cue.start < cue.end)
            && self
                .mouth_cues
                .windows(2)
                .all(|pair| pair[0].end <= pair[1].start)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
