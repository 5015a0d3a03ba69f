//! Engine cues → public [`LipSyncResult`].
//!
//! A 1:1 copy: `start`/`end` are kept, `label` becomes `value`.  Cues are
//! never reordered, merged or clipped.
//!
//! Labels are read as follows:
//! - one character that is a shape letter → that shape;
//! - any other label → an ARPAbet phone, relabelled via
//!   [`MouthShape::from_phone`];
//! - unknown phones → idle (`X`).
//!
//! `B`, `D` and `F` are both shape letters and phones; they are read as
//! shapes.

use crate::engine::NativeCue;

use super::types::{LipSyncResult, MouthCue, MouthShape};

pub fn to_public(native_cues: Vec<NativeCue>) -> LipSyncResult {
    LipSyncResult {
        mouth_cues: native_cues.into_iter().map(to_mouth_cue).collect(),
    }
}

fn to_mouth_cue(cue: NativeCue) -> MouthCue {
    MouthCue {
        start: cue.start,
        end: cue.end,
        value: relabel(&cue.label),
    }
}

fn relabel(label: &str) -> MouthShape {
    let label = label.trim();
    label
        .parse()
        .unwrap_or_else(|_| MouthShape::from_phone(label))
}
