use serde::{Deserialize, Serialize};

use super::{SegmentId, SpeakerId, TranscriptionId};

/// A contiguous span of transcript text attributed to one speaker.
///
/// `speaker_id` is resolved from `speaker_key` when the transcript is
/// persisted; an unresolved key leaves it `None` but keeps the raw key.
#[derive(Debug, Clone)]
pub struct Segment {
    pub id: SegmentId,
    pub transcription_id: TranscriptionId,
    pub speaker_id: Option<SpeakerId>,
    pub speaker_key: String,
    pub start_ms: i64,
    pub end_ms: i64,
    pub text: String,
    pub confidence: Option<f64>,
    pub words: Option<Vec<WordTiming>>,
}

/// Per-word timing, only present when the vendor supplies word-level data.
/// Word intervals are expected to fall within the segment interval but this
/// is not enforced; vendor timings pass through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordTiming {
    pub start_ms: i64,
    pub end_ms: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}
