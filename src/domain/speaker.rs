use super::{SpeakerId, TranscriptionId};

/// A diarization-identified participant within one job's audio.
/// `speaker_key` is the vendor-local identifier, unique within a job;
/// `display_name` starts as a generated placeholder and is user-renamable.
#[derive(Debug, Clone)]
pub struct Speaker {
    pub id: SpeakerId,
    pub transcription_id: TranscriptionId,
    pub speaker_key: String,
    pub display_name: String,
}
