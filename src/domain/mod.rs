mod audio_asset;
mod audio_asset_id;
mod provider;
mod segment;
mod segment_id;
mod speaker;
mod speaker_id;
mod transcription;
mod transcription_id;
mod transcription_status;
mod user_id;

pub use audio_asset::AudioAsset;
pub use audio_asset_id::AudioAssetId;
pub use provider::TranscriptionProvider;
pub use segment::{Segment, WordTiming};
pub use segment_id::SegmentId;
pub use speaker::Speaker;
pub use speaker_id::SpeakerId;
pub use transcription::Transcription;
pub use transcription_id::TranscriptionId;
pub use transcription_status::TranscriptionStatus;
pub use user_id::UserId;
