mod auth;
mod health;
mod models;
mod responses;
mod speakers;
mod transcription_detail;
mod transcriptions;

pub use health::health_handler;
pub use models::list_models_handler;
pub use speakers::rename_speaker_handler;
pub use transcription_detail::{get_transcription_handler, update_transcription_handler};
pub use transcriptions::{create_transcription_handler, list_transcriptions_handler};
