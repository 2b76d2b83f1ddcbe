//! Pure mappers from raw vendor JSON to [`TranscriptionResult`].
//!
//! Mappers never fail on absent optional fields; missing times fall back to
//! `0` or the nearest known anchor, missing text to `""`, missing speaker ids
//! to a synthetic `speaker_<..>` key. The only error case is a response that
//! is not a JSON object at all.

mod deepgram;
mod elevenlabs;
mod openai;

pub use deepgram::map_deepgram_response;
pub use elevenlabs::map_elevenlabs_response;
pub use openai::map_openai_response;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    #[error("provider response is not a JSON object")]
    NotAnObject,
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
}

/// Fractional seconds to whole milliseconds, round-to-nearest. Absent values
/// map to 0.
pub(crate) fn to_ms(seconds: Option<f64>) -> i64 {
    (seconds.unwrap_or(0.0) * 1000.0).round() as i64
}

/// Like [`to_ms`] but with an explicit fallback anchor in seconds.
pub(crate) fn to_ms_or(seconds: Option<f64>, fallback_seconds: f64) -> i64 {
    (seconds.unwrap_or(fallback_seconds) * 1000.0).round() as i64
}

/// Vendor identifier fields arrive as strings or numbers depending on the
/// vendor and model (OpenAI segment ids are integers, Deepgram speaker tags
/// are integers under diarization). Numbers are stringified; any other type
/// maps to absent.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

pub(crate) fn ensure_object(raw: &Value) -> Result<(), MapperError> {
    if raw.is_object() {
        Ok(())
    } else {
        Err(MapperError::NotAnObject)
    }
}
