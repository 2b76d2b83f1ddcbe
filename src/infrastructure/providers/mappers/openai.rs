use serde::Deserialize;
use serde_json::Value;

use crate::application::ports::{SegmentResult, SpeakerResult, TranscriptionResult};
use crate::domain::WordTiming;

use super::{MapperError, ensure_object, lenient_string, to_ms_or};

#[derive(Debug, Default, Deserialize)]
struct OpenAiResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    overall_confidence: Option<f64>,
    #[serde(default)]
    segments: Vec<OpenAiSegment>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAiSegment {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    speaker: Option<String>,
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    end: Option<f64>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    words: Vec<OpenAiWord>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAiWord {
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    end: Option<f64>,
    #[serde(default)]
    word: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Maps the verbose-json `segments` array in document order. A segment
/// without an explicit speaker falls back to its own `id`, then to a
/// synthetic `speaker_<index+1>`. Word text arrives as `word` or `text`
/// depending on the model.
pub fn map_openai_response(raw: &Value) -> Result<TranscriptionResult, MapperError> {
    ensure_object(raw)?;
    let response: OpenAiResponse = serde_json::from_value(raw.clone())
        .map_err(|e| MapperError::UnexpectedShape(e.to_string()))?;

    let segments: Vec<SegmentResult> = response
        .segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            let start_seconds = segment.start.unwrap_or(0.0);

            let words: Vec<WordTiming> = segment
                .words
                .iter()
                .map(|word| WordTiming {
                    start_ms: to_ms_or(word.start, start_seconds),
                    end_ms: to_ms_or(word.end, word.start.unwrap_or(start_seconds)),
                    text: word
                        .word
                        .clone()
                        .or_else(|| word.text.clone())
                        .unwrap_or_default(),
                    confidence: word.confidence,
                })
                .collect();

            SegmentResult {
                speaker_key: segment
                    .speaker
                    .clone()
                    .or_else(|| segment.id.clone())
                    .unwrap_or_else(|| format!("speaker_{}", index + 1)),
                start_ms: to_ms_or(segment.start, 0.0),
                end_ms: to_ms_or(segment.end, start_seconds),
                text: segment.text.clone().unwrap_or_default(),
                confidence: segment.confidence,
                words: if words.is_empty() { None } else { Some(words) },
            }
        })
        .collect();

    let mut speakers: Vec<SpeakerResult> = Vec::new();
    for segment in &segments {
        if !speakers
            .iter()
            .any(|speaker| speaker.speaker_key == segment.speaker_key)
        {
            speakers.push(SpeakerResult {
                speaker_key: segment.speaker_key.clone(),
                display_name: format!("Speaker {}", speakers.len() + 1),
            });
        }
    }

    Ok(TranscriptionResult {
        external_job_id: response.id,
        language: response.language,
        duration_seconds: response.duration,
        confidence: response.overall_confidence,
        segments,
        speakers,
        metadata: Some(raw.clone()),
    })
}
