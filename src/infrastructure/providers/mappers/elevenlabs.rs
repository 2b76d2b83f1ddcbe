use serde::Deserialize;
use serde_json::Value;

use crate::application::ports::{SegmentResult, SpeakerResult, TranscriptionResult};
use crate::domain::WordTiming;

use super::{MapperError, ensure_object, lenient_string, to_ms_or};

#[derive(Debug, Default, Deserialize)]
struct ElevenLabsResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default)]
    transcript: Option<ElevenLabsTranscript>,
}

#[derive(Debug, Default, Deserialize)]
struct ElevenLabsTranscript {
    #[serde(default)]
    utterances: Vec<ElevenLabsUtterance>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    confidence: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ElevenLabsUtterance {
    #[serde(default, deserialize_with = "lenient_string")]
    speaker: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    user_id: Option<String>,
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    end: Option<f64>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    words: Vec<ElevenLabsWord>,
}

#[derive(Debug, Default, Deserialize)]
struct ElevenLabsWord {
    #[serde(default)]
    start: Option<f64>,
    #[serde(default)]
    end: Option<f64>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Maps the flat `transcript.utterances` array in document order. Speaker key
/// falls back from `speaker` to `user_id` to a synthetic `speaker_<index+1>`.
/// Word timings anchor to the utterance start when their own times are
/// missing.
pub fn map_elevenlabs_response(raw: &Value) -> Result<TranscriptionResult, MapperError> {
    ensure_object(raw)?;
    let response: ElevenLabsResponse = serde_json::from_value(raw.clone())
        .map_err(|e| MapperError::UnexpectedShape(e.to_string()))?;

    let transcript = response.transcript.unwrap_or_default();

    let segments: Vec<SegmentResult> = transcript
        .utterances
        .iter()
        .enumerate()
        .map(|(index, utterance)| {
            let speaker_key = utterance
                .speaker
                .clone()
                .or_else(|| utterance.user_id.clone())
                .unwrap_or_else(|| format!("speaker_{}", index + 1));
            let start_seconds = utterance.start.unwrap_or(0.0);
            let end_seconds = utterance.end.unwrap_or(start_seconds);

            let words: Vec<WordTiming> = utterance
                .words
                .iter()
                .map(|word| WordTiming {
                    start_ms: to_ms_or(word.start, start_seconds),
                    end_ms: to_ms_or(word.end, word.start.unwrap_or(start_seconds)),
                    text: word.text.clone().unwrap_or_default(),
                    confidence: word.confidence,
                })
                .collect();

            SegmentResult {
                speaker_key,
                start_ms: to_ms_or(utterance.start, 0.0),
                end_ms: to_ms_or(utterance.end, start_seconds),
                text: utterance.text.clone().unwrap_or_default(),
                confidence: utterance.confidence,
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
        language: transcript.language,
        duration_seconds: transcript.duration,
        confidence: transcript.confidence,
        segments,
        speakers,
        metadata: Some(raw.clone()),
    })
}
