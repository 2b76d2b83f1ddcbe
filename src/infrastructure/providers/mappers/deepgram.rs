use serde::Deserialize;
use serde_json::Value;

use crate::application::ports::{SegmentResult, SpeakerResult, TranscriptionResult};

use super::{MapperError, ensure_object, lenient_string, to_ms};

#[derive(Debug, Default, Deserialize)]
struct DeepgramResponse {
    #[serde(default)]
    results: Option<DeepgramResults>,
    #[serde(default)]
    metadata: Option<DeepgramMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct DeepgramResults {
    #[serde(default)]
    channels: Vec<DeepgramChannel>,
}

#[derive(Debug, Default, Deserialize)]
struct DeepgramChannel {
    #[serde(default)]
    alternatives: Vec<DeepgramAlternative>,
}

#[derive(Debug, Default, Deserialize)]
struct DeepgramAlternative {
    #[serde(default)]
    paragraphs: Option<DeepgramParagraphsWrapper>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct DeepgramParagraphsWrapper {
    #[serde(default)]
    paragraphs: Vec<DeepgramParagraph>,
}

#[derive(Debug, Default, Deserialize)]
struct DeepgramParagraph {
    #[serde(default)]
    sentences: Vec<DeepgramSentence>,
}

#[derive(Debug, Default, Deserialize)]
struct DeepgramSentence {
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
}

#[derive(Debug, Default, Deserialize)]
struct DeepgramMetadata {
    #[serde(default, deserialize_with = "lenient_string")]
    request_id: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

/// Flattens `results.channels[0].alternatives[0].paragraphs.paragraphs[*]
/// .sentences[*]` in document order. Sentences without an explicit speaker
/// tag get a composite synthetic key `speaker_<paragraph>_<sentence>`.
/// Deepgram supplies no word-level timings through this shape.
pub fn map_deepgram_response(raw: &Value) -> Result<TranscriptionResult, MapperError> {
    ensure_object(raw)?;
    let response: DeepgramResponse = serde_json::from_value(raw.clone())
        .map_err(|e| MapperError::UnexpectedShape(e.to_string()))?;

    let alternative = response
        .results
        .as_ref()
        .and_then(|results| results.channels.first())
        .and_then(|channel| channel.alternatives.first());

    let mut segments = Vec::new();
    if let Some(wrapper) = alternative.and_then(|alt| alt.paragraphs.as_ref()) {
        for (paragraph_index, paragraph) in wrapper.paragraphs.iter().enumerate() {
            for (sentence_index, sentence) in paragraph.sentences.iter().enumerate() {
                let speaker_key = sentence.speaker.clone().unwrap_or_else(|| {
                    format!("speaker_{}_{}", paragraph_index, sentence_index)
                });
                segments.push(SegmentResult {
                    speaker_key,
                    start_ms: to_ms(sentence.start),
                    end_ms: to_ms(sentence.end.or(sentence.start)),
                    text: sentence
                        .text
                        .as_deref()
                        .map(str::trim)
                        .unwrap_or_default()
                        .to_string(),
                    confidence: sentence.confidence,
                    words: None,
                });
            }
        }
    }

    // First-appearance enumeration. A speaker first seen on an empty-text
    // sentence keeps its raw key as the display name.
    let mut speakers: Vec<SpeakerResult> = Vec::new();
    for segment in &segments {
        if speakers
            .iter()
            .any(|speaker| speaker.speaker_key == segment.speaker_key)
        {
            continue;
        }
        let display_name = if segment.text.is_empty() {
            segment.speaker_key.clone()
        } else {
            format!("Speaker {}", speakers.len() + 1)
        };
        speakers.push(SpeakerResult {
            speaker_key: segment.speaker_key.clone(),
            display_name,
        });
    }

    Ok(TranscriptionResult {
        external_job_id: response
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.request_id.clone()),
        language: alternative.and_then(|alt| alt.language.clone()),
        duration_seconds: response
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.duration),
        confidence: alternative.and_then(|alt| alt.confidence),
        segments,
        speakers,
        // Only the vendor's metadata section is worth keeping; the full
        // response duplicates every sentence already persisted as segments.
        metadata: raw.get("metadata").cloned(),
    })
}
