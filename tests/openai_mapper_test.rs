use serde_json::json;

use murmure::infrastructure::providers::mappers::map_openai_response;

#[test]
fn given_empty_response_when_mapping_then_returns_no_segments() {
    let raw = json!({});

    let result = map_openai_response(&raw).unwrap();

    assert!(result.segments.is_empty());
    assert!(result.speakers.is_empty());
    assert_eq!(result.metadata, Some(json!({})));
}

#[test]
fn given_verbose_json_when_mapping_then_converts_segments_and_words() {
    let raw = json!({
        "id": "transcr_42",
        "language": "en",
        "duration": 7.25,
        "overall_confidence": 0.93,
        "segments": [{
            "id": "seg_0",
            "speaker": "alice",
            "start": 0.0,
            "end": 3.5,
            "text": "Good morning everyone",
            "confidence": 0.95,
            "words": [
                {"start": 0.0, "end": 0.6, "word": "Good"},
                {"start": 0.6, "end": 1.4, "word": "morning"},
                {"start": 1.4, "end": 3.5, "word": "everyone", "confidence": 0.9},
            ]
        }]
    });

    let result = map_openai_response(&raw).unwrap();

    assert_eq!(result.external_job_id.as_deref(), Some("transcr_42"));
    assert_eq!(result.language.as_deref(), Some("en"));
    assert_eq!(result.duration_seconds, Some(7.25));
    assert_eq!(result.confidence, Some(0.93));

    let segment = &result.segments[0];
    assert_eq!(segment.speaker_key, "alice");
    assert_eq!(segment.start_ms, 0);
    assert_eq!(segment.end_ms, 3500);
    assert_eq!(segment.confidence, Some(0.95));

    let words = segment.words.as_ref().unwrap();
    assert_eq!(words.len(), 3);
    assert_eq!(words[1].text, "morning");
    assert_eq!((words[2].start_ms, words[2].end_ms), (1400, 3500));
}

#[test]
fn given_word_text_under_text_field_when_mapping_then_still_extracts_it() {
    let raw = json!({
        "segments": [{
            "speaker": "a",
            "start": 0.0,
            "end": 1.0,
            "text": "hi",
            "words": [{"start": 0.0, "end": 1.0, "text": "hi"}]
        }]
    });

    let result = map_openai_response(&raw).unwrap();

    assert_eq!(result.segments[0].words.as_ref().unwrap()[0].text, "hi");
}

#[test]
fn given_missing_speaker_when_mapping_then_falls_back_to_id_then_index() {
    let raw = json!({
        "segments": [
            {"id": "seg_a", "start": 0.0, "end": 1.0, "text": "one"},
            {"start": 1.0, "end": 2.0, "text": "two"},
        ]
    });

    let result = map_openai_response(&raw).unwrap();

    assert_eq!(result.segments[0].speaker_key, "seg_a");
    assert_eq!(result.segments[1].speaker_key, "speaker_2");
    assert_eq!(result.speakers[0].display_name, "Speaker 1");
    assert_eq!(result.speakers[1].display_name, "Speaker 2");
}

#[test]
fn given_integer_segment_ids_when_mapping_then_stringifies_them() {
    let raw = json!({
        "segments": [
            {"id": 0, "start": 1.0, "end": 2.0, "text": "hi"},
            {"id": 1, "speaker": 3, "start": 2.0, "end": 3.0, "text": "there"},
        ]
    });

    let result = map_openai_response(&raw).unwrap();

    assert_eq!(result.segments[0].speaker_key, "0");
    // An explicit speaker tag still wins over the segment id.
    assert_eq!(result.segments[1].speaker_key, "3");
}

#[test]
fn given_segment_without_end_when_mapping_then_end_falls_back_to_start() {
    let raw = json!({
        "segments": [{"speaker": "a", "start": 4.0, "text": "open ended"}]
    });

    let result = map_openai_response(&raw).unwrap();

    assert_eq!(result.segments[0].start_ms, 4000);
    assert_eq!(result.segments[0].end_ms, 4000);
}
