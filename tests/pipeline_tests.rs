//! Pipeline behavior tests: translation laws, degradation policy, and the
//! end-to-end transcribe/translate/assemble path over a stub transcriber.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use subvox::config::TranslateConfig;
use subvox::error::Result;
use subvox::pipeline::Pipeline;
use subvox::transcribe::{Segment, Transcriber, Transcript};
use subvox::translate::mock::MockEngine;
use subvox::translate::{self, ModelRegistry, TranslationStatus};

/// Transcriber stub that returns a canned transcript. The language hint wins
/// over the canned language, mirroring the real engine contract.
struct StaticTranscriber {
    language: String,
    segments: Vec<Segment>,
}

#[async_trait]
impl Transcriber for StaticTranscriber {
    async fn transcribe(&self, _audio_path: &Path, language: Option<&str>) -> Result<Transcript> {
        Ok(Transcript {
            segments: self.segments.clone(),
            language: language.unwrap_or(&self.language).to_string(),
        })
    }
}

fn sample_segments() -> Vec<Segment> {
    vec![
        Segment {
            start: 0.0,
            end: 4.2,
            text: "Good morning.".to_string(),
        },
        Segment {
            start: 4.2,
            end: 9.8,
            text: "How are you?".to_string(),
        },
    ]
}

fn translate_config() -> TranslateConfig {
    TranslateConfig {
        endpoint: "http://localhost:8100".to_string(),
        model: "m2m100_418M".to_string(),
        strict_target_language: false,
    }
}

fn pipeline_with(registry: ModelRegistry, language: &str) -> Pipeline {
    Pipeline::new(
        Box::new(StaticTranscriber {
            language: language.to_string(),
            segments: sample_segments(),
        }),
        Arc::new(registry),
        translate_config(),
    )
}

#[tokio::test]
async fn translate_all_is_identity_when_languages_match() {
    let engine = MockEngine::new();
    let segments = sample_segments();

    let (out, status) =
        translate::translate_all(segments.clone(), "en", "en", Some(&engine)).await;

    assert_eq!(status, TranslationStatus::Skipped);
    assert_eq!(out, segments);
}

#[tokio::test]
async fn translate_all_preserves_length_under_segment_failures() {
    let engine = MockEngine::new().failing_on("How are you?");
    let segments = sample_segments();

    let (out, status) = translate::translate_all(segments.clone(), "en", "fr", Some(&engine)).await;

    assert_eq!(status, TranslationStatus::Translated);
    assert_eq!(out.len(), segments.len());
    // The failed segment keeps its original text; the other is translated.
    assert_eq!(out[0].text, "[fr] Good morning.");
    assert_eq!(out[1].text, "How are you?");
    // Timing is copied verbatim either way.
    assert_eq!(out[0].start, segments[0].start);
    assert_eq!(out[1].end, segments[1].end);
}

#[tokio::test]
async fn translate_all_degrades_without_an_engine() {
    let segments = sample_segments();

    let (out, status) = translate::translate_all(segments.clone(), "en", "fr", None).await;

    assert_eq!(status, TranslationStatus::Degraded);
    assert_eq!(out, segments);
}

#[tokio::test]
async fn pipeline_translates_end_to_end() {
    let engine = MockEngine::new()
        .with_reply("Good morning.", "Bonjour.")
        .with_reply("How are you?", "Comment allez-vous ?");
    let pipeline = pipeline_with(ModelRegistry::with_engine(Arc::new(engine)), "en");

    let result = pipeline
        .run(Path::new("clip.wav"), "french", None)
        .await
        .expect("pipeline should succeed");

    assert_eq!(result.source_language, "en");
    assert_eq!(result.target_language, "fr");
    assert_eq!(result.status, TranslationStatus::Translated);
    assert_eq!(result.segments.len(), 2);
    assert_eq!(result.segments[0].text, "Bonjour.");
    assert_eq!(result.segments[1].text, "Comment allez-vous ?");
    // Original timings preserved through translation.
    assert_eq!(result.segments[0].start, 0.0);
    assert_eq!(result.segments[1].end, 9.8);

    let cues = result.to_cues();
    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].index, 1);
    assert_eq!(cues[1].index, 2);
    assert!(cues.iter().all(|cue| cue.start < cue.end));

    let records = result.to_records();
    assert_eq!(records[0].time, "00:00:00,000 --> 00:00:04,200");
}

#[tokio::test]
async fn pipeline_skips_translation_for_matching_languages() {
    // Registry left uninitialized: the skip path must never touch it.
    let pipeline = pipeline_with(ModelRegistry::unavailable(), "en");

    let result = pipeline
        .run(Path::new("clip.wav"), "english", None)
        .await
        .expect("pipeline should succeed");

    assert_eq!(result.status, TranslationStatus::Skipped);
    assert_eq!(result.segments[0].text, "Good morning.");
}

#[tokio::test]
async fn pipeline_degrades_when_model_is_unavailable() {
    let pipeline = pipeline_with(ModelRegistry::unavailable(), "en");

    let result = pipeline
        .run(Path::new("clip.wav"), "french", None)
        .await
        .expect("degradation must not fail the request");

    assert_eq!(result.status, TranslationStatus::Degraded);
    assert_eq!(result.segments[0].text, "Good morning.");
    assert_eq!(result.segments.len(), 2);
}

#[tokio::test]
async fn pipeline_resolves_source_hint_over_detection() {
    let engine = MockEngine::new();
    let pipeline = pipeline_with(ModelRegistry::with_engine(Arc::new(engine)), "en");

    let result = pipeline
        .run(Path::new("clip.wav"), "english", Some(" Hindi "))
        .await
        .expect("pipeline should succeed");

    // The hint overrides whisper's detection, so hi != en forces translation.
    assert_eq!(result.source_language, "hi");
    assert_eq!(result.status, TranslationStatus::Translated);
    assert_eq!(result.segments[0].text, "[en] Good morning.");
}
