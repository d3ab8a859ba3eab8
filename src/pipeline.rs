//! Pipeline orchestrator.
//!
//! One pass per request, no branching back:
//! transcribe, then skip, translate, or degrade, then hand the segments to
//! the subtitle assembler. Transcription failure aborts the request; nothing
//! downstream of it does.

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::TranslateConfig;
use crate::error::Result;
use crate::lang;
use crate::subtitle::{self, CueSource, SubtitleCue, SubtitleInput, SubtitleRecord};
use crate::transcribe::{Segment, Transcriber};
use crate::translate::{self, ModelRegistry, TranslationStatus};

/// Outcome of a pipeline pass: the (possibly translated) segments plus how
/// the translation stage resolved.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub segments: Vec<Segment>,
    pub source_language: String,
    pub target_language: String,
    pub status: TranslationStatus,
}

impl PipelineResult {
    /// Assemble the segments into subtitle cues (timed mode).
    pub fn to_cues(&self) -> Vec<SubtitleCue> {
        let sources = self
            .segments
            .iter()
            .map(|segment| CueSource {
                text: segment.text.clone(),
                start: Some(segment.start),
                end: Some(segment.end),
            })
            .collect();

        subtitle::assemble(SubtitleInput::Timed(sources))
    }

    /// Structured records for API responses.
    pub fn to_records(&self) -> Vec<SubtitleRecord> {
        self.to_cues().iter().map(SubtitleRecord::from).collect()
    }
}

pub struct Pipeline {
    transcriber: Box<dyn Transcriber>,
    registry: Arc<ModelRegistry>,
    translate_config: TranslateConfig,
}

impl Pipeline {
    pub fn new(
        transcriber: Box<dyn Transcriber>,
        registry: Arc<ModelRegistry>,
        translate_config: TranslateConfig,
    ) -> Self {
        Self {
            transcriber,
            registry,
            translate_config,
        }
    }

    /// Transcribe without translating. The hint, when given, is resolved and
    /// overrides language detection just as in `run`.
    pub async fn transcribe(
        &self,
        audio_path: &Path,
        source_hint: Option<&str>,
    ) -> Result<crate::transcribe::Transcript> {
        let hint_code = source_hint.map(lang::resolve);
        self.transcriber
            .transcribe(audio_path, hint_code.as_deref())
            .await
    }

    /// Run the transcription/translation pipeline over an extracted audio
    /// file.
    ///
    /// `target_language` and the optional `source_hint` accept names or codes;
    /// both are resolved before use. A hint overrides the engine's language
    /// detection unconditionally.
    pub async fn run(
        &self,
        audio_path: &Path,
        target_language: &str,
        source_hint: Option<&str>,
    ) -> Result<PipelineResult> {
        let target_code = lang::resolve(target_language);
        let hint_code = source_hint.map(lang::resolve);

        info!(
            "Pipeline start: target '{}' ({})",
            target_language, target_code
        );

        let transcript = self
            .transcriber
            .transcribe(audio_path, hint_code.as_deref())
            .await?;
        let source_code = transcript.language.clone();

        info!("Source language: {}", source_code);

        // Don't touch the registry when no translation is needed; the model
        // stays unloaded for same-language requests.
        if source_code == target_code {
            return Ok(PipelineResult {
                segments: transcript.segments,
                source_language: source_code,
                target_language: target_code,
                status: TranslationStatus::Skipped,
            });
        }

        let engine = self.registry.get_or_init(&self.translate_config).await;
        let (segments, status) = translate::translate_all(
            transcript.segments,
            &source_code,
            &target_code,
            engine.as_deref(),
        )
        .await;

        Ok(PipelineResult {
            segments,
            source_language: source_code,
            target_language: target_code,
            status,
        })
    }
}
