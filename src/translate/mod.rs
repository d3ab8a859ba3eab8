// Segment translation stage
//
// The engine seam is a small trait so the pipeline can run against the real
// M2M100 sidecar client, or the deterministic mock, without caring which. The
// stage itself (`translate_all`) owns the degradation policy: a missing
// engine or a failed segment never fails the request, it just leaves the
// original text in place.

pub mod common;
pub mod mock;
pub mod registry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use common::*;
pub use registry::ModelRegistry;
use crate::error::Result;
use crate::transcribe::Segment;

/// Contract of a multilingual translation model.
#[async_trait]
pub trait TranslationEngine: Send + Sync {
    /// Translate one piece of text between two ISO-639-1 codes.
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;

    /// Whether the underlying model carries a language token for this code.
    fn supports(&self, code: &str) -> bool;
}

/// How the translation stage resolved for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStatus {
    /// Source and target languages matched; nothing to translate
    Skipped,
    /// Segments were translated (individually failed segments keep their
    /// original text)
    Translated,
    /// The engine was unavailable; original-language segments passed through
    Degraded,
}

/// Translate every segment from `source` to `target`.
///
/// Output preserves input order and count exactly. Timing fields are copied
/// verbatim; translation never alters them. `engine: None` means the model
/// could not be loaded, which degrades the result instead of failing it.
pub async fn translate_all(
    segments: Vec<Segment>,
    source: &str,
    target: &str,
    engine: Option<&dyn TranslationEngine>,
) -> (Vec<Segment>, TranslationStatus) {
    if source == target {
        info!("Source and target languages match; returning transcription as-is");
        return (segments, TranslationStatus::Skipped);
    }

    let Some(engine) = engine else {
        warn!("Translation engine unavailable; returning original transcription");
        return (segments, TranslationStatus::Degraded);
    };

    info!("Translating {} -> {}", source, target);

    let mut translated = Vec::with_capacity(segments.len());
    for segment in segments {
        let text = match engine.translate(&segment.text, source, target).await {
            Ok(translation) => translation.trim().to_string(),
            Err(e) => {
                // One bad segment never aborts the batch; keep the original.
                warn!("Translation failed ({} -> {}): {}", source, target, e);
                segment.text.clone()
            }
        };

        translated.push(Segment {
            start: segment.start,
            end: segment.end,
            text,
        });
    }

    info!("Translation complete: {} segment(s)", translated.len());
    (translated, TranslationStatus::Translated)
}
