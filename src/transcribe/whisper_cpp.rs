use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::TranscriberConfig;
use crate::error::{Result, SubvoxError};
use super::{Transcriber, Transcript, WhisperCppOutput};

/// Beam search width for decoding. Fixed tuning constant; wider beams buy
/// little accuracy on CPU at a large latency cost.
const BEAM_SIZE: u32 = 5;

/// Transcriber backed by the whisper-cpp CLI.
pub struct WhisperCppTranscriber {
    config: TranscriberConfig,
}

impl WhisperCppTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Transcriber for WhisperCppTranscriber {
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Transcript> {
        info!("Transcribing audio: {}", audio_path.display());

        // whisper-cli writes its JSON next to the requested output base
        let temp_dir = tempfile::tempdir()
            .map_err(|e| SubvoxError::Transcriber(format!("Failed to create temp directory: {}", e)))?;
        let output_base = temp_dir.path().join("transcript");

        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg("-m").arg(&self.config.model_path)
            .arg("-f").arg(audio_path)
            .arg("-bs").arg(BEAM_SIZE.to_string())
            .arg("-oj")
            .arg("-of").arg(&output_base)
            .arg("-l").arg(language.unwrap_or("auto"));

        debug!("Executing whisper command: {:?}", cmd);

        let output = cmd
            .output()
            .await
            .map_err(|e| SubvoxError::Transcriber(format!("Failed to execute whisper: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubvoxError::Transcriber(format!(
                "Whisper failed: {}",
                stderr
            )));
        }

        let json_file = output_base.with_extension("json");
        let json_content = tokio::fs::read_to_string(&json_file)
            .await
            .map_err(|e| SubvoxError::Transcriber(format!("Failed to read output: {}", e)))?;

        let whisper_output: WhisperCppOutput = serde_json::from_str(&json_content)
            .map_err(|e| SubvoxError::Transcriber(format!("Failed to parse whisper JSON: {}", e)))?;

        let mut transcript = Transcript::from(whisper_output);

        // An explicit hint wins over whatever the engine detected; absent
        // both, fall back to the configured default.
        if let Some(lang) = language {
            transcript.language = lang.to_string();
        } else if transcript.language.is_empty() || transcript.language == "auto" {
            transcript.language = self.config.fallback_language.clone();
        }

        info!(
            "Transcription completed: {} segments, language '{}'",
            transcript.segments.len(),
            transcript.language
        );

        Ok(transcript)
    }
}
