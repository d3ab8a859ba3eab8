use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, SubvoxError};
use crate::media::{MediaProcessor, MediaProcessorFactory};
use crate::pipeline::Pipeline;
use crate::subtitle::{self, SubtitleRecord};
use crate::transcribe::TranscriberFactory;
use crate::translate::{ModelRegistry, TranslationStatus};

/// What a processed request hands back to its caller. `burn_error` is the
/// best-effort channel: a failed burn never invalidates the subtitles that
/// were already produced.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub subtitles: Vec<SubtitleRecord>,
    pub translation: TranslationStatus,
    pub srt_file: String,
    pub burned_video: Option<String>,
    pub burn_error: Option<String>,
}

/// Per-request lifecycle driver shared by the HTTP server and the CLI:
/// extract audio, run the pipeline, write the SRT, optionally burn.
pub struct Workflow {
    config: Config,
    pipeline: Pipeline,
    media: Box<dyn MediaProcessor>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let transcriber = TranscriberFactory::create_default(config.transcriber.clone());
        let registry = Arc::new(ModelRegistry::new());
        let pipeline = Pipeline::new(transcriber, registry, config.translate.clone());
        let media = MediaProcessorFactory::create_processor(config.media.clone());

        // Check dependencies
        media.check_availability()?;

        std::fs::create_dir_all(&config.storage.upload_dir)?;
        std::fs::create_dir_all(&config.storage.output_dir)?;

        Ok(Self {
            config,
            pipeline,
            media,
        })
    }

    /// Process a video file already on disk into subtitles, and optionally a
    /// burned copy. Intermediate and output artifacts are named after the
    /// video's file stem.
    pub async fn process_video(
        &self,
        video_path: &Path,
        target_language: &str,
        source_hint: Option<&str>,
        burn: bool,
    ) -> Result<ProcessOutcome> {
        info!("Processing video: {}", video_path.display());

        if !video_path.exists() {
            return Err(SubvoxError::FileNotFound(video_path.display().to_string()));
        }

        let file_stem = video_path
            .file_stem()
            .ok_or_else(|| SubvoxError::InvalidRequest("Invalid video filename".to_string()))?
            .to_string_lossy()
            .to_string();

        let audio_path = self.upload_path(&format!("{}.wav", file_stem));
        let srt_path = self.upload_path(&format!("{}.srt", file_stem));

        // Step 1: extract audio; failure here aborts the request
        self.media.extract_audio(video_path, &audio_path).await?;

        // Step 2: transcribe and translate
        let result = self
            .pipeline
            .run(&audio_path, target_language, source_hint)
            .await;

        // The intermediate audio has served its purpose either way.
        let _ = fs::remove_file(&audio_path).await;
        let result = result?;

        // Step 3: assemble and write the SRT
        let cues = result.to_cues();
        subtitle::write_srt(&cues, &srt_path).await?;

        let mut outcome = ProcessOutcome {
            subtitles: result.to_records(),
            translation: result.status,
            srt_file: basename(&srt_path),
            burned_video: None,
            burn_error: None,
        };

        // Step 4: optionally burn subtitles into the video
        if burn {
            let output_path = self
                .config
                .storage
                .output_dir
                .join(format!("{}_final.mp4", file_stem));

            match self
                .media
                .burn_subtitles(video_path, &srt_path, &output_path)
                .await
            {
                Ok(()) => outcome.burned_video = Some(basename(&output_path)),
                Err(e) => {
                    warn!("Subtitle burn-in failed: {}", e);
                    outcome.burn_error = Some(e.to_string());
                }
            }
        }

        Ok(outcome)
    }

    /// Extract audio from a video file (CLI helper).
    pub async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        self.media.extract_audio(video_path, audio_path).await
    }

    /// Transcribe an audio file straight to an SRT (CLI helper; no
    /// translation).
    pub async fn transcribe_audio(
        &self,
        audio_path: &Path,
        output_path: &Path,
        language: Option<&str>,
    ) -> Result<()> {
        let transcript = self.pipeline.transcribe(audio_path, language).await?;

        let sources = transcript
            .segments
            .iter()
            .map(|segment| subtitle::CueSource {
                text: segment.text.clone(),
                start: Some(segment.start),
                end: Some(segment.end),
            })
            .collect();
        let cues = subtitle::assemble(subtitle::SubtitleInput::Timed(sources));

        subtitle::write_srt(&cues, output_path).await
    }

    /// Burn a subtitle file into a video (CLI helper).
    pub async fn burn_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        self.media
            .burn_subtitles(video_path, subtitle_path, output_path)
            .await
    }

    pub fn upload_dir(&self) -> &Path {
        &self.config.storage.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.storage.output_dir
    }

    fn upload_path(&self, name: &str) -> PathBuf {
        self.config.storage.upload_dir.join(name)
    }
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
