use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SubvoxError};

fn default_max_upload_bytes() -> usize {
    500 * 1024 * 1024
}

fn default_reset_link_base() -> String {
    "http://localhost:3000/reset-password".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub transcriber: TranscriberConfig,
    pub translate: TranslateConfig,
    pub media: MediaConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind the HTTP server to
    pub host: String,
    /// TCP port to listen on
    pub port: u16,
    /// Maximum accepted request body size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Path to the whisper-cpp CLI binary
    pub binary_path: String,
    /// Path to the ggml model file
    pub model_path: String,
    /// Language assumed when the engine detects nothing
    pub fallback_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Translation sidecar endpoint URL
    pub endpoint: String,
    /// Multilingual model served by the sidecar
    pub model: String,
    /// When true, a target language the model has no language token for is a
    /// per-segment error (the original text is kept). When false, the request
    /// falls back to unconstrained decoding, which may produce text in an
    /// unexpected language.
    #[serde(default)]
    pub strict_target_language: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Additional encoding options for subtitle burn-in
    /// Common options: ["-preset", "medium", "-crf", "23", "-pix_fmt", "yuv420p"]
    pub subtitle_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for uploaded videos and generated SRT files
    pub upload_dir: PathBuf,
    /// Directory for burned output videos
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// SQLite database file for the account store
    pub database_path: PathBuf,
    /// HS256 signing secret for bearer tokens
    pub jwt_secret: String,
    /// Bearer token lifetime in days
    pub jwt_expiry_days: i64,
    /// Password reset token lifetime in minutes
    pub reset_token_expiry_minutes: i64,
    /// Base URL of the frontend reset-password page
    #[serde(default = "default_reset_link_base")]
    pub reset_link_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                max_upload_bytes: default_max_upload_bytes(),
            },
            transcriber: TranscriberConfig {
                binary_path: "whisper-cli".to_string(),
                model_path: "models/ggml-small.bin".to_string(),
                fallback_language: "en".to_string(),
            },
            translate: TranslateConfig {
                endpoint: "http://localhost:8100".to_string(),
                model: "m2m100_418M".to_string(),
                strict_target_language: false,
            },
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                subtitle_options: vec![],
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("uploads"),
                output_dir: PathBuf::from("outputs"),
            },
            auth: AuthConfig {
                database_path: PathBuf::from("users.db"),
                jwt_secret: std::env::var("SUBVOX_JWT_SECRET")
                    .unwrap_or_else(|_| "change-me-in-production".to_string()),
                jwt_expiry_days: 7,
                reset_token_expiry_minutes: 60,
                reset_link_base: default_reset_link_base(),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubvoxError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SubvoxError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubvoxError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubvoxError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
