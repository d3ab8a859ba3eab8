use std::collections::HashSet;
use std::time::Duration;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::TranslateConfig;
use crate::error::{Result, SubvoxError};
use super::TranslationEngine;

/// Encoder-side truncation limit, in tokens, applied by the sidecar.
pub const MAX_INPUT_TOKENS: usize = 1024;

/// Language codes the M2M100 family carries target-language tokens for.
static M2M100_LANGUAGES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "af", "am", "ar", "ast", "az", "ba", "be", "bg", "bn", "br", "bs",
        "ca", "ceb", "cs", "cy", "da", "de", "el", "en", "es", "et", "fa",
        "ff", "fi", "fr", "fy", "ga", "gd", "gl", "gu", "ha", "he", "hi",
        "hr", "ht", "hu", "hy", "id", "ig", "ilo", "is", "it", "ja", "jv",
        "ka", "kk", "km", "kn", "ko", "lb", "lg", "ln", "lo", "lt", "lv",
        "mg", "mk", "ml", "mn", "mr", "ms", "my", "ne", "nl", "no", "ns",
        "oc", "or", "pa", "pl", "ps", "pt", "ro", "ru", "sd", "si", "sk",
        "sl", "so", "sq", "sr", "ss", "su", "sv", "sw", "ta", "th", "tl",
        "tn", "tr", "uk", "ur", "uz", "vi", "wo", "xh", "yi", "yo", "zh",
        "zu",
    ])
});

#[derive(Debug, Clone, Serialize)]
struct TranslationRequest<'a> {
    model: &'a str,
    text: &'a str,
    source_lang: &'a str,
    /// Forced target-language token; omitted to let the model decode
    /// unconstrained
    #[serde(skip_serializing_if = "Option::is_none")]
    target_lang: Option<&'a str>,
    max_length: usize,
    skip_special_tokens: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct TranslationResponse {
    translation: String,
}

/// HTTP client for a local M2M100-style inference sidecar.
pub struct M2m100Engine {
    client: Client,
    config: TranslateConfig,
}

impl M2m100Engine {
    /// Build a client and confirm the sidecar has the model loaded. Failing
    /// here is how the registry learns the engine is unavailable.
    pub async fn connect(config: TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| SubvoxError::Translation(format!("HTTP client creation failed: {}", e)))?;

        let engine = Self { client, config };
        engine.check_availability().await?;
        Ok(engine)
    }

    /// Check that the sidecar is reachable and serving the configured model.
    pub async fn check_availability(&self) -> Result<()> {
        let url = format!(
            "{}/api/models/{}",
            self.config.endpoint, self.config.model
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                SubvoxError::Translation(format!("Failed to connect to translation sidecar: {}", e))
            })?;

        if response.status().is_success() {
            info!("Translation model '{}' is available", self.config.model);
            Ok(())
        } else {
            Err(SubvoxError::Translation(format!(
                "Translation model '{}' not loaded on {}",
                self.config.model, self.config.endpoint
            )))
        }
    }
}

#[async_trait]
impl TranslationEngine for M2m100Engine {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let target_lang = if self.supports(target) {
            Some(target)
        } else if self.config.strict_target_language {
            return Err(SubvoxError::Translation(format!(
                "Target language '{}' not supported by {}",
                target, self.config.model
            )));
        } else {
            warn!(
                "Target language '{}' not found in {}; using default decoding",
                target, self.config.model
            );
            None
        };

        let request = TranslationRequest {
            model: &self.config.model,
            text,
            source_lang: source,
            target_lang,
            max_length: MAX_INPUT_TOKENS,
            skip_special_tokens: true,
        };

        let url = format!("{}/api/translate", self.config.endpoint);
        debug!("Sending translation request to: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SubvoxError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SubvoxError::Translation(format!(
                "Translation sidecar error {}: {}",
                status, error_text
            )));
        }

        let translation_response: TranslationResponse = response
            .json()
            .await
            .map_err(|e| SubvoxError::Translation(format!("Failed to parse response: {}", e)))?;

        let translated = translation_response.translation.trim().to_string();

        if translated.is_empty() {
            return Err(SubvoxError::Translation(
                "Empty translation received".to_string(),
            ));
        }

        Ok(translated)
    }

    fn supports(&self, code: &str) -> bool {
        M2M100_LANGUAGES.contains(code)
    }
}
