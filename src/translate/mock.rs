//! Mock translation engine for testing.
//!
//! Simulates the `(text, source, target) -> text` contract deterministically:
//! fixed replies for known inputs, a tagged echo for everything else, and
//! optional per-text failures to exercise the keep-original policy.

use std::collections::{HashMap, HashSet};
use async_trait::async_trait;

use crate::error::{Result, SubvoxError};
use super::TranslationEngine;

#[derive(Debug, Default)]
pub struct MockEngine {
    replies: HashMap<String, String>,
    fail_on: HashSet<String>,
    supported: HashSet<String>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fixed translation for a source text.
    pub fn with_reply(mut self, text: &str, translation: &str) -> Self {
        self.replies.insert(text.to_string(), translation.to_string());
        self
    }

    /// Make translation of a specific source text fail.
    pub fn failing_on(mut self, text: &str) -> Self {
        self.fail_on.insert(text.to_string());
        self
    }

    /// Restrict the supported language set. An empty set (the default)
    /// supports everything.
    pub fn supporting<I: IntoIterator<Item = &'static str>>(mut self, codes: I) -> Self {
        self.supported = codes.into_iter().map(String::from).collect();
        self
    }
}

#[async_trait]
impl TranslationEngine for MockEngine {
    async fn translate(&self, text: &str, _source: &str, target: &str) -> Result<String> {
        if self.fail_on.contains(text) {
            return Err(SubvoxError::Translation(format!(
                "simulated failure for '{}'",
                text
            )));
        }

        if let Some(reply) = self.replies.get(text) {
            return Ok(reply.clone());
        }

        Ok(format!("[{}] {}", target, text))
    }

    fn supports(&self, code: &str) -> bool {
        self.supported.is_empty() || self.supported.contains(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    #[test]
    fn test_fixed_replies_and_echo() {
        let engine = MockEngine::new().with_reply("Hello", "Bonjour");

        assert_eq!(block_on(engine.translate("Hello", "en", "fr")).unwrap(), "Bonjour");
        assert_eq!(
            block_on(engine.translate("Other", "en", "fr")).unwrap(),
            "[fr] Other"
        );
    }

    #[test]
    fn test_simulated_failures() {
        let engine = MockEngine::new().failing_on("Bad");
        assert!(block_on(engine.translate("Bad", "en", "fr")).is_err());
    }

    #[test]
    fn test_supported_set_restricts_languages() {
        let engine = MockEngine::new().supporting(["en", "fr"]);
        assert!(engine.supports("fr"));
        assert!(!engine.supports("xx"));

        let open = MockEngine::new();
        assert!(open.supports("anything"));
    }
}
