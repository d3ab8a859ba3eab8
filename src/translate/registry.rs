use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::TranslateConfig;
use super::{M2m100Engine, TranslationEngine};

/// Process-wide home of the translation engine.
///
/// The engine is expensive to stand up, so it is constructed at most once per
/// process and shared across requests; the cell serializes concurrent first
/// access. A failed load is memoized as unavailable for the rest of the
/// process lifetime, which downstream code reports as a degraded result
/// rather than an error.
pub struct ModelRegistry {
    engine: OnceCell<Option<Arc<dyn TranslationEngine>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self {
            engine: OnceCell::new(),
        }
    }

    /// Pre-seed the registry with a specific engine (tests, offline mode).
    pub fn with_engine(engine: Arc<dyn TranslationEngine>) -> Self {
        Self {
            engine: OnceCell::new_with(Some(Some(engine))),
        }
    }

    /// Pre-seed the registry as permanently unavailable.
    pub fn unavailable() -> Self {
        Self {
            engine: OnceCell::new_with(Some(None)),
        }
    }

    /// Get the shared engine, constructing it on first access.
    pub async fn get_or_init(&self, config: &TranslateConfig) -> Option<Arc<dyn TranslationEngine>> {
        self.engine
            .get_or_init(|| async {
                info!("Loading translation model '{}'", config.model);
                match M2m100Engine::connect(config.clone()).await {
                    Ok(engine) => {
                        info!("Translation model loaded successfully");
                        Some(Arc::new(engine) as Arc<dyn TranslationEngine>)
                    }
                    Err(e) => {
                        warn!("Failed to load translation model: {}", e);
                        None
                    }
                }
            })
            .await
            .clone()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
