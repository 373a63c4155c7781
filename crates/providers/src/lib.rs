//! Provider abstractions for zero-shot image classification backends.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub mod clip;
pub mod noop;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("not implemented")]
    NotImplemented,
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

/// One probability distribution per scored image, one column per
/// candidate label. The backend applies the softmax; callers own any
/// cross-image aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub probs: Vec<Vec<f32>>,
}

#[async_trait::async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Scores every candidate label against each image. Images that
    /// cannot be read may be silently dropped, so the number of rows
    /// can be smaller than `images.len()` (possibly zero).
    async fn score(
        &self,
        images: &[PathBuf],
        labels: &[String],
    ) -> Result<ScoreResponse, ProviderError>;
}

#[derive(Default, Clone)]
pub struct ClassifierRegistry {
    classifiers: HashMap<String, Arc<dyn ImageClassifier>>,
    pub preferred: Option<String>,
}

impl ClassifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classifier(mut self, name: &str, provider: Arc<dyn ImageClassifier>) -> Self {
        self.classifiers.insert(name.to_string(), provider);
        self
    }

    pub fn set_preferred(mut self, name: &str) -> Self {
        self.preferred = Some(name.to_string());
        self
    }

    pub fn classifier(&self, name: Option<&str>) -> Result<Arc<dyn ImageClassifier>, ProviderError> {
        let key = name
            .map(str::to_string)
            .or_else(|| self.preferred.clone())
            .ok_or_else(|| {
                ProviderError::UnknownProvider("no classifier provider configured".into())
            })?;
        self.classifiers
            .get(&key)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownProvider(key))
    }
}
