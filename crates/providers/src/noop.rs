use crate::{ImageClassifier, ProviderError, ScoreResponse};
use std::path::PathBuf;

/// Scores nothing. Keeps the catalog usable with tagging effectively
/// disabled when no classification backend is configured.
#[derive(Debug, Default)]
pub struct NoopClassifier;

#[async_trait::async_trait]
impl ImageClassifier for NoopClassifier {
    async fn score(
        &self,
        _images: &[PathBuf],
        _labels: &[String],
    ) -> Result<ScoreResponse, ProviderError> {
        Ok(ScoreResponse { probs: Vec::new() })
    }
}
