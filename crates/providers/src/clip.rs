//! HTTP client for a CLIP-style zero-shot classification server.
//!
//! The server holds the model loaded once for its lifetime; this client
//! ships frame images as base64 and gets back one softmaxed probability
//! distribution per image.

use crate::{ImageClassifier, ProviderError, ScoreResponse};
use base64::Engine as _;
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct ClipServerConfig {
    pub base_url: String,
}

#[derive(Clone)]
pub struct ClipServerClient {
    client: Client,
    cfg: Arc<ClipServerConfig>,
}

impl ClipServerClient {
    pub fn new(cfg: ClipServerConfig) -> Self {
        Self {
            client: Client::new(),
            cfg: Arc::new(cfg),
        }
    }
}

#[derive(Deserialize)]
struct ClassifyApiResponse {
    probs: Vec<Vec<f32>>,
}

#[async_trait::async_trait]
impl ImageClassifier for ClipServerClient {
    async fn score(
        &self,
        images: &[PathBuf],
        labels: &[String],
    ) -> Result<ScoreResponse, ProviderError> {
        #[derive(serde::Serialize)]
        struct ClassifyRequest<'a> {
            images: Vec<String>,
            labels: &'a [String],
        }

        let mut encoded = Vec::with_capacity(images.len());
        for path in images {
            match tokio::fs::read(path).await {
                Ok(bytes) => {
                    encoded.push(base64::engine::general_purpose::STANDARD.encode(bytes))
                }
                Err(e) => warn!("skipping unreadable frame {}: {}", path.display(), e),
            }
        }
        if encoded.is_empty() {
            return Ok(ScoreResponse { probs: Vec::new() });
        }

        let body = ClassifyRequest {
            images: encoded,
            labels,
        };

        let resp = self
            .client
            .post(format!("{}/classify", self.cfg.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let parsed: ClassifyApiResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(ScoreResponse {
            probs: parsed.probs,
        })
    }
}
