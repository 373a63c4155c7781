//! Calling contract for the classification boundary: per-image label
//! distributions from the provider, arithmetic-mean aggregation here.

use providers::ClassifierRegistry;
use std::path::PathBuf;

/// Built-in candidate label vocabulary, used when config supplies none.
pub const DEFAULT_LABELS: &[&str] = &[
    "indoor",
    "outdoor",
    "person",
    "landscape",
    "urban",
    "nature",
    "close-up",
    "group",
    "action",
];

pub fn default_labels() -> Vec<String> {
    DEFAULT_LABELS.iter().map(|s| s.to_string()).collect()
}

/// Averages per-image probability distributions over `labels`. An empty
/// image batch (or a provider that scored nothing) is a legitimate
/// empty result, not an error. Returned pairs keep label order.
pub async fn classify(
    images: &[PathBuf],
    labels: &[String],
    registry: &ClassifierRegistry,
) -> anyhow::Result<Vec<(String, f32)>> {
    if images.is_empty() {
        return Ok(Vec::new());
    }

    let provider = registry.classifier(None)?;
    let resp = provider.score(images, labels).await?;
    if resp.probs.is_empty() {
        return Ok(Vec::new());
    }
    for row in &resp.probs {
        if row.len() != labels.len() {
            anyhow::bail!(
                "classifier returned {} scores for {} labels",
                row.len(),
                labels.len()
            );
        }
    }

    let count = resp.probs.len() as f32;
    let mut sums = vec![0.0f32; labels.len()];
    for row in &resp.probs {
        for (sum, p) in sums.iter_mut().zip(row) {
            *sum += p;
        }
    }

    Ok(labels
        .iter()
        .cloned()
        .zip(sums.into_iter().map(|s| s / count))
        .collect())
}
