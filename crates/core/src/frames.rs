//! Samples evenly spaced frames from a video as classifier input.

use crate::probe::MediaProbe;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Classifier backends expect square 224x224 inputs.
const FRAME_FILTER: &str = "scale=224:224";

/// Offsets strictly inside (0, duration): `duration * i / (count + 1)`
/// for i in 1..=count. The first and last frames are skipped on purpose,
/// they are often black or blank.
pub fn sample_offsets(duration: f64, count: usize) -> Vec<f64> {
    if duration <= 0.0 {
        return Vec::new();
    }
    (1..=count)
        .map(|i| duration * i as f64 / (count as f64 + 1.0))
        .collect()
}

#[derive(Debug, Clone)]
pub struct FrameSampler {
    probe: MediaProbe,
}

impl FrameSampler {
    pub fn new(probe: MediaProbe) -> Self {
        Self { probe }
    }

    /// Extracts up to `count` frames into `out_dir` as
    /// `{stem}_frame_{i}.jpg`. A zero duration (probe failure or empty
    /// file) yields an empty vec; individual extraction failures are
    /// skipped, so the result may be shorter than `count`.
    pub async fn sample(&self, path: &Path, out_dir: &Path, count: usize) -> Vec<PathBuf> {
        let duration = self.probe.duration(path).await;
        if duration <= 0.0 {
            debug!("no duration for {}, skipping frame sampling", path.display());
            return Vec::new();
        }
        let stem = match path.file_stem() {
            Some(s) => s.to_string_lossy().into_owned(),
            None => return Vec::new(),
        };

        let mut frames = Vec::new();
        for (i, offset) in sample_offsets(duration, count).into_iter().enumerate() {
            let out = out_dir.join(format!("{stem}_frame_{i}.jpg"));
            match self.probe.extract_frame(path, offset, FRAME_FILTER, &out).await {
                Ok(()) => frames.push(out),
                Err(e) => warn!(
                    "frame extraction at {offset:.2}s failed for {}: {e:#}",
                    path.display()
                ),
            }
        }
        frames
    }
}
