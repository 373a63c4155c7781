//! Per-video enrichment: duration + thumbnail, then AI tagging.
//!
//! Everything here is failure-isolated: a broken file leaves the record
//! cataloged with zero duration, no thumbnail, and no tags. Nothing in
//! this module propagates beyond the owning job.

use crate::classifier;
use crate::config::{AppConfig, TaggingConfig};
use crate::frames::FrameSampler;
use crate::probe::MediaProbe;
use anyhow::Context;
use providers::ClassifierRegistry;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storage::catalog;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct Enricher {
    pool: SqlitePool,
    probe: MediaProbe,
    sampler: FrameSampler,
    registry: Arc<ClassifierRegistry>,
    thumbnail_dir: PathBuf,
    frame_dir: PathBuf,
    thumbnail_offset: f64,
    tagging: TaggingConfig,
}

impl Enricher {
    pub fn new(pool: SqlitePool, config: &AppConfig, registry: Arc<ClassifierRegistry>) -> Self {
        let probe = MediaProbe::new(&config.media.ffmpeg_bin, &config.media.ffprobe_bin);
        Self {
            pool,
            sampler: FrameSampler::new(probe.clone()),
            probe,
            registry,
            thumbnail_dir: PathBuf::from(&config.media.thumbnail_dir),
            frame_dir: PathBuf::from(&config.media.frame_dir),
            thumbnail_offset: config.media.thumbnail_offset,
            tagging: config.tagging.clone(),
        }
    }

    /// One enrichment job: probe duration, generate a thumbnail, persist
    /// both, then tag. A vanished record is a no-op.
    pub async fn enrich(&self, video_id: i64) -> anyhow::Result<()> {
        let Some(video) = catalog::get_video(&self.pool, video_id).await? else {
            debug!(video_id, "enrichment target not found, skipping");
            return Ok(());
        };
        let path = PathBuf::from(&video.path);

        let duration = self.probe.duration(&path).await;
        let thumbnail = self
            .probe
            .thumbnail(&path, &self.thumbnail_dir, self.thumbnail_offset)
            .await;
        let thumbnail_str = thumbnail.as_ref().map(|p| p.to_string_lossy().into_owned());
        catalog::update_media(&self.pool, video_id, duration, thumbnail_str.as_deref())
            .await
            .context("persist media metadata")?;
        info!(
            video_id,
            duration,
            thumbnail = thumbnail.is_some(),
            "media metadata stored"
        );

        if self.tagging.enabled {
            self.tag(video_id).await?;
        }
        Ok(())
    }

    /// Samples frames and runs the tagging pipeline on them. No frames
    /// (zero duration, extraction failures) means no tags, not an error.
    pub async fn tag(&self, video_id: i64) -> anyhow::Result<()> {
        let Some(video) = catalog::get_video(&self.pool, video_id).await? else {
            return Ok(());
        };
        let frames = self
            .sampler
            .sample(
                Path::new(&video.path),
                &self.frame_dir,
                self.tagging.frames_per_video,
            )
            .await;
        if frames.is_empty() {
            debug!(video_id, "no sample frames, skipping tagging");
            return Ok(());
        }
        self.tag_frames(video_id, frames).await
    }

    /// Classifies pre-sampled frames and attaches tags above threshold.
    /// The frame files are deleted whatever the outcome.
    pub async fn tag_frames(&self, video_id: i64, frames: Vec<PathBuf>) -> anyhow::Result<()> {
        let result = self.apply_tags(video_id, &frames).await;
        cleanup_frames(&frames);
        result
    }

    async fn apply_tags(&self, video_id: i64, frames: &[PathBuf]) -> anyhow::Result<()> {
        let labels = if self.tagging.labels.is_empty() {
            classifier::default_labels()
        } else {
            self.tagging.labels.clone()
        };

        let scores = match classifier::classify(frames, &labels, &self.registry).await {
            Ok(scores) => scores,
            Err(e) => {
                // Best-effort enrichment: degrade to "no tags".
                warn!(video_id, "classification failed: {e:#}");
                return Ok(());
            }
        };

        for (label, prob) in scores {
            if prob <= self.tagging.threshold {
                continue;
            }
            let tag = catalog::find_or_create_tag(&self.pool, &label)
                .await
                .with_context(|| format!("find-or-create tag '{label}'"))?;
            catalog::attach_tag(&self.pool, video_id, tag.id)
                .await
                .with_context(|| format!("attach tag '{label}'"))?;
            debug!(video_id, tag = %label, prob, "tag attached");
        }
        Ok(())
    }
}

fn cleanup_frames(frames: &[PathBuf]) {
    for frame in frames {
        if let Err(e) = std::fs::remove_file(frame) {
            warn!("failed to remove frame {}: {e}", frame.display());
        }
    }
}
