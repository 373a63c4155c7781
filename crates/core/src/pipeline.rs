//! Wires the pipeline together and exposes the catalog operations the
//! boundary layer calls: scanning, rating, the video-dir setting,
//! playlists, and the random pick.

use crate::config::AppConfig;
use crate::enrich::Enricher;
use crate::scanner::{self, ScanSummary};
use crate::scheduler::TaskScheduler;
use anyhow::{bail, Context};
use providers::clip::{ClipServerClient, ClipServerConfig};
use providers::noop::NoopClassifier;
use providers::ClassifierRegistry;
use rand::Rng;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use storage::catalog;
use storage::models::{Playlist, Video};
use tracing::info;

const VIDEO_DIR_KEY: &str = "video_dir";

pub fn build_registry(config: &AppConfig) -> ClassifierRegistry {
    let mut reg = ClassifierRegistry::new().with_classifier("noop", Arc::new(NoopClassifier));

    let base_url = config
        .classifier
        .url
        .clone()
        .or_else(|| std::env::var("CLIP_SERVER_URL").ok());
    if let Some(base_url) = base_url {
        reg = reg.with_classifier(
            "clip-server",
            Arc::new(ClipServerClient::new(ClipServerConfig { base_url })),
        );
    }

    reg.set_preferred(&config.classifier.provider)
}

/// Effective video root: the catalog setting when present, the
/// configured default otherwise.
pub async fn video_dir(pool: &SqlitePool, config: &AppConfig) -> anyhow::Result<PathBuf> {
    let dir = catalog::get_setting(pool, VIDEO_DIR_KEY)
        .await?
        .unwrap_or_else(|| config.library.video_dir.clone());
    Ok(PathBuf::from(dir))
}

/// Validates and persists a new video root. Rejects paths that are not
/// existing directories; stores the canonical absolute form.
pub async fn set_video_dir(pool: &SqlitePool, raw: &str) -> anyhow::Result<PathBuf> {
    let normalized = std::fs::canonicalize(raw)
        .with_context(|| format!("video directory not found: {raw}"))?;
    if !normalized.is_dir() {
        bail!("not a directory: {}", normalized.display());
    }
    catalog::set_setting(pool, VIDEO_DIR_KEY, &normalized.to_string_lossy()).await?;
    Ok(normalized)
}

/// Discovery phase plus enrichment hand-off: registers new videos
/// synchronously, then submits one enrichment job per new record. The
/// returned summary does not wait for enrichment.
pub async fn run_scan(
    config: &AppConfig,
    pool: &SqlitePool,
    scheduler: &TaskScheduler,
    enricher: &Enricher,
) -> anyhow::Result<ScanSummary> {
    let root = video_dir(pool, config).await?;
    if !root.is_dir() {
        bail!("video directory not found: {}", root.display());
    }
    std::fs::create_dir_all(&config.media.thumbnail_dir).context("create thumbnail dir")?;
    std::fs::create_dir_all(&config.media.frame_dir).context("create frame dir")?;

    let summary = scanner::scan(&root, &config.library.exclude, pool).await?;
    info!(
        "scan of {} complete: {} new videos",
        root.display(),
        summary.new_count
    );

    for &id in &summary.new_ids {
        let enricher = enricher.clone();
        scheduler.submit(format!("enrich video {id}"), async move {
            enricher.enrich(id).await
        });
    }
    Ok(summary)
}

pub async fn rate_video(pool: &SqlitePool, video_id: i64, rating: i64) -> anyhow::Result<()> {
    if !(0..=10).contains(&rating) {
        bail!("rating must be between 0 and 10");
    }
    if !catalog::set_rating(pool, video_id, rating).await? {
        bail!("video {video_id} not found");
    }
    Ok(())
}

pub async fn random_video(pool: &SqlitePool) -> anyhow::Result<Video> {
    let mut videos = catalog::list_videos(pool).await?;
    if videos.is_empty() {
        bail!("no videos in catalog");
    }
    let idx = rand::thread_rng().gen_range(0..videos.len());
    Ok(videos.swap_remove(idx))
}

pub async fn create_playlist(pool: &SqlitePool, name: &str) -> anyhow::Result<Playlist> {
    match catalog::create_playlist(pool, name).await? {
        Some(playlist) => Ok(playlist),
        None => bail!("playlist '{name}' already exists"),
    }
}

/// Replaces a playlist's contents. Every id must reference a cataloged
/// video.
pub async fn set_playlist(pool: &SqlitePool, name: &str, video_ids: &[i64]) -> anyhow::Result<()> {
    for &id in video_ids {
        if catalog::get_video(pool, id).await?.is_none() {
            bail!("video {id} not found");
        }
    }
    if !catalog::set_playlist_videos(pool, name, video_ids).await? {
        bail!("playlist '{name}' not found");
    }
    Ok(())
}
