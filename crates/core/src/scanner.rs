//! Walks the video root for media files and registers newcomers in the
//! catalog. Discovery is synchronous; enrichment is scheduled elsewhere.

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use storage::catalog::{self, NewVideo};
use tokio::sync::mpsc;
use tokio::task;
use tracing::{debug, info};
use walkdir::WalkDir;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "wmv"];

#[derive(Debug, Default)]
pub struct ScanSummary {
    pub new_count: usize,
    pub new_ids: Vec<i64>,
}

/// Recursively scans `root`, creating a catalog record per unseen video
/// file. Existing paths are never duplicated; the path unique constraint
/// backs the dedup check even under concurrent scans. Unreadable entries
/// are skipped, not fatal.
pub async fn scan(
    root: &Path,
    excludes: &[String],
    pool: &SqlitePool,
) -> anyhow::Result<ScanSummary> {
    let (tx, mut rx) = mpsc::channel::<PathBuf>(100);
    let exclude_set = build_globset(excludes)?;
    let root = root.to_path_buf();

    // Walker task
    let walker_handle = task::spawn_blocking(move || {
        for entry in WalkDir::new(&root)
            .follow_links(true)
            .into_iter()
            // Depth 0 is the root the caller asked for; the hidden-name
            // skip only applies below it (a `~/.videos` root must walk).
            .filter_entry(|e| e.depth() == 0 || should_descend(e.path(), &exclude_set))
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("walk error: {e}");
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file()
                || !is_video(path)
                || is_excluded(path, &exclude_set)
                || is_hidden(path)
            {
                continue;
            }

            if tx.blocking_send(path.to_path_buf()).is_err() {
                // Receiver dropped, stop walking.
                break;
            }
        }
    });

    let mut summary = ScanSummary::default();
    while let Some(path) = rx.recv().await {
        let Some(filename) = path.file_name().and_then(|n| n.to_str()).map(str::to_string)
        else {
            continue;
        };
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&filename)
            .to_string();
        let path_str = path.to_string_lossy();
        let record = NewVideo {
            path: &path_str,
            filename: &filename,
            title: &title,
        };
        match catalog::insert_video(pool, &record)
            .await
            .with_context(|| format!("register {}", path.display()))?
        {
            Some(id) => {
                info!("cataloged {}", path.display());
                summary.new_ids.push(id);
                summary.new_count += 1;
            }
            None => debug!("already cataloged: {}", path.display()),
        }
    }

    walker_handle.await?;
    Ok(summary)
}

pub fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let ext = e.to_lowercase();
            VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

fn should_descend(path: &Path, excludes: &GlobSet) -> bool {
    !is_excluded(path, excludes) && !is_hidden(path)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn is_excluded(path: &Path, excludes: &GlobSet) -> bool {
    excludes.is_match(path)
}
