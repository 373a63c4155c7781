//! Catalog repository: conflict-tolerant writes over the unique
//! constraints on `videos.path` and `tags.name`.
//!
//! Concurrent writers (a scan registering videos while enrichment jobs
//! tag them) are coordinated here at the storage layer, never with
//! in-process locks: inserts tolerate conflicts and re-read the winner.

use crate::models::{Playlist, Tag, Video};
use sqlx::SqlitePool;

#[derive(Debug, Clone)]
pub struct NewVideo<'a> {
    pub path: &'a str,
    pub filename: &'a str,
    pub title: &'a str,
}

/// Registers a video, deduplicating on path. Returns the new row id,
/// or `None` when the path was already cataloged.
pub async fn insert_video(pool: &SqlitePool, video: &NewVideo<'_>) -> anyhow::Result<Option<i64>> {
    let res = sqlx::query(
        r#"
        INSERT INTO videos (path, filename, title, rating)
        VALUES (?, ?, ?, 0)
        ON CONFLICT(path) DO NOTHING
        "#,
    )
    .bind(video.path)
    .bind(video.filename)
    .bind(video.title)
    .execute(pool)
    .await?;

    if res.rows_affected() == 0 {
        Ok(None)
    } else {
        Ok(Some(res.last_insert_rowid()))
    }
}

pub async fn find_video_by_path(pool: &SqlitePool, path: &str) -> anyhow::Result<Option<Video>> {
    let video = sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE path = ?")
        .bind(path)
        .fetch_optional(pool)
        .await?;
    Ok(video)
}

pub async fn get_video(pool: &SqlitePool, video_id: i64) -> anyhow::Result<Option<Video>> {
    let video = sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE id = ?")
        .bind(video_id)
        .fetch_optional(pool)
        .await?;
    Ok(video)
}

pub async fn list_videos(pool: &SqlitePool) -> anyhow::Result<Vec<Video>> {
    let videos = sqlx::query_as::<_, Video>("SELECT * FROM videos ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(videos)
}

/// Persists the enrichment outputs. Duration is stored even when the
/// probe failed (0.0) so a record is visibly "probed but unreadable".
pub async fn update_media(
    pool: &SqlitePool,
    video_id: i64,
    duration: f64,
    thumbnail_path: Option<&str>,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE videos SET duration = ?, thumbnail_path = ? WHERE id = ?")
        .bind(duration)
        .bind(thumbnail_path)
        .bind(video_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Returns false when no row matched the id. Range validation is the
/// caller's concern.
pub async fn set_rating(pool: &SqlitePool, video_id: i64, rating: i64) -> anyhow::Result<bool> {
    let res = sqlx::query("UPDATE videos SET rating = ? WHERE id = ?")
        .bind(rating)
        .bind(video_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// Idempotent find-or-create keyed on the unique tag name. The insert
/// tolerates a concurrent winner; the re-read always returns the row
/// that actually exists.
pub async fn find_or_create_tag(pool: &SqlitePool, name: &str) -> anyhow::Result<Tag> {
    sqlx::query("INSERT INTO tags (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
        .bind(name)
        .execute(pool)
        .await?;
    let tag = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name = ?")
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(tag)
}

/// Set semantics: re-attaching an existing association is a no-op.
pub async fn attach_tag(pool: &SqlitePool, video_id: i64, tag_id: i64) -> anyhow::Result<()> {
    sqlx::query("INSERT OR IGNORE INTO video_tags (video_id, tag_id) VALUES (?, ?)")
        .bind(video_id)
        .bind(tag_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_tags(pool: &SqlitePool) -> anyhow::Result<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(tags)
}

pub async fn tags_for_video(pool: &SqlitePool, video_id: i64) -> anyhow::Result<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.name FROM tags t
        JOIN video_tags vt ON vt.tag_id = t.id
        WHERE vt.video_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(video_id)
    .fetch_all(pool)
    .await?;
    Ok(tags)
}

pub async fn get_setting(pool: &SqlitePool, key: &str) -> anyhow::Result<Option<String>> {
    let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(value)
}

pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value) VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

/// Returns `None` when a playlist with this name already exists.
pub async fn create_playlist(pool: &SqlitePool, name: &str) -> anyhow::Result<Option<Playlist>> {
    let res = sqlx::query(
        "INSERT INTO playlists (name, video_ids) VALUES (?, '[]') ON CONFLICT(name) DO NOTHING",
    )
    .bind(name)
    .execute(pool)
    .await?;
    if res.rows_affected() == 0 {
        return Ok(None);
    }
    get_playlist(pool, name).await
}

pub async fn get_playlist(pool: &SqlitePool, name: &str) -> anyhow::Result<Option<Playlist>> {
    let playlist = sqlx::query_as::<_, Playlist>("SELECT * FROM playlists WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(playlist)
}

pub async fn list_playlists(pool: &SqlitePool) -> anyhow::Result<Vec<Playlist>> {
    let playlists = sqlx::query_as::<_, Playlist>("SELECT * FROM playlists ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(playlists)
}

pub async fn set_playlist_videos(
    pool: &SqlitePool,
    name: &str,
    video_ids: &[i64],
) -> anyhow::Result<bool> {
    let encoded = serde_json::to_string(video_ids)?;
    let res = sqlx::query("UPDATE playlists SET video_ids = ? WHERE name = ?")
        .bind(encoded)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() > 0)
}
