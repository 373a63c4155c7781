use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Video {
    pub id: i64,
    pub path: String,
    pub filename: String,
    pub title: String,
    pub rating: i64,
    pub thumbnail_path: Option<String>,
    pub duration: Option<f64>,
    pub added_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// Playlist entries keep their video ids as a JSON array string,
/// decoded on demand via [`Playlist::video_ids`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Playlist {
    pub id: i64,
    pub name: String,
    #[serde(rename = "video_ids")]
    #[sqlx(rename = "video_ids")]
    pub video_ids_json: String,
}

impl Playlist {
    pub fn video_ids(&self) -> Vec<i64> {
        serde_json::from_str(&self.video_ids_json).unwrap_or_default()
    }
}
