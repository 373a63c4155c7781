//! Human-readable console output for catalog records.

use chrono::DateTime;
use storage::models::Video;

pub fn print_video(video: &Video) {
    let duration = video
        .duration
        .map(format_duration)
        .unwrap_or_else(|| "--:--".to_string());
    let added = DateTime::from_timestamp(video.added_at, 0)
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    println!(
        "[{}] {}  {}  rating {}/10  added {}",
        video.id, video.title, duration, video.rating, added
    );
}

/// Seconds to `H:MM:SS` (or `M:SS` under an hour); 0 renders as 0:00.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}
