//! Wraps the ffmpeg toolkit: duration probing and single-frame
//! extraction. Probe failures are degraded states here, never errors —
//! enrichment must keep going when a file is unreadable.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct MediaProbe {
    ffmpeg: String,
    ffprobe: String,
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

impl MediaProbe {
    pub fn new(ffmpeg_bin: &str, ffprobe_bin: &str) -> Self {
        Self {
            ffmpeg: ffmpeg_bin.to_string(),
            ffprobe: ffprobe_bin.to_string(),
        }
    }

    /// Duration of the first video stream in seconds, falling back to
    /// the container duration. Returns 0.0 on any toolkit failure.
    pub async fn duration(&self, path: &Path) -> f64 {
        match self.probe_duration(path).await {
            Ok(d) => d,
            Err(e) => {
                warn!("probe failed for {}: {e:#}", path.display());
                0.0
            }
        }
    }

    async fn probe_duration(&self, path: &Path) -> anyhow::Result<f64> {
        let output = Command::new(&self.ffprobe)
            .arg("-v")
            .arg("error")
            .arg("-print_format")
            .arg("json")
            .arg("-show_streams")
            .arg("-show_format")
            .arg(path)
            .output()
            .await
            .context("spawn ffprobe")?;

        if !output.status.success() {
            bail!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let parsed: ProbeOutput =
            serde_json::from_slice(&output.stdout).context("parse ffprobe output")?;

        let stream_duration = parsed
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .and_then(|s| s.duration.as_deref())
            .and_then(|d| d.parse::<f64>().ok());

        stream_duration
            .or_else(|| {
                parsed
                    .format
                    .as_ref()
                    .and_then(|f| f.duration.as_deref())
                    .and_then(|d| d.parse::<f64>().ok())
            })
            .ok_or_else(|| anyhow::anyhow!("no duration in probe output"))
    }

    /// Writes `{stem}_thumb.jpg` into `out_dir`: one frame at `offset`
    /// seconds, scaled to width 480. An existing output short-circuits
    /// without touching the toolkit, so re-enrichment is cheap.
    pub async fn thumbnail(&self, path: &Path, out_dir: &Path, offset: f64) -> Option<PathBuf> {
        let stem = path.file_stem()?.to_string_lossy();
        let out = out_dir.join(format!("{stem}_thumb.jpg"));
        if out.exists() {
            debug!("thumbnail already present for {}", path.display());
            return Some(out);
        }
        match self.extract_frame(path, offset, "scale=480:-1", &out).await {
            Ok(()) => Some(out),
            Err(e) => {
                warn!("thumbnail failed for {}: {e:#}", path.display());
                // A partial file would wrongly satisfy the cache check next time.
                let _ = std::fs::remove_file(&out);
                None
            }
        }
    }

    /// Seeks to `offset`, applies `filter`, writes exactly one frame,
    /// overwriting any previous output.
    pub async fn extract_frame(
        &self,
        path: &Path,
        offset: f64,
        filter: &str,
        out: &Path,
    ) -> anyhow::Result<()> {
        let output = Command::new(&self.ffmpeg)
            .arg("-y")
            .arg("-ss")
            .arg(format!("{offset:.3}"))
            .arg("-i")
            .arg(path)
            .arg("-vf")
            .arg(filter)
            .arg("-frames:v")
            .arg("1")
            .arg(out)
            .output()
            .await
            .context("spawn ffmpeg")?;

        if !output.status.success() {
            bail!(
                "ffmpeg exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        if !out.exists() {
            bail!("ffmpeg produced no output frame");
        }
        Ok(())
    }
}
