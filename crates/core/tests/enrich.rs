use catalog_core::config::{
    AppConfig, ClassifierConfig, DatabaseConfig, LibraryConfig, MediaConfig, SchedulerConfig,
    TaggingConfig,
};
use catalog_core::enrich::Enricher;
use providers::noop::NoopClassifier;
use providers::{ClassifierRegistry, ImageClassifier, ProviderError, ScoreResponse};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storage::catalog::{self, NewVideo};
use tempfile::TempDir;

struct FixedScores(Vec<Vec<f32>>);

#[async_trait::async_trait]
impl ImageClassifier for FixedScores {
    async fn score(
        &self,
        _images: &[PathBuf],
        _labels: &[String],
    ) -> Result<ScoreResponse, ProviderError> {
        Ok(ScoreResponse {
            probs: self.0.clone(),
        })
    }
}

fn test_config(temp: &TempDir, db_name: &str) -> AppConfig {
    AppConfig {
        database: DatabaseConfig {
            path: format!("sqlite://file:{db_name}?mode=memory&cache=shared"),
        },
        library: LibraryConfig {
            video_dir: temp.path().join("library").to_string_lossy().into_owned(),
            exclude: vec![],
        },
        media: MediaConfig {
            // Unresolvable binaries: every toolkit call fails.
            ffmpeg_bin: "ffmpeg-test-missing".to_string(),
            ffprobe_bin: "ffprobe-test-missing".to_string(),
            thumbnail_dir: temp.path().join("thumbs").to_string_lossy().into_owned(),
            frame_dir: temp.path().join("frames").to_string_lossy().into_owned(),
            thumbnail_offset: 1.0,
        },
        tagging: TaggingConfig {
            enabled: true,
            labels: vec![
                "indoor".to_string(),
                "outdoor".to_string(),
                "nature".to_string(),
            ],
            threshold: 0.2,
            frames_per_video: 3,
        },
        classifier: ClassifierConfig {
            provider: "noop".to_string(),
            url: None,
        },
        scheduler: SchedulerConfig { workers: 1 },
    }
}

async fn setup(temp: &TempDir, db_name: &str) -> (AppConfig, sqlx::SqlitePool) {
    let cfg = test_config(temp, db_name);
    fs::create_dir_all(&cfg.media.thumbnail_dir).unwrap();
    fs::create_dir_all(&cfg.media.frame_dir).unwrap();
    let pool = storage::connect(&cfg.database.path).await.unwrap();
    storage::migrate(&pool).await.unwrap();
    (cfg, pool)
}

async fn insert_clip(pool: &sqlx::SqlitePool, path: &Path) -> i64 {
    catalog::insert_video(
        pool,
        &NewVideo {
            path: &path.to_string_lossy(),
            filename: "clip.mp4",
            title: "clip",
        },
    )
    .await
    .unwrap()
    .unwrap()
}

#[tokio::test]
async fn unreadable_file_degrades_without_rejecting_the_record() {
    let temp = TempDir::new().unwrap();
    let (cfg, pool) = setup(&temp, "enrich_corrupt").await;

    let video_path = temp.path().join("clip.mp4");
    fs::write(&video_path, b"not really a video").unwrap();
    let id = insert_clip(&pool, &video_path).await;

    let registry = Arc::new(
        ClassifierRegistry::new()
            .with_classifier("noop", Arc::new(NoopClassifier))
            .set_preferred("noop"),
    );
    let enricher = Enricher::new(pool.clone(), &cfg, registry);
    enricher.enrich(id).await.unwrap();

    let video = catalog::get_video(&pool, id).await.unwrap().unwrap();
    assert_eq!(video.duration, Some(0.0));
    assert!(video.thumbnail_path.is_none());
    assert!(catalog::tags_for_video(&pool, id).await.unwrap().is_empty());
}

#[tokio::test]
async fn cached_thumbnail_is_reused() {
    let temp = TempDir::new().unwrap();
    let (cfg, pool) = setup(&temp, "enrich_cached_thumb").await;

    let video_path = temp.path().join("clip.mp4");
    fs::write(&video_path, b"bytes").unwrap();
    let id = insert_clip(&pool, &video_path).await;

    // Thumbnail left behind by an earlier enrichment run.
    let cached = Path::new(&cfg.media.thumbnail_dir).join("clip_thumb.jpg");
    fs::write(&cached, b"jpeg").unwrap();

    let registry = Arc::new(
        ClassifierRegistry::new()
            .with_classifier("noop", Arc::new(NoopClassifier))
            .set_preferred("noop"),
    );
    let enricher = Enricher::new(pool.clone(), &cfg, registry);
    enricher.enrich(id).await.unwrap();

    let video = catalog::get_video(&pool, id).await.unwrap().unwrap();
    assert_eq!(
        video.thumbnail_path.as_deref(),
        Some(cached.to_string_lossy().as_ref())
    );
}

#[tokio::test]
async fn enriching_an_unknown_id_is_a_noop() {
    let temp = TempDir::new().unwrap();
    let (cfg, pool) = setup(&temp, "enrich_unknown").await;

    let registry = Arc::new(
        ClassifierRegistry::new()
            .with_classifier("noop", Arc::new(NoopClassifier))
            .set_preferred("noop"),
    );
    let enricher = Enricher::new(pool.clone(), &cfg, registry);
    enricher.enrich(999).await.unwrap();
    assert!(catalog::list_videos(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn tagging_is_idempotent_and_cleans_up_frames() {
    let temp = TempDir::new().unwrap();
    let (cfg, pool) = setup(&temp, "enrich_tagging").await;

    let video_path = temp.path().join("clip.mp4");
    fs::write(&video_path, b"bytes").unwrap();
    let id = insert_clip(&pool, &video_path).await;

    // Per-image distributions over [indoor, outdoor, nature];
    // averages: indoor 0.6, outdoor 0.075, nature 0.6.
    let registry = Arc::new(
        ClassifierRegistry::new()
            .with_classifier(
                "fixed",
                Arc::new(FixedScores(vec![
                    vec![0.5, 0.1, 0.9],
                    vec![0.7, 0.05, 0.3],
                ])),
            )
            .set_preferred("fixed"),
    );
    let enricher = Enricher::new(pool.clone(), &cfg, registry);

    let make_frames = || {
        let frames = vec![
            Path::new(&cfg.media.frame_dir).join("clip_frame_0.jpg"),
            Path::new(&cfg.media.frame_dir).join("clip_frame_1.jpg"),
        ];
        for f in &frames {
            fs::write(f, b"frame").unwrap();
        }
        frames
    };

    let frames = make_frames();
    enricher.tag_frames(id, frames.clone()).await.unwrap();

    let tags: Vec<String> = catalog::tags_for_video(&pool, id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(tags, vec!["indoor", "nature"]);
    assert!(frames.iter().all(|f| !f.exists()), "frames cleaned up");

    // Re-running the pipeline changes nothing.
    let frames = make_frames();
    enricher.tag_frames(id, frames).await.unwrap();
    assert_eq!(catalog::tags_for_video(&pool, id).await.unwrap().len(), 2);
    assert_eq!(catalog::list_tags(&pool).await.unwrap().len(), 2);
}
