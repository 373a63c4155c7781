use catalog_core::config::{
    AppConfig, ClassifierConfig, DatabaseConfig, LibraryConfig, MediaConfig, SchedulerConfig,
    TaggingConfig,
};
use catalog_core::enrich::Enricher;
use catalog_core::pipeline;
use catalog_core::scheduler::TaskScheduler;
use std::fs;
use std::sync::Arc;
use storage::catalog;
use tempfile::tempdir;

#[tokio::test]
async fn test_full_pipeline() {
    // 1. Setup temporary directories and files
    let temp = tempdir().unwrap();
    let library = temp.path().join("library");
    fs::create_dir_all(&library).unwrap();
    fs::write(library.join("clip.mp4"), b"not a real mp4").unwrap();
    fs::write(library.join("readme.txt"), b"not a video").unwrap();
    // Use shared in-memory DB so multiple connections see the same data.
    let db_url = "sqlite://file:pipeline_test?mode=memory&cache=shared".to_string();

    // 2. Setup Config and Database
    let cfg = AppConfig {
        database: DatabaseConfig {
            path: db_url.clone(),
        },
        library: LibraryConfig {
            video_dir: library.to_string_lossy().into_owned(),
            exclude: vec![],
        },
        media: MediaConfig {
            // Unresolvable binaries: probing the fake file fails, which
            // is exactly the degraded path under test.
            ffmpeg_bin: "ffmpeg-test-missing".to_string(),
            ffprobe_bin: "ffprobe-test-missing".to_string(),
            thumbnail_dir: temp.path().join("thumbs").to_string_lossy().into_owned(),
            frame_dir: temp.path().join("frames").to_string_lossy().into_owned(),
            thumbnail_offset: 1.0,
        },
        tagging: TaggingConfig {
            enabled: true,
            labels: vec![],
            threshold: 0.2,
            frames_per_video: 3,
        },
        classifier: ClassifierConfig {
            provider: "noop".to_string(),
            url: None,
        },
        scheduler: SchedulerConfig { workers: 2 },
    };

    let pool = storage::connect(&cfg.database.path).await.unwrap();
    storage::migrate(&pool).await.unwrap();

    // 3. Scan: one new video, enrichment scheduled in the background
    let registry = Arc::new(pipeline::build_registry(&cfg));
    let scheduler = TaskScheduler::start(cfg.scheduler.workers);
    let enricher = Enricher::new(pool.clone(), &cfg, registry);

    let summary = pipeline::run_scan(&cfg, &pool, &scheduler, &enricher)
        .await
        .unwrap();
    assert_eq!(summary.new_count, 1);

    let video = catalog::find_video_by_path(&pool, &library.join("clip.mp4").to_string_lossy())
        .await
        .unwrap()
        .expect("clip.mp4 registered during scan");
    assert_eq!(video.title, "clip");
    assert_eq!(video.rating, 0);

    // 4. Drain the enrichment queue, then check the degraded state:
    // unreadable file, so zero duration, no thumbnail, no tags.
    scheduler.join().await;

    let video = catalog::get_video(&pool, video.id).await.unwrap().unwrap();
    assert_eq!(video.duration, Some(0.0));
    assert!(video.thumbnail_path.is_none());
    assert!(catalog::tags_for_video(&pool, video.id)
        .await
        .unwrap()
        .is_empty());

    // 5. Rating validation at the boundary
    assert!(pipeline::rate_video(&pool, video.id, 11).await.is_err());
    pipeline::rate_video(&pool, video.id, 7).await.unwrap();
    let video = catalog::get_video(&pool, video.id).await.unwrap().unwrap();
    assert_eq!(video.rating, 7);

    // 6. Re-scan without new files
    let registry = Arc::new(pipeline::build_registry(&cfg));
    let scheduler = TaskScheduler::start(cfg.scheduler.workers);
    let enricher = Enricher::new(pool.clone(), &cfg, registry);
    let summary = pipeline::run_scan(&cfg, &pool, &scheduler, &enricher)
        .await
        .unwrap();
    assert_eq!(summary.new_count, 0);
    scheduler.join().await;
}

#[tokio::test]
async fn video_dir_setting_overrides_config() {
    let temp = tempdir().unwrap();
    let configured = temp.path().join("configured");
    let chosen = temp.path().join("chosen");
    fs::create_dir_all(&configured).unwrap();
    fs::create_dir_all(&chosen).unwrap();

    let cfg = AppConfig {
        database: DatabaseConfig {
            path: "sqlite://file:video_dir_test?mode=memory&cache=shared".to_string(),
        },
        library: LibraryConfig {
            video_dir: configured.to_string_lossy().into_owned(),
            exclude: vec![],
        },
        media: MediaConfig {
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            thumbnail_dir: temp.path().join("thumbs").to_string_lossy().into_owned(),
            frame_dir: temp.path().join("frames").to_string_lossy().into_owned(),
            thumbnail_offset: 1.0,
        },
        tagging: TaggingConfig {
            enabled: false,
            labels: vec![],
            threshold: 0.2,
            frames_per_video: 3,
        },
        classifier: ClassifierConfig {
            provider: "noop".to_string(),
            url: None,
        },
        scheduler: SchedulerConfig { workers: 1 },
    };

    let pool = storage::connect(&cfg.database.path).await.unwrap();
    storage::migrate(&pool).await.unwrap();

    assert_eq!(
        pipeline::video_dir(&pool, &cfg).await.unwrap(),
        configured.clone()
    );

    // A nonexistent directory is rejected at the boundary.
    let missing = temp.path().join("missing");
    assert!(
        pipeline::set_video_dir(&pool, &missing.to_string_lossy())
            .await
            .is_err()
    );

    let stored = pipeline::set_video_dir(&pool, &chosen.to_string_lossy())
        .await
        .unwrap();
    assert_eq!(pipeline::video_dir(&pool, &cfg).await.unwrap(), stored);
}
