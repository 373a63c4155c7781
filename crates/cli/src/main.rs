use anyhow::Result;
use catalog_core::config::{self, AppConfig};
use catalog_core::enrich::Enricher;
use catalog_core::pipeline;
use catalog_core::scheduler::TaskScheduler;
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use std::sync::Arc;
use storage::catalog;

mod output;

#[derive(Parser)]
#[command(version, about = "Local video catalog: scan, enrich, browse")]
struct Cli {
    /// Config file path (defaults to config/default.toml).
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the video directory and enrich newly found videos.
    Scan {
        #[arg(long)]
        json: bool,
    },
    /// Re-run enrichment (duration, thumbnail, tags) for one video.
    Enrich { id: i64 },
    /// List cataloged videos.
    List {
        #[arg(long)]
        json: bool,
    },
    /// List all known tags.
    Tags {
        #[arg(long)]
        json: bool,
    },
    /// Rate a video from 0 to 10.
    Rate { id: i64, rating: i64 },
    /// Pick a random cataloged video.
    Random {
        #[arg(long)]
        json: bool,
    },
    /// Show or change the scanned video directory.
    VideoDir {
        #[command(subcommand)]
        action: VideoDirAction,
    },
    /// Manage playlists.
    Playlist {
        #[command(subcommand)]
        action: PlaylistAction,
    },
}

#[derive(Subcommand)]
enum VideoDirAction {
    Get,
    Set { path: String },
}

#[derive(Subcommand)]
enum PlaylistAction {
    Create { name: String },
    List,
    Show { name: String },
    /// Replace a playlist's contents with the given video ids.
    Set { name: String, ids: Vec<i64> },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    let pool = storage::connect(&cfg.database.path).await?;
    storage::migrate(&pool).await?;

    match cli.command {
        Commands::Scan { json } => run_scan(&cfg, &pool, json).await,
        Commands::Enrich { id } => run_enrich(&cfg, &pool, id).await,
        Commands::List { json } => run_list(&pool, json).await,
        Commands::Tags { json } => run_tags(&pool, json).await,
        Commands::Rate { id, rating } => {
            pipeline::rate_video(&pool, id, rating).await?;
            println!("video {id} rated {rating}");
            Ok(())
        }
        Commands::Random { json } => {
            let video = pipeline::random_video(&pool).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&video)?);
            } else {
                output::print_video(&video);
            }
            Ok(())
        }
        Commands::VideoDir { action } => run_video_dir(&cfg, &pool, action).await,
        Commands::Playlist { action } => run_playlist(&pool, action).await,
    }
}

async fn run_scan(cfg: &AppConfig, pool: &SqlitePool, json: bool) -> Result<()> {
    let registry = Arc::new(pipeline::build_registry(cfg));
    let scheduler = TaskScheduler::start(cfg.scheduler.workers);
    let enricher = Enricher::new(pool.clone(), cfg, registry);

    let summary = pipeline::run_scan(cfg, pool, &scheduler, &enricher).await?;
    if json {
        println!("{}", serde_json::json!({ "new_count": summary.new_count }));
    } else {
        println!("Found {} new videos.", summary.new_count);
    }

    // The scan itself is done; keep the process alive until the
    // background enrichment queue drains.
    scheduler.join().await;
    Ok(())
}

async fn run_enrich(cfg: &AppConfig, pool: &SqlitePool, id: i64) -> Result<()> {
    let registry = Arc::new(pipeline::build_registry(cfg));
    let enricher = Enricher::new(pool.clone(), cfg, registry);
    std::fs::create_dir_all(&cfg.media.thumbnail_dir)?;
    std::fs::create_dir_all(&cfg.media.frame_dir)?;
    enricher.enrich(id).await?;
    println!("enrichment finished for video {id}");
    Ok(())
}

async fn run_list(pool: &SqlitePool, json: bool) -> Result<()> {
    let videos = catalog::list_videos(pool).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&videos)?);
        return Ok(());
    }
    if videos.is_empty() {
        println!("catalog is empty");
        return Ok(());
    }
    for video in &videos {
        output::print_video(video);
    }
    Ok(())
}

async fn run_tags(pool: &SqlitePool, json: bool) -> Result<()> {
    let tags = catalog::list_tags(pool).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tags)?);
        return Ok(());
    }
    for tag in &tags {
        println!("{}", tag.name);
    }
    Ok(())
}

async fn run_video_dir(cfg: &AppConfig, pool: &SqlitePool, action: VideoDirAction) -> Result<()> {
    match action {
        VideoDirAction::Get => {
            let dir = pipeline::video_dir(pool, cfg).await?;
            println!("{}", dir.display());
        }
        VideoDirAction::Set { path } => {
            let dir = pipeline::set_video_dir(pool, &path).await?;
            println!("video directory set to {}", dir.display());
        }
    }
    Ok(())
}

async fn run_playlist(pool: &SqlitePool, action: PlaylistAction) -> Result<()> {
    match action {
        PlaylistAction::Create { name } => {
            let playlist = pipeline::create_playlist(pool, &name).await?;
            println!("created playlist '{}'", playlist.name);
        }
        PlaylistAction::List => {
            for playlist in catalog::list_playlists(pool).await? {
                println!("{} ({} videos)", playlist.name, playlist.video_ids().len());
            }
        }
        PlaylistAction::Show { name } => match catalog::get_playlist(pool, &name).await? {
            Some(playlist) => {
                for id in playlist.video_ids() {
                    match catalog::get_video(pool, id).await? {
                        Some(video) => output::print_video(&video),
                        None => println!("[{id}] (missing)"),
                    }
                }
            }
            None => anyhow::bail!("playlist '{name}' not found"),
        },
        PlaylistAction::Set { name, ids } => {
            pipeline::set_playlist(pool, &name, &ids).await?;
            println!("playlist '{name}' now has {} videos", ids.len());
        }
    }
    Ok(())
}
