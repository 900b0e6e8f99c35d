//! RoadView headless CLI
//!
//! Browse a directory of scenario records and play scenarios back without
//! a UI, exporting the rendered frames.

use clap::Parser;
use roadview_core::{Frame, Layer, PlaybackMode, ViewerApp, ViewerConfig};
use roadview_env::{ManualTicker, TickScheduler, TokioTicker};
use roadview_sim::{
    HeadlessRunner, JsonDirProvider, PlaybackExport, RealtimeRunner, RerunLogger, RunConfig,
    SimError,
};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

type App = ViewerApp<JsonDirProvider, ManualTicker>;

/// RoadView headless scenario player
#[derive(Parser, Debug)]
#[command(name = "roadview-sim")]
#[command(about = "Browse and play back recorded traffic scenarios headlessly", long_about = None)]
struct Args {
    /// Dataset root (one subfolder per dataset split)
    #[arg(short = 'D', long, default_value = "data")]
    data_dir: String,

    /// List dataset folders and their record files
    #[arg(short, long)]
    list: bool,

    /// Search record files by name
    #[arg(long)]
    search: Option<String>,

    /// Record file to play (path, or relative to the data dir)
    #[arg(short, long)]
    record: Option<String>,

    /// Scenario index inside the record
    #[arg(short = 'S', long, default_value = "0")]
    scenario: usize,

    /// Playback mode (once, loop, continuous)
    #[arg(short, long)]
    mode: Option<PlaybackMode>,

    /// Playback speed multiplier (0.1 - 16)
    #[arg(long)]
    speed: Option<f64>,

    /// Maximum playback duration in seconds
    #[arg(short, long, default_value = "10")]
    duration: f64,

    /// Host frame rate
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Play on the wall clock instead of the virtual clock
    #[arg(long)]
    realtime: bool,

    /// Layers to hide (e.g. --hide trajectories --hide road-edges)
    #[arg(long)]
    hide: Vec<Layer>,

    /// Export rendered frames to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// Keep every n-th frame in the export
    #[arg(long, default_value = "1")]
    export_interval: usize,

    /// Stream frames to a Rerun viewer (needs the `visualization` feature)
    #[arg(long)]
    visualize: bool,

    /// Viewer config file (JSON)
    #[arg(short, long)]
    config: Option<String>,

    /// JSON output for scripting
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(path: Option<&str>) -> Result<ViewerConfig, SimError> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let config = ViewerConfig::from_json_str(&text)?;
            info!("Loaded config from {}", path);
            Ok(config)
        }
        None => Ok(ViewerConfig::default()),
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), SimError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| SimError::InvalidArgument(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

async fn list(app: &mut App, json: bool) -> Result<(), SimError> {
    let datasets = app.list_datasets().await?;
    if json {
        let mut pages = Vec::new();
        for dataset in &datasets {
            pages.push(app.list_files(&dataset.name, 0).await?);
        }
        return print_json(&serde_json::json!({ "datasets": datasets, "files": pages }));
    }

    if datasets.is_empty() {
        warn!("No dataset folders found under {}", app.provider().root().display());
    }
    for dataset in &datasets {
        info!("{} ({} files)", dataset.name, dataset.file_count);
        let page = app.list_files(&dataset.name, 0).await?;
        for file in &page.files {
            info!("  {} ({:.1} MB)", file.name, file.size_mb);
        }
        if page.has_more {
            info!("  ... {} more", page.total_count - page.files.len());
        }
    }
    Ok(())
}

async fn search(app: &mut App, query: &str, json: bool) -> Result<(), SimError> {
    let page = app.search(query, 0).await?;
    if json {
        return print_json(&page);
    }
    info!("{} matches for \"{}\"", page.total, query);
    for hit in &page.results {
        info!("  {}/{}", hit.folder, hit.file_name);
    }
    Ok(())
}

async fn open_scenario<S: TickScheduler>(
    app: &mut ViewerApp<JsonDirProvider, S>,
    args: &Args,
    record: &str,
) -> Result<(), SimError> {
    app.open_record(record).await?;
    if args.scenario > 0 {
        app.jump_to_scenario(args.scenario).await?;
    }
    if let Some(summary) = app.navigator().current_summary() {
        info!(
            "Playing scenario {} ({}): {} tracks, {} steps",
            summary.index, summary.scenario_id, summary.num_tracks, summary.num_timesteps
        );
    }
    Ok(())
}

async fn play(args: &Args, viewer_config: ViewerConfig, record: &str) -> Result<bool, SimError> {
    let config = RunConfig {
        fps: args.fps,
        duration_sec: args.duration,
        mode: args.mode.unwrap_or(viewer_config.default_mode),
        speed: args.speed.unwrap_or(viewer_config.default_speed),
        hidden_layers: args.hide.clone(),
    };
    let mut export = args.export.as_ref().map(|_| {
        PlaybackExport::new(record, args.scenario, config.mode, config.speed, config.fps)
            .with_frame_interval(args.export_interval)
    });
    let logger = if args.visualize {
        RerunLogger::new("roadview-sim")
    } else {
        RerunLogger::disabled()
    };

    let mut last_frame = None;
    let mut current_scenario = String::new();
    let sink = |frame: &Frame| {
        if frame.scenario_id != current_scenario {
            logger.log_event("events/scenario", &frame.scenario_id);
            current_scenario = frame.scenario_id.clone();
        }
        logger.log_frame(frame);
        if let Some(export) = export.as_mut() {
            export.add_frame(frame);
        }
        last_frame = Some(frame.clone());
    };

    let provider = JsonDirProvider::new(&args.data_dir);
    let summary = if args.realtime {
        let mut app = ViewerApp::with_config(provider, TokioTicker::new(), viewer_config);
        open_scenario(&mut app, args, record).await?;
        RealtimeRunner::new(app, config).run(sink).await?
    } else {
        let mut app = ViewerApp::with_config(provider, ManualTicker::new(), viewer_config);
        open_scenario(&mut app, args, record).await?;
        HeadlessRunner::new(app, config).run(sink).await?
    };

    for notice in &summary.notices {
        logger.log_notice(notice);
        info!("{}", notice);
    }

    if let (Some(export), Some(path)) = (export.as_mut(), args.export.as_ref()) {
        export.finalize(summary.clone(), last_frame.as_ref());
        export.write_to_file(path)?;
        info!("Exported {} frames to {}", export.frames.len(), path);
    }

    if args.json {
        print_json(&summary)?;
    } else {
        info!(
            "{} frames, {} ticks, {:.1}s, final step {}{}",
            summary.frames,
            summary.ticks,
            summary.elapsed_sec,
            summary.final_step,
            if summary.finished { " (finished)" } else { "" }
        );
    }
    Ok(summary.frames > 0)
}

async fn run(args: Args) -> Result<(), SimError> {
    let config = load_config(args.config.as_deref())?;

    if args.list || args.search.is_some() {
        let provider = JsonDirProvider::new(&args.data_dir);
        let mut app = ViewerApp::with_config(provider, ManualTicker::new(), config);
        return match args.search.as_deref() {
            Some(query) if !args.list => search(&mut app, query, args.json).await,
            _ => list(&mut app, args.json).await,
        };
    }

    let record = args.record.clone().ok_or_else(|| {
        SimError::InvalidArgument("one of --list, --search or --record is required".to_string())
    })?;
    if !play(&args, config, &record).await? {
        return Err(SimError::InvalidArgument(format!(
            "{} contains no scenarios",
            record
        )));
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("RoadView headless player v0.1.0");
    }

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
