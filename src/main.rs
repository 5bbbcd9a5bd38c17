use anyhow::{bail, Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;

use hls_player::player::{MediaPlayerBuilder, PlayerEvent, PlayerEventHandler, QualitySelection};
use hls_player::sim::{SimulatedEngineFactory, SimulatedFullscreen, SimulatedSink};
use hls_player::utils::{format_duration, Config};
use hls_player::{BackendKind, EngineEvent};

/// hls-player - drive the playback-control core against a simulated stream
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Stream URI to open
    #[arg(value_name = "URI")]
    uri: Option<String>,

    /// Rendition heights the simulated engine advertises
    #[arg(long, value_delimiter = ',', default_value = "1080,720,480")]
    levels: Vec<u32>,

    /// Media length in seconds
    #[arg(long, default_value = "120")]
    duration: f64,

    /// Simulate a host without the adaptive engine (sink plays HLS natively)
    #[arg(long)]
    native: bool,

    /// Quality to select after the manifest is parsed (`auto` or e.g. `720p`)
    #[arg(short, long, value_name = "QUALITY")]
    quality: Option<String>,

    /// Seek to this position in seconds
    #[arg(short, long, value_name = "SECONDS")]
    seek: Option<f64>,

    /// Volume level (0-100)
    #[arg(short, long, value_name = "VOLUME")]
    volume: Option<i32>,

    /// Let the simulated clock run this many seconds
    #[arg(long, value_name = "SECONDS", default_value = "0")]
    play_for: u32,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Configuration file (defaults to the user config)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::load().context("Failed to load config")?,
    };

    // Initialize logging
    let log_level = if args.debug { "debug" } else { config.general.log_level.as_str() };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("Starting hls-player v{}", env!("CARGO_PKG_VERSION"));

    let (factory, sink) = if args.native {
        (
            SimulatedEngineFactory::unsupported(),
            SimulatedSink::new()
                .with_native_hls(true)
                .with_duration(args.duration),
        )
    } else {
        (
            SimulatedEngineFactory::new(args.levels.clone(), args.duration),
            SimulatedSink::new().with_duration(args.duration),
        )
    };

    let mut player = MediaPlayerBuilder::new()
        .with_config(config)
        .with_sink(sink.clone())
        .with_engine_factory(Arc::new(factory.clone()))
        .with_fullscreen_host(SimulatedFullscreen::new())
        .with_event_handler(Box::new(LoggingEventHandler))
        .build()?;

    let _event_sub = player.subscribe_events(|event| match event {
        PlayerEvent::SessionOpened { ref uri, backend } => {
            info!("Session opened: {} ({:?})", uri, backend)
        }
        PlayerEvent::SessionClosed => info!("Session closed"),
        PlayerEvent::Error { ref message } => error!("Player error: {}", message),
        _ => {}
    });

    player.load(args.uri.as_deref());

    if player.backend() == Some(BackendKind::Adaptive) {
        player.handle_engine_event(EngineEvent::ManifestParsed);
        player.handle_engine_event(EngineEvent::LevelLoaded {
            total_duration: factory.total_duration(),
        });
    }

    if let Some(quality) = args.quality.as_deref() {
        let selection = parse_quality(quality)?;
        if !player.set_selection(selection) {
            error!("Quality {} is not available", selection);
        }
    }

    if let Some(volume) = args.volume {
        player.set_level(volume);
    }

    if let Some(position) = args.seek {
        player.seek(position);
    }

    for _ in 0..args.play_for {
        for event in sink.advance(1.0) {
            player.handle_sink_event(event);
        }
    }

    let snapshot = player.snapshot();
    info!(
        "Position {} / {}",
        format_duration(snapshot.duration.current),
        format_duration(snapshot.duration.total)
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    player.shutdown();
    Ok(())
}

/// Parse `auto`, `720p` or `720`
fn parse_quality(value: &str) -> Result<QualitySelection> {
    let value = value.trim().to_ascii_lowercase();
    if value == "auto" {
        return Ok(QualitySelection::Auto);
    }

    let digits = value.strip_suffix('p').unwrap_or(&value);
    match digits.parse::<u32>() {
        Ok(height) => Ok(QualitySelection::Fixed(height)),
        Err(_) => bail!("Invalid quality '{}', expected 'auto' or a height like '720p'", value),
    }
}

/// Event handler that logs events
struct LoggingEventHandler;

impl PlayerEventHandler for LoggingEventHandler {
    fn handle_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::DurationChanged { duration } => {
                // Position changes are frequent
                log::debug!("Position: {:.1}s / {:.1}s", duration.current, duration.total);
            }
            PlayerEvent::RenditionsChanged { renditions } => {
                let labels: Vec<String> = renditions.iter().map(|r| r.label()).collect();
                info!("Renditions: [{}]", labels.join(", "));
            }
            PlayerEvent::SelectionChanged { selection } => info!("Quality: {}", selection),
            PlayerEvent::PlaybackStateChanged { state } => info!("Playback: {:?}", state),
            PlayerEvent::VolumeChanged { volume } => {
                info!("Volume: {}% ({:?})", volume.level, volume.icon());
            }
            _ => {
                // Other events are handled by the main event subscription
            }
        }
    }
}
