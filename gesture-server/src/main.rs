use anyhow::{Context, Result};
use clap::Parser;
use gesture_server::{serve, skin_detector_factory, AppState, ServerConfig};
use std::path::PathBuf;
use tokio::net::TcpListener;

#[derive(Parser, Debug)]
#[command(author, version, about = "Pointing-gesture server", long_about = None)]
struct Args {
    /// TOML config file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind (overrides the config)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides the config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Drop frames until the client sends start_tracking
    #[arg(long)]
    require_tracking: bool,

    /// Dead zone for the pointing vector, normalized units
    #[arg(long)]
    direction_threshold: Option<f32>,

    /// Minimum index finger extension, normalized units
    #[arg(long)]
    extension_threshold: Option<f32>,
}

impl Args {
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.require_tracking {
            config.classifier.require_tracking = true;
        }
        if let Some(threshold) = self.direction_threshold {
            config.classifier.direction_threshold = threshold;
        }
        if let Some(threshold) = self.extension_threshold {
            config.classifier.extension_threshold = threshold;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    args.apply(&mut config);
    config.validate().context("Invalid settings")?;

    log::info!("Gesture server starting...");
    log::info!(
        "Direction threshold: {}, extension threshold: {}",
        config.classifier.direction_threshold,
        config.classifier.extension_threshold
    );
    if config.classifier.require_tracking {
        log::info!("Frames are dropped until start_tracking");
    }

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let state = AppState::new(
        config.classifier.clone(),
        skin_detector_factory(config.detector.clone()),
    );
    serve(listener, state).await.context("Server error")?;

    Ok(())
}
