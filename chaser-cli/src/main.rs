// chaser command line
// Drives the ball-chasing controller over image directories or a synthetic sweep

mod source;

use anyhow::Context;
use chaser_core::{ChaserConfig, Frame, PixelMatch};
use chaser_drive::{
    frame_channel, ChannelFrameSender, CommandSink, FrameHandler, FrameLoop, JsonLinesSink,
};
use clap::{Args, Parser, Subcommand};
use source::{DirectorySource, SyntheticSource};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chaser")]
#[command(about = "Visual-servo ball chaser: turns camera frames into velocity commands", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed every image in a directory through the controller
    Run {
        /// Directory of frames, processed in file name order
        #[arg(long)]
        frames: PathBuf,

        /// Configuration file (TOML, YAML or JSON)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Where to write commands as JSON lines ("-" for stdout)
        #[arg(long, short, default_value = "-")]
        output: String,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Chase a synthetic ball sweeping across the frame
    Simulate {
        /// Frame width in pixels
        #[arg(long, default_value = "640")]
        width: usize,

        /// Frame height in pixels
        #[arg(long, default_value = "480")]
        height: usize,

        /// Number of frames in the sweep
        #[arg(long, default_value = "30")]
        frames: usize,

        /// Frames produced per second
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Configuration file (TOML, YAML or JSON)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Where to write commands as JSON lines ("-" for stdout)
        #[arg(long, short, default_value = "-")]
        output: String,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Load and validate a configuration file, then print the effective config
    CheckConfig {
        /// Configuration file path
        file: PathBuf,
    },
}

/// Command line overrides, applied after the file and environment
#[derive(Args, Default)]
struct Overrides {
    /// Pixel intensity that marks the target
    #[arg(long)]
    brightness_threshold: Option<u8>,

    /// Forward speed when the target is centered
    #[arg(long)]
    linear_speed: Option<f64>,

    /// Turn rate when the target is off to one side
    #[arg(long)]
    angular_speed: Option<f64>,

    /// Pixel matching rule (exact, at_least)
    #[arg(long)]
    pixel_match: Option<PixelMatch>,

    /// Frames buffered while the controller is busy
    #[arg(long)]
    queue_depth: Option<usize>,

    /// Filled from the global --log-level flag
    #[arg(skip)]
    log_level: Option<String>,
}

impl Overrides {
    fn apply(&self, config: &mut ChaserConfig) {
        if let Some(v) = self.brightness_threshold {
            config.thresholds.brightness_threshold = v;
        }
        if let Some(v) = self.linear_speed {
            config.thresholds.linear_speed = v;
        }
        if let Some(v) = self.angular_speed {
            config.thresholds.angular_speed = v;
        }
        if let Some(v) = self.pixel_match {
            config.locator.matching = v;
        }
        if let Some(v) = self.queue_depth {
            config.runtime.frame_queue_depth = v;
        }
        if let Some(v) = &self.log_level {
            config.runtime.log_level = v.clone();
        }
    }
}

/// File (or defaults), then environment, then flags
fn load_config(path: Option<&PathBuf>, overrides: &Overrides) -> anyhow::Result<ChaserConfig> {
    load_config_with(path, overrides, |key| std::env::var(key).ok())
}

fn load_config_with<F>(
    path: Option<&PathBuf>,
    overrides: &Overrides,
    env: F,
) -> anyhow::Result<ChaserConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => ChaserConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ChaserConfig::default(),
    };
    config
        .apply_overrides(env)
        .context("Invalid CHASER_* environment variable")?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

type OutputSink = JsonLinesSink<Box<dyn Write + Send>>;

fn open_output(output: &str) -> anyhow::Result<Arc<OutputSink>> {
    let writer: Box<dyn Write + Send> = if output == "-" {
        Box::new(io::stdout())
    } else {
        let file = File::create(output).with_context(|| format!("Failed to create {}", output))?;
        Box::new(BufWriter::new(file))
    };
    Ok(Arc::new(JsonLinesSink::new(writer)))
}

/// Shutdown signal flipped by Ctrl-C
fn ctrl_c_shutdown() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, shutting down");
            let _ = tx.send(true);
        }
    });
    rx
}

fn report(handler: &FrameHandler) {
    let stats = handler.stats();
    info!(
        "Processed {} frames: {} with target, {} stops, {} dispatch failures",
        stats.frames, stats.targets_found, stats.stops, stats.dispatch_failures
    );
}

async fn run_frames(
    frames: PathBuf,
    config: ChaserConfig,
    output: String,
) -> anyhow::Result<()> {
    let sink = open_output(&output)?;
    let handler = Arc::new(FrameHandler::from_config(&config, sink.clone())?);
    let mut source = DirectorySource::open(&frames)
        .with_context(|| format!("Failed to read frames from {}", frames.display()))?;

    info!(
        "Chasing over {} frames from {} (commands to {}, service {})",
        source.remaining(),
        frames.display(),
        sink.name(),
        config.runtime.command_service
    );

    FrameLoop::new(handler.clone())
        .with_shutdown(ctrl_c_shutdown())
        .run(&mut source)
        .await;

    report(&handler);
    Ok(())
}

async fn simulate(
    width: usize,
    height: usize,
    frames: usize,
    fps: u32,
    config: ChaserConfig,
    output: String,
) -> anyhow::Result<()> {
    if width == 0 || height == 0 {
        anyhow::bail!("Frame size must be non-zero, got {}x{}", width, height);
    }

    let sink = open_output(&output)?;
    let handler = Arc::new(FrameHandler::from_config(&config, sink)?);
    let (sender, source) = frame_channel(config.runtime.frame_queue_depth);
    let consumer = FrameLoop::new(handler.clone())
        .with_shutdown(ctrl_c_shutdown())
        .spawn(source);

    info!(
        "Simulating {} frames of {}x{} on {} at {} fps",
        frames, width, height, config.runtime.camera_topic, fps
    );

    let sweep = SyntheticSource::new(width, height, frames);
    let produced = produce(sweep, &sender, Duration::from_secs(1) / fps.max(1)).await;
    drop(sender);

    let handled = consumer.await.context("Frame loop task failed")?;
    if produced.dropped > 0 {
        warn!(
            "Dropped {} of {} frames while the controller was busy",
            produced.dropped, produced.offered
        );
    }
    info!("Handled {} frames", handled);
    report(&handler);
    Ok(())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Produced {
    offered: usize,
    dropped: usize,
}

/// Offer one frame per `period` until the frames run out or the consumer
/// stops. Only frames refused by a full queue count as dropped.
async fn produce<I>(frames: I, sender: &ChannelFrameSender, period: Duration) -> Produced
where
    I: IntoIterator<Item = Frame>,
{
    let mut ticker = tokio::time::interval(period);
    let mut produced = Produced::default();

    for frame in frames {
        tokio::select! {
            biased;
            _ = sender.closed() => break,
            _ = ticker.tick() => {}
        }
        let accepted = sender.offer(frame);
        if !accepted && sender.is_closed() {
            break;
        }
        produced.offered += 1;
        if !accepted {
            produced.dropped += 1;
        }
    }

    produced
}

fn check_config(file: PathBuf, overrides: &Overrides) -> anyhow::Result<()> {
    let config = load_config(Some(&file), overrides)?;
    info!("Configuration in {} is valid", file.display());
    print!("{}", config.to_toml()?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            frames,
            config,
            output,
            mut overrides,
        } => {
            overrides.log_level = cli.log_level;
            let config = load_config(config.as_ref(), &overrides)?;
            init_logging(&config.runtime.log_level);
            run_frames(frames, config, output).await?;
        }
        Commands::Simulate {
            width,
            height,
            frames,
            fps,
            config,
            output,
            mut overrides,
        } => {
            overrides.log_level = cli.log_level;
            let config = load_config(config.as_ref(), &overrides)?;
            init_logging(&config.runtime.log_level);
            simulate(width, height, frames, fps, config, output).await?;
        }
        Commands::CheckConfig { file } => {
            let overrides = Overrides {
                log_level: cli.log_level,
                ..Overrides::default()
            };
            check_config(file, &overrides)?;
        }
    }

    Ok(())
}
