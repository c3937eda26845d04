// Quick throughput check for the chaser pipeline, without criterion statistics

use chaser_bench::{ball_frame, dark_frame};
use chaser_core::PolicyThresholds;
use chaser_drive::{FrameHandler, LogSink};
use chaser_eye::{locate, Locator};
use clap::Parser;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "chaser-bench")]
#[command(about = "Chaser pipeline throughput")]
struct Cli {
    /// Frame width in pixels
    #[arg(long, default_value = "640")]
    width: usize,

    /// Frame height in pixels
    #[arg(long, default_value = "480")]
    height: usize,

    /// Frames per measurement
    #[arg(long, default_value = "1000")]
    iterations: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    if cli.width == 0 || cli.height == 0 || cli.iterations == 0 {
        anyhow::bail!("width, height and iterations must be non-zero");
    }

    println!("Chaser pipeline throughput ({}x{}, {} frames)", cli.width, cli.height, cli.iterations);
    println!("-------------------------------------------------");

    let ball = ball_frame(cli.width, cli.height, cli.width / 2, cli.height / 2, cli.height / 10);
    let dark = dark_frame(cli.width, cli.height);

    for (label, frame) in [("ball", &ball), ("dark", &dark)] {
        let start = Instant::now();
        let mut found = 0usize;
        for _ in 0..cli.iterations {
            if locate(frame, 255).is_found() {
                found += 1;
            }
        }
        let duration = start.elapsed();
        let fps = cli.iterations as f64 / duration.as_secs_f64().max(f64::EPSILON);
        println!("  locate {}: {:?} ({:.0} frames/sec, {} found)", label, duration, fps, found);
    }

    // LogSink output is dropped unless RUST_LOG enables info
    let handler = FrameHandler::new(Arc::new(LogSink::new()), PolicyThresholds::default(), Locator::default());
    let start = Instant::now();
    for _ in 0..cli.iterations {
        handler.handle(&ball);
    }
    let duration = start.elapsed();
    println!(
        "  handle: {:?} ({:.0} frames/sec)",
        duration,
        cli.iterations as f64 / duration.as_secs_f64().max(f64::EPSILON)
    );

    info!("Handler stats: {:?}", handler.stats());
    Ok(())
}
