//! gesture_relay - hand gesture to UDP command relay
//!
//! This daemon:
//! 1. Reads landmark frames from the configured source (synthetic, UDP, or recording)
//! 2. Classifies the first hand of each frame into a command
//! 3. Debounces repeats and sends commands to the actuator over UDP
//! 4. Renders the command overlay on stderr
//!
//! Ctrl-C stops the loop after the current frame.

use anyhow::Result;
use clap::Parser;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use gesture_relay::{
    frame_time, CommandSink, GesturePipeline, LandmarkSource, LogSink, RelayConfig, SourceEvent,
    UdpCommandSink,
};

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(author, version, about = "Relay hand gestures to a UDP actuator")]
struct Args {
    /// JSON config file.
    #[arg(long, env = "GESTURE_CONFIG")]
    config: Option<PathBuf>,

    /// Landmark source (stub://name, udp://host:port, or a JSON Lines path; - for stdin).
    #[arg(long)]
    source: Option<String>,

    /// Actuator address (host:port).
    #[arg(long)]
    sink: Option<String>,

    /// Classify and log without sending anything.
    #[arg(long)]
    dry_run: bool,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,

    /// UI mode for the stderr overlay (auto|plain|pretty).
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut ui = ui::Ui::from_args(Some(&args.ui), std::io::stderr().is_terminal());
    let log_prefix = ui.log_prefix();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(move |buf, record| {
            writeln!(
                buf,
                "{}[{} {:<5} {}] {}",
                log_prefix,
                buf.timestamp(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let mut cfg = RelayConfig::load_from(args.config.as_deref())?;
    if let Some(source) = args.source {
        cfg.source.url = source;
    }
    if let Some(sink) = args.sink {
        cfg.sink_addr = sink;
    }
    cfg.validate()?;

    let sink: Box<dyn CommandSink> = if args.dry_run {
        log::info!("dry run: commands are logged, not sent");
        Box::new(LogSink::new())
    } else {
        Box::new(UdpCommandSink::new(&cfg.sink_addr)?)
    };

    let mut source = LandmarkSource::new(cfg.source.clone())?;
    source.connect()?;

    let mut pipeline = GesturePipeline::new(cfg.pipeline, sink);

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;
    }

    log::info!(
        "gesture_relay running. source={} sink={} reset_on_hand_loss={}",
        cfg.source.url,
        if args.dry_run { "dry-run" } else { cfg.sink_addr.as_str() },
        cfg.pipeline.reset_on_hand_loss
    );

    let origin = Instant::now();
    let mut last_health_log = Instant::now();

    while running.load(Ordering::SeqCst) {
        if let Some(max) = args.max_frames {
            if pipeline.stats().frames >= max {
                break;
            }
        }

        let frame = match source.next_event()? {
            SourceEvent::Frame(frame) => frame,
            SourceEvent::Idle => continue,
            SourceEvent::Ended => {
                log::info!("landmark source ended");
                break;
            }
        };

        let now = frame_time(origin, &frame);
        let report = pipeline.process_frame(&frame, now);
        ui.show(pipeline.display_command(), &report);

        if last_health_log.elapsed() >= Duration::from_secs(5) {
            let source_stats = source.stats();
            let stats = pipeline.stats();
            log::info!(
                "source health={} frames={} hand_frames={} sent={} send_failures={} source={}",
                source.is_healthy(),
                source_stats.frames_received,
                stats.frames_with_hand,
                stats.dispatched,
                stats.send_failures,
                source_stats.source
            );
            last_health_log = Instant::now();
        }
    }

    ui.finish();
    let stats = pipeline.stats();
    log::info!(
        "gesture_relay stopped after {} frames ({} commands sent, {} send failures)",
        stats.frames,
        stats.dispatched,
        stats.send_failures
    );
    Ok(())
}
