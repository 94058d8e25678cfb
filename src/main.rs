//! Gazeguard — webcam attention monitor, replay/demo binary.
//!
//! Feeds a scripted or recorded gaze session through the inference
//! core and logs the triggers a host player would receive. Live
//! detector integration happens in the embedding application; this
//! binary exists for tuning thresholds against recorded traces.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};

use gazeguard::attention::controller::{ControllerConfig, FocusController};
use gazeguard::attention::calibration::CaptureOutcome;
use gazeguard::clock::SystemClock;
use gazeguard::frame_source::synthetic_frame;

#[derive(Parser, Debug)]
#[command(
    name = "gazeguard",
    about = "Webcam-gaze attention monitor — pauses playback when focus is lost"
)]
struct Cli {
    /// Replay a gaze trace file (see trace format in the README of
    /// the embedding app); mutually exclusive with --demo
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Run the built-in demo session
    #[arg(long)]
    demo: bool,

    /// Frame-pacing speed multiplier for replay (debounce dwells stay
    /// wall-clock; shorten them with the dwell flags when compressing)
    #[arg(long, default_value = "1.0")]
    speed: f64,

    /// Override the out-of-region pause dwell (milliseconds)
    #[arg(long)]
    pause_dwell_ms: Option<u64>,

    /// Override the stillness zone-out dwell (milliseconds)
    #[arg(long)]
    still_dwell_ms: Option<u64>,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

/// One parsed step of a trace.
#[derive(Debug, Clone)]
enum TraceStep {
    /// Present a frame at this gaze and capture a calibration corner.
    Calibrate { x: f64, y: f64 },
    /// One detected frame, `dt` after the previous step.
    Frame {
        dt: Duration,
        x: f64,
        y: f64,
        openness: f64,
        down_score: f64,
    },
    /// One face-less tick, `dt` after the previous step.
    Gap { dt: Duration },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("gazeguard {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gazeguard=info".into()),
        )
        .init();

    if cli.speed <= 0.0 {
        bail!("--speed must be positive, got {}", cli.speed);
    }

    let steps = match (&cli.trace, cli.demo) {
        (Some(path), false) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read trace {}", path.display()))?;
            parse_trace(&text)?
        }
        (None, _) => demo_script(),
        (Some(_), true) => bail!("--trace and --demo are mutually exclusive"),
    };

    let mut config = ControllerConfig::default();
    if let Some(ms) = cli.pause_dwell_ms {
        config.spatial.dwell = Duration::from_millis(ms);
    }
    if let Some(ms) = cli.still_dwell_ms {
        config.stability.dwell = Duration::from_millis(ms);
    }

    run(steps, cli.speed, config)
}

/// Parse the whitespace trace format:
/// `cal <x> <y>` / `frame <dt_ms> <x> <y> <openness> [down_score]` /
/// `gap <dt_ms>`; `#` starts a comment.
fn parse_trace(text: &str) -> anyhow::Result<Vec<TraceStep>> {
    let mut steps = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let keyword = fields.next().unwrap_or_default();
        let step = match keyword {
            "cal" => TraceStep::Calibrate {
                x: parse_field(&mut fields, "x")?,
                y: parse_field(&mut fields, "y")?,
            },
            "frame" => {
                let dt_ms: u64 = parse_field(&mut fields, "dt_ms")?;
                TraceStep::Frame {
                    dt: Duration::from_millis(dt_ms),
                    x: parse_field(&mut fields, "x")?,
                    y: parse_field(&mut fields, "y")?,
                    openness: parse_field(&mut fields, "openness")?,
                    down_score: fields
                        .next()
                        .map(str::parse)
                        .transpose()
                        .context("invalid down_score")?
                        .unwrap_or(0.0),
                }
            }
            "gap" => {
                let dt_ms: u64 = parse_field(&mut fields, "dt_ms")?;
                TraceStep::Gap {
                    dt: Duration::from_millis(dt_ms),
                }
            }
            other => bail!("line {}: unknown trace keyword '{other}'", idx + 1),
        };
        steps.push(step);
    }
    Ok(steps)
}

fn parse_field<T: std::str::FromStr>(
    fields: &mut std::str::SplitWhitespace<'_>,
    name: &str,
) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    fields
        .next()
        .with_context(|| format!("missing field '{name}'"))?
        .parse()
        .with_context(|| format!("invalid field '{name}'"))
}

/// Built-in session: calibrate, hold focus, drift off-screen long
/// enough to pause, return, then stare long enough to zone out.
fn demo_script() -> Vec<TraceStep> {
    let mut steps = vec![
        TraceStep::Calibrate { x: 0.2, y: 0.2 },
        TraceStep::Calibrate { x: 0.8, y: 0.2 },
        TraceStep::Calibrate { x: 0.2, y: 0.8 },
        TraceStep::Calibrate { x: 0.8, y: 0.8 },
    ];
    let frame = |x: f64, y: f64| TraceStep::Frame {
        dt: Duration::from_millis(33),
        x,
        y,
        openness: 0.1,
        down_score: 0.0,
    };
    // ~2 s of engaged viewing, gaze jittering around center.
    for i in 0..60 {
        let jitter = if i % 2 == 0 { 0.02 } else { -0.02 };
        steps.push(frame(0.5 + jitter, 0.5 - jitter));
    }
    // ~6 s off to the side: the pause trigger fires at 5 s.
    for _ in 0..180 {
        steps.push(frame(0.95, 0.5));
    }
    // Brief return to center.
    for i in 0..30 {
        let jitter = if i % 2 == 0 { 0.02 } else { -0.02 };
        steps.push(frame(0.5 + jitter, 0.5));
    }
    // ~11 s of a fixed stare: the zone-out trigger fires at 10 s.
    for _ in 0..330 {
        steps.push(frame(0.5, 0.5));
    }
    steps
}

fn run(steps: Vec<TraceStep>, speed: f64, config: ControllerConfig) -> anyhow::Result<()> {
    let mut controller = FocusController::new(
        config,
        Arc::new(SystemClock),
        Box::new(|| {
            warn!("attention check requested: sustained stillness");
            Ok(())
        }),
        Box::new(|| {
            warn!("player pause requested: gaze left the calibrated region");
            Ok(())
        }),
    );

    info!("replaying {} steps at {speed}x", steps.len());
    for step in steps {
        match step {
            TraceStep::Calibrate { x, y } => {
                controller.tick(Some(synthetic_frame(x, y, 0.1, 0.0)));
                match controller.capture_calibration_point() {
                    CaptureOutcome::Pending { next } => {
                        info!("calibration point captured; look {}", next.as_str());
                    }
                    CaptureOutcome::Complete(_) => info!("calibration complete"),
                    CaptureOutcome::Failed(e) => warn!("calibration failed: {e}"),
                    CaptureOutcome::NoSample => warn!("calibration capture skipped"),
                }
            }
            TraceStep::Frame {
                dt,
                x,
                y,
                openness,
                down_score,
            } => {
                thread::sleep(dt.div_f64(speed));
                controller.tick(Some(synthetic_frame(x, y, openness, down_score)));
            }
            TraceStep::Gap { dt } => {
                thread::sleep(dt.div_f64(speed));
                controller.tick(None);
            }
        }
    }

    info!("final status: {}", controller.status_sexp());
    Ok(())
}
