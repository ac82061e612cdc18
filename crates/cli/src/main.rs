use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;

use facewatch_core::capture::domain::capture_source::{CaptureConstraints, CaptureSource};
use facewatch_core::notify::domain::notifier::Greeting;
use facewatch_core::notify::infrastructure::http_notifier::HttpNotifier;
use facewatch_core::overlay::domain::overlay_renderer::OverlayRenderer;
use facewatch_core::overlay::infrastructure::box_renderer::BoxRenderer;
use facewatch_core::overlay::infrastructure::mesh_renderer::MeshRenderer;
use facewatch_core::overlay::infrastructure::snapshot;
use facewatch_core::pipeline::detection_loop::{CycleObserver, DetectionLoop, LoopConfig};
use facewatch_core::pipeline::scheduler::SchedulePolicy;
use facewatch_core::session::domain::model_session::{ModelVariant, SessionConfig};
use facewatch_core::session::infrastructure::onnx_session_loader::OnnxSessionLoader;
use facewatch_core::shared::constants::{GREETING_AUDIO_URL, GREETING_TEXT_URL};

/// Live face detection from a webcam with an overlay and a one-shot greeting.
#[derive(Parser)]
#[command(name = "facewatch")]
struct Cli {
    /// Camera device.
    #[arg(long, default_value = "/dev/video0")]
    device: String,

    /// Requested capture width (the device may adjust).
    #[arg(long, default_value = "640")]
    width: u32,

    /// Requested capture height (the device may adjust).
    #[arg(long, default_value = "480")]
    height: u32,

    /// Milliseconds between detection cycles.
    #[arg(long, default_value = "1000")]
    interval_ms: u64,

    /// Run cycles back to back instead of on a fixed interval.
    #[arg(long)]
    continuous: bool,

    /// Face model: short-range (bounding boxes) or mesh (468 landmarks).
    #[arg(long, default_value = "short-range")]
    model: String,

    /// Overlay style: box or mesh.
    #[arg(long)]
    style: Option<String>,

    /// Detection confidence threshold (0.0-1.0).
    #[arg(long, default_value = "0.5")]
    confidence: f64,

    /// Keep at most this many detections per frame.
    #[arg(long, default_value = "10")]
    max_detections: usize,

    /// Greeting mood: happy, sad, or neutral.
    #[arg(long, default_value = "neutral")]
    mood: String,

    /// Endpoint for the one-shot greeting message.
    #[arg(long, default_value = GREETING_TEXT_URL)]
    greet_url: String,

    /// Endpoint for the optional audio clip upload.
    #[arg(long, default_value = GREETING_AUDIO_URL)]
    audio_url: String,

    /// Skip the greeting entirely.
    #[arg(long)]
    no_greet: bool,

    /// Pre-recorded audio clip sent along with the greeting.
    #[arg(long)]
    audio_clip: Option<PathBuf>,

    /// Write a composited PNG per cycle into this directory.
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Stop after this many cycles (runs until killed by default).
    #[arg(long)]
    cycles: Option<u64>,

    /// Directory checked for pre-packaged model weights.
    #[arg(long)]
    bundled_models: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = LoopConfig {
        policy: if cli.continuous {
            SchedulePolicy::Continuous
        } else {
            SchedulePolicy::FixedInterval(Duration::from_millis(cli.interval_ms))
        },
        constraints: CaptureConstraints {
            width: cli.width,
            height: cli.height,
        },
        session: SessionConfig {
            variant: parse_model(&cli.model),
            max_detections: cli.max_detections,
            confidence: cli.confidence,
        },
    };

    let mut loader = OnnxSessionLoader::new().with_download_progress(download_progress);
    if let Some(dir) = cli.bundled_models.clone() {
        loader = loader.with_bundled_dir(dir);
    }

    let mut detection_loop = DetectionLoop::new(
        Box::new(loader),
        build_capture(&cli.device)?,
        build_renderer(&cli),
        config,
    )
    .with_observer(build_observer(&cli));

    if !cli.no_greet {
        let mut greeting = Greeting::for_mood(&cli.mood);
        if let Some(clip) = cli.audio_clip.clone() {
            greeting = greeting.with_audio_clip(clip);
        }
        let notifier = HttpNotifier::new(cli.greet_url.clone(), Some(cli.audio_url.clone()));
        detection_loop = detection_loop.with_notifier(Box::new(notifier), greeting);
    }

    detection_loop.run()?;
    eprintln!();
    Ok(())
}

#[cfg(target_os = "linux")]
fn build_capture(device: &str) -> Result<Box<dyn CaptureSource>, Box<dyn std::error::Error>> {
    use facewatch_core::capture::infrastructure::v4l2_capture::V4l2Capture;
    Ok(Box::new(V4l2Capture::new(device)))
}

#[cfg(not(target_os = "linux"))]
fn build_capture(_device: &str) -> Result<Box<dyn CaptureSource>, Box<dyn std::error::Error>> {
    Err("camera capture is only supported on Linux (Video4Linux2)".into())
}

fn build_renderer(cli: &Cli) -> Box<dyn OverlayRenderer> {
    // Default the overlay style to whatever the model produces.
    let style = cli.style.clone().unwrap_or_else(|| {
        match parse_model(&cli.model) {
            ModelVariant::ShortRange => "box".to_string(),
            ModelVariant::Mesh => "mesh".to_string(),
        }
    });
    if style == "mesh" {
        Box::new(MeshRenderer::new())
    } else {
        Box::new(BoxRenderer::new())
    }
}

fn build_observer(cli: &Cli) -> CycleObserver {
    let snapshot_dir = cli.snapshot_dir.clone();
    let cycle_limit = cli.cycles;

    Box::new(move |index, frame, detections, surface| {
        eprint!("\rcycle {index}: {} face(s) detected   ", detections.len());

        if let Some(dir) = &snapshot_dir {
            let path = dir.join(format!("cycle_{index:06}.png"));
            if let Err(e) = snapshot::save_snapshot(frame, surface, &path) {
                log::warn!("snapshot failed: {e}");
            }
        }

        match cycle_limit {
            Some(limit) => index + 1 < limit,
            None => true,
        }
    })
}

fn parse_model(model: &str) -> ModelVariant {
    if model == "mesh" {
        ModelVariant::Mesh
    } else {
        ModelVariant::ShortRange
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if cli.interval_ms == 0 && !cli.continuous {
        return Err("Interval must be at least 1 ms (or use --continuous)".into());
    }
    if cli.model != "short-range" && cli.model != "mesh" {
        return Err(format!("Model must be 'short-range' or 'mesh', got '{}'", cli.model).into());
    }
    if let Some(style) = &cli.style {
        if style != "box" && style != "mesh" {
            return Err(format!("Style must be 'box' or 'mesh', got '{style}'").into());
        }
    }
    if let Some(limit) = cli.cycles {
        if limit == 0 {
            return Err("Cycle limit must be at least 1".into());
        }
    }
    if let Some(clip) = &cli.audio_clip {
        if !clip.exists() {
            return Err(format!("Audio clip not found: {}", clip.display()).into());
        }
    }
    if let Some(dir) = &cli.snapshot_dir {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("Cannot create snapshot directory {}: {e}", dir.display()))?;
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face model... {pct}%");
    } else {
        eprint!("\rDownloading face model... {downloaded} bytes");
    }
}
