//! Replay a recorded detection stream through an assessment session.
//!
//! Usage:
//!   golden-face-replay <recording.json>                    # Summary on stdout
//!   golden-face-replay <recording.json> --json             # One JSON report per frame
//!   golden-face-replay <recording.json> --seed 7 --log results.jsonl
//!
//! A recording is a JSON object with a `frames` array. Each frame carries its
//! offset from the start of the session and the detector output for it:
//!
//! ```json
//! { "frames": [ { "offset_ms": 0, "detections": [ { "face_box": {...}, "landmarks": {...} } ] } ] }
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use golden_face::{
    Detection, FaceDetector, FrameReport, JsonlAssessmentLog, ReferenceProfile, ScoringEngine,
    Session, SessionConfig, SessionState, VarianceSource,
};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "golden-face-replay")]
#[command(author, version, about = "Replay recorded face detections through an assessment session", long_about = None)]
struct Args {
    /// Recorded detections (JSON)
    #[arg(required = true)]
    recording: PathBuf,

    /// Append-only assessment log
    #[arg(short, long, default_value = "assessments.jsonl")]
    log: PathBuf,

    /// Session length in seconds (default: GOLDEN_FACE_SESSION_SECS or 60)
    #[arg(short, long)]
    duration: Option<u64>,

    /// Seed for the session variance
    #[arg(long, conflicts_with = "variance")]
    seed: Option<u64>,

    /// Use this exact session variance instead of a random one
    #[arg(long, allow_hyphen_values = true)]
    variance: Option<f64>,

    /// Reference profile (.json or bincode) to compare the first face against
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Print every frame report as a JSON line
    #[arg(long)]
    json: bool,

    /// Show debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Deserialize)]
struct Recording {
    frames: Vec<RecordedFrame>,
}

#[derive(Debug, Deserialize)]
struct RecordedFrame {
    offset_ms: u64,
    #[serde(default)]
    detections: Vec<Detection>,
}

/// Plays back what the live detector reported for each recorded frame.
struct PlaybackDetector;

impl FaceDetector for PlaybackDetector {
    type Image = RecordedFrame;

    fn detect(&self, frame: &RecordedFrame) -> Vec<Detection> {
        frame.detections.clone()
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(env_filter).with_target(true).with_writer(std::io::stderr).init();
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = SessionConfig::from_env();
    if let Some(duration) = args.duration {
        config.duration_secs = duration;
    }

    let variance_source = match (args.variance, args.seed) {
        (Some(value), _) => VarianceSource::fixed(value),
        (None, Some(seed)) => VarianceSource::seeded(seed),
        (None, None) => VarianceSource::from_entropy(),
    };

    let recording: Recording = serde_json::from_reader(std::io::BufReader::new(
        std::fs::File::open(&args.recording)?,
    ))?;
    tracing::info!(frames = recording.frames.len(), path = %args.recording.display(), "loaded recording");

    let profile = args.profile.as_ref().map(ReferenceProfile::load).transpose()?;

    let detector = PlaybackDetector;
    let engine = ScoringEngine::new(&detector);
    let mut sink = JsonlAssessmentLog::new(&args.log);
    let mut session = Session::new(config, variance_source)?;

    let t0 = Instant::now();
    session.start(t0);

    let mut compared = false;
    let mut last_report: Option<FrameReport> = None;

    for frame in &recording.frames {
        let now = t0 + Duration::from_millis(frame.offset_ms);

        if let (Some(profile), false) = (&profile, compared) {
            if let Ok(scored) = engine.score_image(frame) {
                let similarity = scored.analysis.similarity_ratio(profile)?;
                println!("Profile similarity: {:.4}", similarity);
                compared = true;
            }
        }

        let report = engine.process_frame(&mut session, frame, now, &mut sink)?;
        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        }
        last_report = Some(report);
    }

    if let Some(last) = recording.frames.last() {
        let end = t0 + Duration::from_millis(last.offset_ms);
        if session.state() == SessionState::Assessing {
            last_report = Some(session.conclude(end, &mut sink));
        }
    }

    match last_report {
        Some(report) => print_summary(&report),
        None => println!("Recording contains no frames."),
    }

    Ok(())
}

fn print_summary(report: &FrameReport) {
    match report.state {
        SessionState::Finalized => {
            let score = report.final_score.unwrap_or_default();
            println!("Assessment complete: final beauty score {}%", score as i64);
        }
        SessionState::NoAssessment => {
            println!("Assessment impossible: no face was scored during the session.");
        }
        SessionState::Assessing => {
            let remaining = report.remaining_time.as_deref().unwrap_or("--:--");
            match report.display_score {
                Some(avg) => println!("Still assessing ({} left), current average {}%", remaining, avg as i64),
                None => println!("Still assessing ({} left), no face scored yet", remaining),
            }
        }
        SessionState::Idle => println!("Session never started."),
    }
}
