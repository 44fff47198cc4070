//! Timed assessment sessions.
//!
//! A [`Session`] turns a stream of per-frame scores into one final result:
//!
//! ```text
//! Idle --start--> Assessing --window elapsed + scored frame--> Finalized
//!                     |
//!                     +--conclude, window elapsed, nothing scored--> NoAssessment
//! ```
//!
//! While assessing, each scored frame is appended and the running mean is
//! reported. The first scored frame after the window closes finalizes the
//! session: `clamp(mean + variance, 50, 99)`, where `variance` was drawn once
//! at [`Session::start`]. The result is handed to the sink exactly once.
//!
//! Rejected frames (no face, degenerate geometry) never touch the scores and
//! never change the state. Time is always supplied by the caller, so a
//! session can be replayed deterministically.

use std::time::{Duration, Instant};

use chrono::Local;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::error::Result;
use crate::score::clamp_final;
use crate::sink::{AssessmentRecord, AssessmentSink};

/// Where the per-session variance comes from.
#[derive(Debug, Clone)]
pub enum VarianceSource {
    Random(StdRng),
    Fixed(f64),
}

impl VarianceSource {
    pub fn from_entropy() -> Self {
        VarianceSource::Random(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        VarianceSource::Random(StdRng::seed_from_u64(seed))
    }

    /// Always yields `value`, regardless of the configured spread.
    pub fn fixed(value: f64) -> Self {
        VarianceSource::Fixed(value)
    }

    fn draw(&mut self, spread: f64) -> f64 {
        match self {
            VarianceSource::Random(rng) => rng.gen_range(-spread..=spread),
            VarianceSource::Fixed(value) => *value,
        }
    }
}

impl Default for VarianceSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Assessing,
    Finalized,
    /// The window closed without a single scored frame.
    NoAssessment,
}

/// What one frame contributed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FrameObservation {
    /// A normalized per-frame score.
    Scored(f64),
    NoDetection,
    DegenerateGeometry,
}

impl FrameObservation {
    pub fn status(&self) -> FrameStatus {
        match self {
            FrameObservation::Scored(_) => FrameStatus::Scored,
            FrameObservation::NoDetection => FrameStatus::NoDetection,
            FrameObservation::DegenerateGeometry => FrameStatus::DegenerateGeometry,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameStatus {
    Scored,
    NoDetection,
    DegenerateGeometry,
}

/// Snapshot handed to whatever renders the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub state: SessionState,
    /// Status of the frame that produced this report, if any.
    pub frame: Option<FrameStatus>,
    /// Running mean while assessing, the final score once finalized.
    pub display_score: Option<f64>,
    /// `MM:SS` left in the window while assessing.
    pub remaining_time: Option<String>,
    pub final_score: Option<f64>,
    pub persisted: bool,
}

/// State of one assessment. Each concurrent user needs their own.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    variance_source: VarianceSource,
    state: SessionState,
    started_at: Option<Instant>,
    scores: Vec<f64>,
    variance: f64,
    final_score: Option<f64>,
    persisted: bool,
}

impl Session {
    pub fn new(config: SessionConfig, variance_source: VarianceSource) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            variance_source,
            state: SessionState::Idle,
            started_at: None,
            scores: Vec::new(),
            variance: 0.0,
            final_score: None,
            persisted: false,
        })
    }

    /// Begin a new assessment window at `now`, discarding any previous one.
    pub fn start(&mut self, now: Instant) {
        self.state = SessionState::Assessing;
        self.started_at = Some(now);
        self.scores.clear();
        self.variance = self.variance_source.draw(self.config.variance_spread);
        self.final_score = None;
        self.persisted = false;
        tracing::info!(
            duration_secs = self.config.duration_secs,
            variance = self.variance,
            "assessment session started"
        );
    }

    /// Apply one frame.
    ///
    /// A non-finite score counts as degenerate geometry.
    pub fn update<S: AssessmentSink + ?Sized>(
        &mut self,
        observation: FrameObservation,
        now: Instant,
        sink: &mut S,
    ) -> FrameReport {
        let observation = match observation {
            FrameObservation::Scored(score) if !score.is_finite() => {
                tracing::debug!(score, "non-finite frame score");
                FrameObservation::DegenerateGeometry
            }
            other => other,
        };

        if self.state != SessionState::Assessing {
            tracing::trace!(state = ?self.state, "frame outside an active window ignored");
            return self.report_with(now, Some(observation.status()));
        }

        let expired = self.is_expired(now);
        match observation {
            FrameObservation::Scored(score) if !expired => {
                self.scores.push(score);
                tracing::debug!(score, samples = self.scores.len(), "frame scored");
            }
            FrameObservation::Scored(score) => self.finalize(Some(score), sink),
            FrameObservation::NoDetection | FrameObservation::DegenerateGeometry => {
                tracing::debug!(status = ?observation.status(), "frame rejected");
            }
        }

        self.report_with(now, Some(observation.status()))
    }

    /// Close an elapsed window without waiting for another scored frame.
    ///
    /// Does nothing while the window is still open.
    pub fn conclude<S: AssessmentSink + ?Sized>(&mut self, now: Instant, sink: &mut S) -> FrameReport {
        if self.state == SessionState::Assessing && self.is_expired(now) {
            self.finalize(None, sink);
        }
        self.report_with(now, None)
    }

    /// Current snapshot without applying a frame.
    pub fn report(&self, now: Instant) -> FrameReport {
        self.report_with(now, None)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn final_score(&self) -> Option<f64> {
        self.final_score
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn average(&self) -> Option<f64> {
        mean(&self.scores)
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default()
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.config.duration().saturating_sub(self.elapsed(now))
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.elapsed(now) >= self.config.duration()
    }

    fn finalize<S: AssessmentSink + ?Sized>(&mut self, fallback: Option<f64>, sink: &mut S) {
        if self.scores.is_empty() {
            match fallback {
                Some(score) => {
                    tracing::debug!(score, "no frames scored in window, using the closing frame");
                    self.scores.push(score);
                }
                None => {
                    self.state = SessionState::NoAssessment;
                    tracing::info!("assessment window closed without any scored frame");
                    return;
                }
            }
        }

        let Some(average) = mean(&self.scores) else {
            return;
        };
        let final_score = clamp_final(average + self.variance);
        self.final_score = Some(final_score);
        self.state = SessionState::Finalized;
        tracing::info!(
            average,
            variance = self.variance,
            final_score,
            samples = self.scores.len(),
            "assessment finalized"
        );

        if !self.persisted {
            let record = AssessmentRecord {
                timestamp: Local::now(),
                score: final_score,
                duration_seconds: self.config.duration_secs,
            };
            if let Err(e) = sink.record_assessment(&record) {
                tracing::warn!(error = %e, "failed to record assessment");
            }
            self.persisted = true;
        }
    }

    fn report_with(&self, now: Instant, frame: Option<FrameStatus>) -> FrameReport {
        let (display_score, remaining_time) = match self.state {
            SessionState::Assessing => (
                self.average(),
                Some(format_remaining(self.remaining(now))),
            ),
            SessionState::Finalized => (self.final_score, None),
            SessionState::Idle | SessionState::NoAssessment => (None, None),
        };
        FrameReport {
            state: self.state,
            frame,
            display_score,
            remaining_time,
            final_score: self.final_score,
            persisted: self.persisted,
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Whole seconds left, as `MM:SS`.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
