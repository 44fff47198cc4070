//! Per-frame pipeline from detector output to session updates.

use std::time::Instant;

use crate::analysis::FaceAnalysis;
use crate::detector::FaceDetector;
use crate::error::{Error, Result};
use crate::score::GeometricRatio;
use crate::session::{FrameObservation, FrameReport, Session};
use crate::sink::AssessmentSink;

/// Scores of one analysed frame.
#[derive(Debug, Clone)]
pub struct FrameScore {
    pub analysis: FaceAnalysis,
    pub ratio: GeometricRatio,
    pub raw: f64,
    pub normalized: f64,
}

/// Runs detection, geometry and scoring for each frame and feeds the
/// result into a session.
///
/// The engine only borrows the detector, so one loaded detector can serve
/// any number of engines and sessions.
pub struct ScoringEngine<'d, D: FaceDetector + ?Sized> {
    detector: &'d D,
}

impl<'d, D: FaceDetector + ?Sized> ScoringEngine<'d, D> {
    pub fn new(detector: &'d D) -> Self {
        Self { detector }
    }

    /// Analyse the first face in `image` and score it.
    pub fn score_image(&self, image: &D::Image) -> Result<FrameScore> {
        let analysis = FaceAnalysis::detect(self.detector, image)?;
        let ratio = analysis.geometric_ratio()?;
        Ok(FrameScore {
            raw: ratio.raw_score(),
            normalized: ratio.normalized_score(),
            ratio,
            analysis,
        })
    }

    /// Score `image` and apply it to `session`.
    ///
    /// Missing faces and degenerate geometry are reported through the frame
    /// status. Only structurally invalid input, such as a landmark set of the
    /// wrong size, is returned as an error; the session is left untouched.
    pub fn process_frame<S: AssessmentSink + ?Sized>(
        &self,
        session: &mut Session,
        image: &D::Image,
        now: Instant,
        sink: &mut S,
    ) -> Result<FrameReport> {
        let observation = observe(self.score_image(image).map(|score| score.normalized))?;
        Ok(session.update(observation, now, sink))
    }
}

/// Map a frame scoring result onto a session observation.
pub fn observe(result: Result<f64>) -> Result<FrameObservation> {
    match result {
        Ok(score) => Ok(FrameObservation::Scored(score)),
        Err(Error::DetectionAbsent) => Ok(FrameObservation::NoDetection),
        Err(Error::DegenerateGeometry { .. }) => Ok(FrameObservation::DegenerateGeometry),
        Err(e) => Err(e),
    }
}
