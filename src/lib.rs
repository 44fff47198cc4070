//! # golden-face
//!
//! Golden-ratio facial geometry scoring from detected landmarks.
//!
//! This crate provides:
//! - **Facial points**: named, integer-rounded point groups from a 68-point landmark set
//! - **Ratio metrics**: five golden-ratio deviations (TZM, TGSM, VFM, TSM, LC)
//! - **Scoring**: aggregation into a raw score and normalization into the 50+ band
//! - **Face vectors**: a geometric feature vector with cosine similarity against
//!   stored reference profiles
//! - **Sessions**: a timed assessment that turns a per-frame score stream into one
//!   final, persisted result
//!
//! Face detection and landmark localization are not part of this crate. Plug a
//! detector in through [`FaceDetector`].
//!
//! ## Scoring pipeline
//!
//! 1. Round landmarks to pixels and group them into [`FacePoints`]
//! 2. Measure the [`UnitSize`] (distance between the eye centroids)
//! 3. Compute the five metrics; each is a percentage deviation from its ideal ratio
//! 4. `raw = 100 - mean(metrics)`
//! 5. Normalize: `raw < 50` maps to `50 + raw / 2`, then floor at 50
//! 6. Feed the normalized score into a [`Session`]; the final score is
//!    `clamp(mean + variance, 50, 99)`
//!
//! ## Quick Start
//!
//! ```rust
//! use golden_face::{
//!     reference_landmarks, Detection, FaceAnalysis, FaceBox, ReferenceProfile,
//! };
//!
//! // Landmarks normally come from a detector; here we use the built-in reference face.
//! let face_box = FaceBox::new(100, 50, 300, 300);
//! let detection = Detection { face_box, landmarks: reference_landmarks(&face_box) };
//!
//! let face = FaceAnalysis::new(detection).unwrap();
//! let ratio = face.geometric_ratio().unwrap();
//! println!("TZM {:.1} TGSM {:.1} raw {:.1}", ratio.tzm, ratio.tgsm, ratio.raw_score());
//!
//! let similarity = face.similarity_ratio(&ReferenceProfile::golden().unwrap()).unwrap();
//! assert!(similarity > 0.99);
//! ```
//!
//! ## Sessions
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use golden_face::{
//!     FrameObservation, MemorySink, Session, SessionConfig, SessionState, VarianceSource,
//! };
//!
//! let mut session = Session::new(SessionConfig::default(), VarianceSource::fixed(2.0)).unwrap();
//! let mut sink = MemorySink::default();
//! let t0 = Instant::now();
//! session.start(t0);
//!
//! session.update(FrameObservation::Scored(55.0), t0 + Duration::from_secs(1), &mut sink);
//! let report = session.update(FrameObservation::Scored(55.0), t0 + Duration::from_secs(60), &mut sink);
//!
//! assert_eq!(report.state, SessionState::Finalized);
//! assert_eq!(report.final_score, Some(57.0));
//! assert_eq!(sink.records.len(), 1);
//! ```

mod analysis;
mod config;
mod detector;
mod engine;
mod error;
mod face_points;
mod metrics;
mod score;
mod session;
mod sink;
mod types;
mod vector;

pub use analysis::FaceAnalysis;
pub use config::SessionConfig;
pub use detector::{first_detection, Detection, FaceDetector};
pub use engine::{observe, FrameScore, ScoringEngine};
pub use error::{Error, Result};
pub use face_points::{
    reference_landmarks, reference_mean_shape, FacePoints, UnitSize, LANDMARK_COUNT,
    MIN_UNIT_SIZE,
};
pub use metrics::{deviation, lc, tgsm, tsm, tzm, vfm, RatioMetric, GOLDEN_RATIO};
pub use score::{
    clamp_final, normalize_score, still_image_score, GeometricRatio, SCORE_CEILING, SCORE_FLOOR,
};
pub use session::{
    format_remaining, FrameObservation, FrameReport, FrameStatus, Session, SessionState,
    VarianceSource,
};
pub use sink::{AssessmentRecord, AssessmentSink, JsonlAssessmentLog, MemorySink};
pub use types::{FaceBox, LandmarkSet, PixelPoint, Point};
pub use vector::{cosine_similarity, FaceVector, ReferenceProfile, FACE_VECTOR_LEN};
