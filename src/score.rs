//! Aggregation of the five ratio metrics into one beauty score.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::face_points::{FacePoints, UnitSize};
use crate::metrics::RatioMetric;
use crate::types::FaceBox;

/// No score reported anywhere drops below this.
pub const SCORE_FLOOR: f64 = 50.0;

/// Upper bound, applied only to final (session or still-image) scores.
pub const SCORE_CEILING: f64 = 99.0;

/// All five metric values for one face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometricRatio {
    pub tzm: f64,
    pub tgsm: f64,
    pub vfm: f64,
    pub tsm: f64,
    pub lc: f64,
}

impl GeometricRatio {
    /// Measure every metric against a single unit size taken from `points`.
    ///
    /// Fails with [`Error::DegenerateGeometry`] when the unit size collapses
    /// or any metric comes out non-finite.
    pub fn measure(face_box: &FaceBox, points: &FacePoints) -> Result<Self> {
        let unit = UnitSize::measure(points)?;
        let ratio = Self {
            tzm: RatioMetric::Tzm.evaluate(face_box, points, unit),
            tgsm: RatioMetric::Tgsm.evaluate(face_box, points, unit),
            vfm: RatioMetric::Vfm.evaluate(face_box, points, unit),
            tsm: RatioMetric::Tsm.evaluate(face_box, points, unit),
            lc: RatioMetric::Lc.evaluate(face_box, points, unit),
        };
        if !ratio.raw_score().is_finite() {
            return Err(Error::DegenerateGeometry {
                unit_size: unit.get(),
            });
        }
        Ok(ratio)
    }

    pub fn get(&self, metric: RatioMetric) -> f64 {
        match metric {
            RatioMetric::Tzm => self.tzm,
            RatioMetric::Tgsm => self.tgsm,
            RatioMetric::Vfm => self.vfm,
            RatioMetric::Tsm => self.tsm,
            RatioMetric::Lc => self.lc,
        }
    }

    pub fn mean_deviation(&self) -> f64 {
        (self.tzm + self.tgsm + self.vfm + self.tsm + self.lc) / 5.0
    }

    /// `100 - mean(metrics)`. Unbounded.
    pub fn raw_score(&self) -> f64 {
        100.0 - self.mean_deviation()
    }

    pub fn normalized_score(&self) -> f64 {
        normalize_score(self.raw_score())
    }
}

/// Fold a raw score into the displayable band.
///
/// Scores under 50 are halved onto 50 rather than truncated, then a hard
/// floor of 50 applies. There is no upper bound here.
pub fn normalize_score(raw: f64) -> f64 {
    let curved = if raw < SCORE_FLOOR {
        SCORE_FLOOR + raw / 2.0
    } else {
        raw
    };
    curved.max(SCORE_FLOOR)
}

/// Clamp a final score into `[SCORE_FLOOR, SCORE_CEILING]`.
pub fn clamp_final(score: f64) -> f64 {
    score.clamp(SCORE_FLOOR, SCORE_CEILING)
}

/// Score for a single photo: normalized and clamped in one step.
pub fn still_image_score(raw: f64) -> f64 {
    clamp_final(normalize_score(raw))
}
