//! The five golden-ratio metrics.
//!
//! Each metric measures two lengths on the face, expresses both in units of
//! the face's [`UnitSize`], takes their ratio and reports how far that ratio
//! is from its ideal as a percentage:
//!
//! ```text
//! deviation = |ratio - ideal| / ideal * 100
//! ```
//!
//! Zero means a perfect proportion. Metrics are not clamped; a broken
//! landmark set can push them arbitrarily high, or to infinity when a
//! reference length collapses.
//!
//! | Metric | Ratio | Ideal |
//! |---|---|---|
//! | TZM  | nose base to chin / nose top to nose base | 1 |
//! | TGSM | mouth width / nose width | φ |
//! | VFM  | eye line to chin / box top to eye line | φ |
//! | TSM  | nose tip to left jaw / nose tip to right jaw | 1 |
//! | LC   | mouth to chin / nose base to mouth | φ |

use serde::{Deserialize, Serialize};

use crate::face_points::{FacePoints, UnitSize};
use crate::types::FaceBox;

/// φ, the golden ratio.
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Identifies one of the five ratio metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RatioMetric {
    Tzm,
    Tgsm,
    Vfm,
    Tsm,
    Lc,
}

impl RatioMetric {
    pub const ALL: [RatioMetric; 5] = [
        RatioMetric::Tzm,
        RatioMetric::Tgsm,
        RatioMetric::Vfm,
        RatioMetric::Tsm,
        RatioMetric::Lc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RatioMetric::Tzm => "TZM",
            RatioMetric::Tgsm => "TGSM",
            RatioMetric::Vfm => "VFM",
            RatioMetric::Tsm => "TSM",
            RatioMetric::Lc => "LC",
        }
    }

    /// The proportion this metric considers perfect.
    pub fn ideal(self) -> f64 {
        match self {
            RatioMetric::Tzm | RatioMetric::Tsm => 1.0,
            RatioMetric::Tgsm | RatioMetric::Vfm | RatioMetric::Lc => GOLDEN_RATIO,
        }
    }

    /// Evaluate this metric for one face.
    pub fn evaluate(self, face_box: &FaceBox, points: &FacePoints, unit: UnitSize) -> f64 {
        match self {
            RatioMetric::Tzm => tzm(face_box, points, unit),
            RatioMetric::Tgsm => tgsm(face_box, points, unit),
            RatioMetric::Vfm => vfm(face_box, points, unit),
            RatioMetric::Tsm => tsm(face_box, points, unit),
            RatioMetric::Lc => lc(face_box, points, unit),
        }
    }
}

impl std::fmt::Display for RatioMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Percentage distance of `ratio` from `ideal`.
pub fn deviation(ratio: f64, ideal: f64) -> f64 {
    (ratio - ideal).abs() / ideal * 100.0
}

/// Third zone: the lower facial third against the middle third.
pub fn tzm(_face_box: &FaceBox, points: &FacePoints, unit: UnitSize) -> f64 {
    let lower = unit.span(&points.nose_base, &points.chin);
    let middle = unit.span(&points.nose_top, &points.nose_base);
    deviation(lower / middle, RatioMetric::Tzm.ideal())
}

/// Golden symmetry mask: mouth width against nose width.
pub fn tgsm(_face_box: &FaceBox, points: &FacePoints, unit: UnitSize) -> f64 {
    let mouth = unit.span(&points.mouth_left, &points.mouth_right);
    let nose = unit.span(&points.nose_left, &points.nose_right);
    deviation(mouth / nose, RatioMetric::Tgsm.ideal())
}

/// Vertical facial: eye line to chin against the top of the face box to the eye line.
pub fn vfm(face_box: &FaceBox, points: &FacePoints, unit: UnitSize) -> f64 {
    let eye_line = points.eye_line_y();
    let lower = unit.scale(f64::from(points.chin.y) - eye_line);
    let upper = unit.scale(eye_line - f64::from(face_box.y));
    deviation(lower / upper, RatioMetric::Vfm.ideal())
}

/// Transverse symmetry: nose tip to each side of the jaw.
pub fn tsm(_face_box: &FaceBox, points: &FacePoints, unit: UnitSize) -> f64 {
    let left = unit.span(&points.nose_tip, &points.jaw_left);
    let right = unit.span(&points.nose_tip, &points.jaw_right);
    deviation(left / right, RatioMetric::Tsm.ideal())
}

/// Lip/chin: mouth to chin against nose base to mouth.
pub fn lc(_face_box: &FaceBox, points: &FacePoints, unit: UnitSize) -> f64 {
    let chin = unit.span(&points.mouth_center, &points.chin);
    let philtrum = unit.span(&points.nose_base, &points.mouth_center);
    deviation(chin / philtrum, RatioMetric::Lc.ideal())
}
