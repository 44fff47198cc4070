//! Named facial point groups derived from a 68-point landmark set.
//!
//! The expected layout is the iBUG 68-point annotation scheme:
//!
//! | Indices | Region |
//! |---|---|
//! | 0-16 | jaw line (8 = chin) |
//! | 17-21, 22-26 | brows |
//! | 27-30 | nose bridge (30 = tip) |
//! | 31-35 | nostrils (33 = base) |
//! | 36-41, 42-47 | eyes |
//! | 48-59 | outer lip |
//! | 60-67 | inner lip |
//!
//! "Left" and "right" refer to the image, not the subject.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{FaceBox, LandmarkSet, PixelPoint, Point};

/// Number of landmarks the detector must supply.
pub const LANDMARK_COUNT: usize = 68;

/// Eye centroids closer than this (in pixels) cannot normalize anything.
pub const MIN_UNIT_SIZE: f64 = 1.0;

const JAW: std::ops::RangeInclusive<usize> = 0..=16;
const LEFT_BROW: std::ops::RangeInclusive<usize> = 17..=21;
const RIGHT_BROW: std::ops::RangeInclusive<usize> = 22..=26;
const LEFT_EYE: std::ops::RangeInclusive<usize> = 36..=41;
const RIGHT_EYE: std::ops::RangeInclusive<usize> = 42..=47;

/// Facial point groups, integer-rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacePoints {
    pub left_eye: PixelPoint,
    pub right_eye: PixelPoint,
    pub left_eye_outer: PixelPoint,
    pub left_eye_inner: PixelPoint,
    pub right_eye_inner: PixelPoint,
    pub right_eye_outer: PixelPoint,
    pub left_brow: PixelPoint,
    pub right_brow: PixelPoint,
    pub nose_top: PixelPoint,
    pub nose_tip: PixelPoint,
    pub nose_base: PixelPoint,
    pub nose_left: PixelPoint,
    pub nose_right: PixelPoint,
    pub mouth_left: PixelPoint,
    pub mouth_right: PixelPoint,
    pub upper_lip: PixelPoint,
    pub lower_lip: PixelPoint,
    pub mouth_center: PixelPoint,
    pub chin: PixelPoint,
    pub jaw_left: PixelPoint,
    pub jaw_right: PixelPoint,
    pub jaw_line: Vec<PixelPoint>,
}

impl FacePoints {
    /// Every key accepted by [`FacePoints::get`].
    pub const KEYS: [&'static str; 22] = [
        "leftEye",
        "rightEye",
        "leftEyeOuter",
        "leftEyeInner",
        "rightEyeInner",
        "rightEyeOuter",
        "leftBrow",
        "rightBrow",
        "noseTop",
        "noseTip",
        "noseBase",
        "noseLeft",
        "noseRight",
        "mouthLeft",
        "mouthRight",
        "upperLip",
        "lowerLip",
        "mouthCenter",
        "chin",
        "jawLeft",
        "jawRight",
        "jawLine",
    ];

    /// Group a 68-point landmark set into named facial points.
    ///
    /// A point that is not finite or does not fit a pixel coordinate leaves
    /// the unit size undefined and is reported as degenerate geometry.
    pub fn from_landmarks(landmarks: &LandmarkSet) -> Result<Self> {
        if landmarks.num_landmarks() != LANDMARK_COUNT {
            return Err(Error::InvalidLandmarks {
                expected: LANDMARK_COUNT,
                found: landmarks.num_landmarks(),
            });
        }
        if let Some(index) = landmarks.points.iter().position(|p| !p.is_valid_pixel()) {
            tracing::debug!(index, point = ?landmarks.points[index], "landmark outside pixel range");
            return Err(Error::DegenerateGeometry {
                unit_size: f64::NAN,
            });
        }

        let px = landmarks.to_pixels();
        let centroid = |range: std::ops::RangeInclusive<usize>| {
            PixelPoint::centroid(&px[range]).unwrap_or(px[0])
        };

        Ok(Self {
            left_eye: centroid(LEFT_EYE),
            right_eye: centroid(RIGHT_EYE),
            left_eye_outer: px[36],
            left_eye_inner: px[39],
            right_eye_inner: px[42],
            right_eye_outer: px[45],
            left_brow: centroid(LEFT_BROW),
            right_brow: centroid(RIGHT_BROW),
            nose_top: px[27],
            nose_tip: px[30],
            nose_base: px[33],
            nose_left: px[31],
            nose_right: px[35],
            mouth_left: px[48],
            mouth_right: px[54],
            upper_lip: px[51],
            lower_lip: px[57],
            mouth_center: PixelPoint::centroid(&[px[62], px[66]]).unwrap_or(px[62]),
            chin: px[8],
            jaw_left: px[0],
            jaw_right: px[16],
            jaw_line: px[JAW].to_vec(),
        })
    }

    /// Look up a point group by its key (e.g. `"noseTip"`, `"jawLine"`).
    pub fn get(&self, key: &str) -> Option<&[PixelPoint]> {
        let single = match key {
            "leftEye" => &self.left_eye,
            "rightEye" => &self.right_eye,
            "leftEyeOuter" => &self.left_eye_outer,
            "leftEyeInner" => &self.left_eye_inner,
            "rightEyeInner" => &self.right_eye_inner,
            "rightEyeOuter" => &self.right_eye_outer,
            "leftBrow" => &self.left_brow,
            "rightBrow" => &self.right_brow,
            "noseTop" => &self.nose_top,
            "noseTip" => &self.nose_tip,
            "noseBase" => &self.nose_base,
            "noseLeft" => &self.nose_left,
            "noseRight" => &self.nose_right,
            "mouthLeft" => &self.mouth_left,
            "mouthRight" => &self.mouth_right,
            "upperLip" => &self.upper_lip,
            "lowerLip" => &self.lower_lip,
            "mouthCenter" => &self.mouth_center,
            "chin" => &self.chin,
            "jawLeft" => &self.jaw_left,
            "jawRight" => &self.jaw_right,
            "jawLine" => return Some(&self.jaw_line),
            _ => return None,
        };
        Some(std::slice::from_ref(single))
    }

    /// Vertical position of the line through both eye centroids.
    pub fn eye_line_y(&self) -> f64 {
        (f64::from(self.left_eye.y) + f64::from(self.right_eye.y)) / 2.0
    }
}

/// The per-face normalization length: distance between the eye centroids.
///
/// Always measured fresh from the points it normalizes; never cache one
/// across faces or frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitSize(f64);

impl UnitSize {
    pub fn measure(points: &FacePoints) -> Result<Self> {
        let unit_size = points.left_eye.distance(&points.right_eye);
        if !unit_size.is_finite() || unit_size < MIN_UNIT_SIZE {
            return Err(Error::DegenerateGeometry { unit_size });
        }
        Ok(Self(unit_size))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Distance between two points in units.
    pub fn span(self, a: &PixelPoint, b: &PixelPoint) -> f64 {
        a.distance(b) / self.0
    }

    /// A signed pixel length in units.
    pub fn scale(self, pixels: f64) -> f64 {
        pixels / self.0
    }
}

/// Reference 68-point face in normalized [0,1] box coordinates.
///
/// Used as the golden reference profile and as a well-formed test face.
pub fn reference_mean_shape() -> Vec<Point> {
    vec![
        // Jaw line (0-16)
        Point::new(0.10, 0.35),
        Point::new(0.11, 0.45),
        Point::new(0.12, 0.55),
        Point::new(0.14, 0.65),
        Point::new(0.18, 0.73),
        Point::new(0.24, 0.80),
        Point::new(0.32, 0.85),
        Point::new(0.41, 0.88),
        Point::new(0.50, 0.89), // Chin
        Point::new(0.59, 0.88),
        Point::new(0.68, 0.85),
        Point::new(0.76, 0.80),
        Point::new(0.82, 0.73),
        Point::new(0.86, 0.65),
        Point::new(0.88, 0.55),
        Point::new(0.89, 0.45),
        Point::new(0.90, 0.35),
        // Left brow (17-21)
        Point::new(0.20, 0.26),
        Point::new(0.25, 0.22),
        Point::new(0.32, 0.21),
        Point::new(0.38, 0.23),
        Point::new(0.43, 0.27),
        // Right brow (22-26)
        Point::new(0.57, 0.27),
        Point::new(0.62, 0.23),
        Point::new(0.68, 0.21),
        Point::new(0.75, 0.22),
        Point::new(0.80, 0.26),
        // Nose bridge (27-30)
        Point::new(0.50, 0.32),
        Point::new(0.50, 0.40),
        Point::new(0.50, 0.48),
        Point::new(0.50, 0.55),
        // Nostrils (31-35)
        Point::new(0.40, 0.58),
        Point::new(0.45, 0.60),
        Point::new(0.50, 0.62),
        Point::new(0.55, 0.60),
        Point::new(0.60, 0.58),
        // Left eye (36-41)
        Point::new(0.24, 0.32),
        Point::new(0.28, 0.29),
        Point::new(0.34, 0.29),
        Point::new(0.38, 0.33),
        Point::new(0.34, 0.35),
        Point::new(0.28, 0.35),
        // Right eye (42-47)
        Point::new(0.62, 0.33),
        Point::new(0.66, 0.29),
        Point::new(0.72, 0.29),
        Point::new(0.76, 0.32),
        Point::new(0.72, 0.35),
        Point::new(0.66, 0.35),
        // Outer lip (48-59)
        Point::new(0.32, 0.72),
        Point::new(0.38, 0.68),
        Point::new(0.44, 0.66),
        Point::new(0.50, 0.67),
        Point::new(0.56, 0.66),
        Point::new(0.62, 0.68),
        Point::new(0.68, 0.72),
        Point::new(0.62, 0.78),
        Point::new(0.56, 0.80),
        Point::new(0.50, 0.81),
        Point::new(0.44, 0.80),
        Point::new(0.38, 0.78),
        // Inner lip (60-67)
        Point::new(0.36, 0.72),
        Point::new(0.44, 0.70),
        Point::new(0.50, 0.70),
        Point::new(0.56, 0.70),
        Point::new(0.64, 0.72),
        Point::new(0.56, 0.74),
        Point::new(0.50, 0.75),
        Point::new(0.44, 0.74),
    ]
}

/// The reference face placed inside `face_box`, in image coordinates.
pub fn reference_landmarks(face_box: &FaceBox) -> LandmarkSet {
    LandmarkSet::new(
        reference_mean_shape()
            .into_iter()
            .map(|p| face_box.denormalize_point(p))
            .collect(),
    )
}
