//! Boundary to the external face/landmark detector.
//!
//! Detection itself is not implemented here. Wrap whatever detector you use
//! in [`FaceDetector`], load its models once, and pass it by reference into
//! every analysis call.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{FaceBox, LandmarkSet};

/// One detected face: its bounding box and its landmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub face_box: FaceBox,
    pub landmarks: LandmarkSet,
}

/// A face detector combined with a landmark localizer.
pub trait FaceDetector {
    /// The image type the detector consumes.
    type Image: ?Sized;

    /// All faces found in `image`, in detector order. An empty result means
    /// no face, not an error.
    fn detect(&self, image: &Self::Image) -> Vec<Detection>;
}

impl<D: FaceDetector + ?Sized> FaceDetector for &D {
    type Image = D::Image;

    fn detect(&self, image: &Self::Image) -> Vec<Detection> {
        (**self).detect(image)
    }
}

/// Take the first detection and ignore the rest.
///
/// Detector order decides which face wins when several are visible; it is
/// not guaranteed to be stable across frames.
pub fn first_detection(detections: Vec<Detection>) -> Result<Detection> {
    let count = detections.len();
    let first = detections.into_iter().next().ok_or(Error::DetectionAbsent)?;
    if count > 1 {
        tracing::debug!(count, "multiple faces detected, using the first");
    }
    Ok(first)
}
