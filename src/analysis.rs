//! Geometric analysis of a single detected face.

use crate::detector::{first_detection, Detection, FaceDetector};
use crate::error::Result;
use crate::face_points::{FacePoints, UnitSize};
use crate::metrics::RatioMetric;
use crate::score::{still_image_score, GeometricRatio};
use crate::types::{FaceBox, LandmarkSet};
use crate::vector::{FaceVector, ReferenceProfile};

/// Geometry of one analysed face.
///
/// Every measurement re-derives the unit size from the face's own points,
/// so a `FaceAnalysis` carries no normalization state between calls.
#[derive(Debug, Clone)]
pub struct FaceAnalysis {
    face_box: FaceBox,
    landmarks: LandmarkSet,
    points: FacePoints,
}

impl FaceAnalysis {
    pub fn new(detection: Detection) -> Result<Self> {
        let points = FacePoints::from_landmarks(&detection.landmarks)?;
        Ok(Self {
            face_box: detection.face_box,
            landmarks: detection.landmarks,
            points,
        })
    }

    /// Detect faces in `image` and analyse the first one.
    pub fn detect<D: FaceDetector + ?Sized>(detector: &D, image: &D::Image) -> Result<Self> {
        Self::new(first_detection(detector.detect(image))?)
    }

    pub fn face_box(&self) -> &FaceBox {
        &self.face_box
    }

    pub fn landmarks(&self) -> &LandmarkSet {
        &self.landmarks
    }

    pub fn face_points(&self) -> &FacePoints {
        &self.points
    }

    pub fn unit_size(&self) -> Result<UnitSize> {
        UnitSize::measure(&self.points)
    }

    pub fn calculate(&self, metric: RatioMetric) -> Result<f64> {
        let unit = self.unit_size()?;
        Ok(metric.evaluate(&self.face_box, &self.points, unit))
    }

    pub fn calculate_tzm(&self) -> Result<f64> {
        self.calculate(RatioMetric::Tzm)
    }

    pub fn calculate_tgsm(&self) -> Result<f64> {
        self.calculate(RatioMetric::Tgsm)
    }

    pub fn calculate_vfm(&self) -> Result<f64> {
        self.calculate(RatioMetric::Vfm)
    }

    pub fn calculate_tsm(&self) -> Result<f64> {
        self.calculate(RatioMetric::Tsm)
    }

    pub fn calculate_lc(&self) -> Result<f64> {
        self.calculate(RatioMetric::Lc)
    }

    pub fn geometric_ratio(&self) -> Result<GeometricRatio> {
        GeometricRatio::measure(&self.face_box, &self.points)
    }

    /// Raw score, `100 - mean(metrics)`.
    pub fn raw_score(&self) -> Result<f64> {
        Ok(self.geometric_ratio()?.raw_score())
    }

    /// Per-frame score fed into a session.
    pub fn normalized_score(&self) -> Result<f64> {
        Ok(self.geometric_ratio()?.normalized_score())
    }

    /// Score for a single photo, clamped to the final range.
    pub fn still_image_score(&self) -> Result<f64> {
        Ok(still_image_score(self.raw_score()?))
    }

    pub fn face_vector(&self) -> Result<FaceVector> {
        Ok(FaceVector::from_points(&self.points, self.unit_size()?))
    }

    /// Cosine similarity between this face and another face vector.
    pub fn face_similarity(&self, other: &FaceVector) -> Result<f64> {
        self.face_vector()?.similarity(other)
    }

    /// Cosine similarity against a stored reference profile.
    pub fn similarity_ratio(&self, profile: &ReferenceProfile) -> Result<f64> {
        profile.similarity(&self.face_vector()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::face_points::reference_landmarks;

    struct Fixed(Vec<Detection>);

    impl FaceDetector for Fixed {
        type Image = ();

        fn detect(&self, _image: &()) -> Vec<Detection> {
            self.0.clone()
        }
    }

    fn reference_detection(size: i32) -> Detection {
        let face_box = FaceBox::new(30, 40, size, size);
        Detection {
            face_box,
            landmarks: reference_landmarks(&face_box),
        }
    }

    #[test]
    fn individual_metrics_match_aggregate() {
        let face = FaceAnalysis::new(reference_detection(400)).unwrap();
        let ratio = face.geometric_ratio().unwrap();

        assert_eq!(face.calculate_tzm().unwrap(), ratio.tzm);
        assert_eq!(face.calculate_tgsm().unwrap(), ratio.tgsm);
        assert_eq!(face.calculate_vfm().unwrap(), ratio.vfm);
        assert_eq!(face.calculate_tsm().unwrap(), ratio.tsm);
        assert_eq!(face.calculate_lc().unwrap(), ratio.lc);
        assert_eq!(face.raw_score().unwrap(), ratio.raw_score());
    }

    #[test]
    fn reference_face_matches_golden_profile() {
        let face = FaceAnalysis::new(reference_detection(600)).unwrap();
        let golden = ReferenceProfile::golden().unwrap();

        let similarity = face.similarity_ratio(&golden).unwrap();
        assert!(similarity > 0.999, "similarity = {similarity}");
    }

    #[test]
    fn similarity_between_faces_is_symmetric() {
        let a = FaceAnalysis::new(reference_detection(400)).unwrap();
        let mut other = reference_detection(400);
        other.landmarks.points[8].y += 40.0;
        let b = FaceAnalysis::new(other).unwrap();

        let va = a.face_vector().unwrap();
        let vb = b.face_vector().unwrap();
        let ab = a.face_similarity(&vb).unwrap();
        let ba = b.face_similarity(&va).unwrap();
        assert!((ab - ba).abs() < 1e-12);
        assert!(ab < 1.0);
    }

    #[test]
    fn detect_uses_first_face() {
        let detector = Fixed(vec![reference_detection(400), reference_detection(200)]);
        let face = FaceAnalysis::detect(&detector, &()).unwrap();
        assert_eq!(face.face_box().width, 400);
        assert_eq!(face.landmarks().num_landmarks(), 68);
    }

    #[test]
    fn no_face_is_absent() {
        let detector = Fixed(vec![]);
        assert!(matches!(
            FaceAnalysis::detect(&detector, &()),
            Err(Error::DetectionAbsent)
        ));
    }

    #[test]
    fn still_image_score_is_bounded() {
        let face = FaceAnalysis::new(reference_detection(400)).unwrap();
        let score = face.still_image_score().unwrap();
        assert!((50.0..=99.0).contains(&score));
    }
}
