//! Face vectors and cosine similarity against reference profiles.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::face_points::{reference_landmarks, FacePoints, UnitSize};
use crate::types::{FaceBox, PixelPoint};

/// Number of features in a [`FaceVector`].
pub const FACE_VECTOR_LEN: usize = 14;

/// Engineered geometric features of one face, each in units of the face's
/// [`UnitSize`]. Only used for similarity, never for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceVector(Vec<f64>);

impl FaceVector {
    pub fn from_points(points: &FacePoints, unit: UnitSize) -> Self {
        let pairs: [(&PixelPoint, &PixelPoint); FACE_VECTOR_LEN] = [
            (&points.left_eye_outer, &points.left_eye_inner),
            (&points.right_eye_inner, &points.right_eye_outer),
            (&points.left_eye_inner, &points.right_eye_inner),
            (&points.nose_left, &points.nose_right),
            (&points.nose_top, &points.nose_base),
            (&points.mouth_left, &points.mouth_right),
            (&points.upper_lip, &points.lower_lip),
            (&points.mouth_center, &points.chin),
            (&points.nose_base, &points.mouth_center),
            (&points.jaw_left, &points.jaw_right),
            (&points.left_brow, &points.left_eye),
            (&points.right_brow, &points.right_eye),
            (&points.nose_tip, &points.chin),
            (&points.right_eye, &points.mouth_right),
        ];
        Self(pairs.iter().map(|(a, b)| unit.span(a, b)).collect())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn similarity(&self, other: &FaceVector) -> Result<f64> {
        cosine_similarity(&self.0, &other.0)
    }
}

impl From<Vec<f64>> for FaceVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Cosine similarity `dot(a, b) / (|a| * |b|)`.
///
/// Unequal lengths and all-zero vectors are invalid comparisons.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::VectorMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(Error::ZeroVector);
    }

    Ok(dot / (norm_a * norm_b))
}

/// A stored face vector used as a similarity baseline.
///
/// Profiles are read-only once loaded. JSON files hold a bare array of
/// numbers; any other extension is read as bincode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceProfile {
    vector: FaceVector,
}

impl ReferenceProfile {
    pub fn new(vector: FaceVector) -> Result<Self> {
        validate(&vector)?;
        Ok(Self { vector })
    }

    /// Profile of the built-in reference face.
    pub fn golden() -> Result<Self> {
        let face_box = FaceBox::new(0, 0, 1000, 1000);
        let points = FacePoints::from_landmarks(&reference_landmarks(&face_box))?;
        let unit = UnitSize::measure(&points)?;
        Self::new(FaceVector::from_points(&points, unit))
    }

    pub fn vector(&self) -> &FaceVector {
        &self.vector
    }

    pub fn similarity(&self, vector: &FaceVector) -> Result<f64> {
        vector.similarity(&self.vector)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let vector: FaceVector = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            bincode::deserialize(&bytes)?
        };
        tracing::debug!(path = %path.display(), len = vector.len(), "loaded reference profile");
        Self::new(vector)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        if is_json(path) {
            serde_json::to_writer(&mut writer, &self.vector)?;
        } else {
            writer.write_all(&bincode::serialize(&self.vector)?)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn validate(vector: &FaceVector) -> Result<()> {
    if vector.len() != FACE_VECTOR_LEN {
        return Err(Error::InvalidProfile(format!(
            "expected {FACE_VECTOR_LEN} features, found {}",
            vector.len()
        )));
    }
    if let Some(bad) = vector.as_slice().iter().find(|v| !v.is_finite()) {
        return Err(Error::InvalidProfile(format!("non-finite feature {bad}")));
    }
    if vector.as_slice().iter().all(|v| *v == 0.0) {
        return Err(Error::InvalidProfile("all features are zero".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn self_similarity_is_one() {
        let v = ReferenceProfile::golden().unwrap().vector().clone();
        assert_eq!(v.len(), FACE_VECTOR_LEN);
        assert!((v.similarity(&v).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn orthogonal_vectors() {
        let s = cosine_similarity(&[1.0, 0.0], &[0.0, 2.0]).unwrap();
        assert!(s.abs() < 1e-12);
        let s = cosine_similarity(&[1.0, 1.0], &[-1.0, -1.0]).unwrap();
        assert!((s + 1.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        match cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0]) {
            Err(Error::VectorMismatch { left, right }) => {
                assert_eq!((left, right), (3, 2));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn zero_vectors_are_rejected() {
        assert!(matches!(
            cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]),
            Err(Error::ZeroVector)
        ));
        assert!(matches!(
            cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]),
            Err(Error::ZeroVector)
        ));
    }

    #[test]
    fn profile_rejects_malformed_vectors() {
        assert!(matches!(
            ReferenceProfile::new(FaceVector::from(vec![1.0; 3])),
            Err(Error::InvalidProfile(_))
        ));
        assert!(matches!(
            ReferenceProfile::new(FaceVector::from(vec![0.0; FACE_VECTOR_LEN])),
            Err(Error::InvalidProfile(_))
        ));
        let mut values = vec![1.0; FACE_VECTOR_LEN];
        values[4] = f64::NAN;
        assert!(matches!(
            ReferenceProfile::new(FaceVector::from(values)),
            Err(Error::InvalidProfile(_))
        ));
    }

    #[test]
    fn profile_files() {
        let dir = tempfile::tempdir().unwrap();
        let golden = ReferenceProfile::golden().unwrap();

        let json_path = dir.path().join("golden.json");
        golden.save(&json_path).unwrap();
        let text = std::fs::read_to_string(&json_path).unwrap();
        assert!(text.starts_with('['));
        let loaded = ReferenceProfile::load(&json_path).unwrap();
        for (a, b) in loaded.vector().as_slice().iter().zip(golden.vector().as_slice()) {
            assert!((a - b).abs() < 1e-12);
        }

        let bin_path = dir.path().join("golden.bin");
        golden.save(&bin_path).unwrap();
        assert_eq!(ReferenceProfile::load(&bin_path).unwrap(), golden);
    }

    #[test]
    fn short_profile_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.json");
        std::fs::write(&path, "[1.0, 2.0]").unwrap();
        assert!(matches!(
            ReferenceProfile::load(&path),
            Err(Error::InvalidProfile(_))
        ));
    }

    proptest! {
        #[test]
        fn similarity_is_symmetric(
            a in proptest::collection::vec(0.1f64..10.0, FACE_VECTOR_LEN),
            b in proptest::collection::vec(0.1f64..10.0, FACE_VECTOR_LEN),
        ) {
            let ab = cosine_similarity(&a, &b).unwrap();
            let ba = cosine_similarity(&b, &a).unwrap();
            prop_assert!((ab - ba).abs() < 1e-12);
            prop_assert!(ab <= 1.0 + 1e-12);
        }
    }
}
