use serde::{Deserialize, Serialize};

/// A 2D point with floating-point coordinates, as reported by a landmark detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Finite and within the range a pixel coordinate can hold.
    pub fn is_valid_pixel(&self) -> bool {
        let limit = i32::MAX as f32;
        self.x.is_finite() && self.y.is_finite() && self.x.abs() < limit && self.y.abs() < limit
    }

    /// Round to the nearest whole pixel.
    pub fn round(&self) -> PixelPoint {
        PixelPoint::new(self.x.round() as i32, self.y.round() as i32)
    }
}

/// An integer pixel coordinate. All geometric metrics work on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &PixelPoint) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Rounded centroid of a group of points. Returns `None` for an empty group.
    pub fn centroid(points: &[PixelPoint]) -> Option<PixelPoint> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (sx, sy) = points.iter().fold((0i64, 0i64), |(sx, sy), p| {
            (sx + i64::from(p.x), sy + i64::from(p.y))
        });
        Some(PixelPoint::new(
            (sx as f64 / n).round() as i32,
            (sy as f64 / n).round() as i32,
        ))
    }
}

/// A detected face bounding box: top-left corner, width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FaceBox {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Map a point from normalized [0,1] box coordinates into image coordinates.
    pub fn denormalize_point(&self, p: Point) -> Point {
        Point::new(
            self.x as f32 + p.x * self.width as f32,
            self.y as f32 + p.y * self.height as f32,
        )
    }
}

/// The ordered landmark points of one detected face.
///
/// Indices carry anatomical meaning defined by the detector; see
/// [`crate::face_points`] for the 68-point layout this crate expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub points: Vec<Point>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn num_landmarks(&self) -> usize {
        self.points.len()
    }

    /// Every landmark rounded to whole pixels.
    pub fn to_pixels(&self) -> Vec<PixelPoint> {
        self.points.iter().map(Point::round).collect()
    }
}
