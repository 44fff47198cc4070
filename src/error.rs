use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Profile deserialization error: {0}")]
    Deserialization(#[from] bincode::Error),

    #[error("No face detected")]
    DetectionAbsent,

    #[error("Degenerate face geometry: unit size {unit_size:.3}px")]
    DegenerateGeometry { unit_size: f64 },

    #[error("Invalid landmark set: expected {expected} points, found {found}")]
    InvalidLandmarks { expected: usize, found: usize },

    #[error("Face vector length mismatch: {left} vs {right}")]
    VectorMismatch { left: usize, right: usize },

    #[error("Cannot compare an all-zero face vector")]
    ZeroVector,

    #[error("Invalid reference profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
