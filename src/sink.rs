//! Destinations for finalized assessment results.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One finalized assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub timestamp: DateTime<Local>,
    pub score: f64,
    pub duration_seconds: u64,
}

/// Receives at most one record per session.
pub trait AssessmentSink {
    fn record_assessment(&mut self, record: &AssessmentRecord) -> Result<()>;
}

impl<S: AssessmentSink + ?Sized> AssessmentSink for &mut S {
    fn record_assessment(&mut self, record: &AssessmentRecord) -> Result<()> {
        (**self).record_assessment(record)
    }
}

/// Append-only log, one JSON object per line.
#[derive(Debug, Clone)]
pub struct JsonlAssessmentLog {
    path: PathBuf,
}

impl JsonlAssessmentLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record back, oldest first. A missing file is an empty log.
    pub fn read_all(&self) -> Result<Vec<AssessmentRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }
}

impl AssessmentSink for JsonlAssessmentLog {
    fn record_assessment(&mut self, record: &AssessmentRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        tracing::info!(
            path = %self.path.display(),
            score = record.score,
            duration_seconds = record.duration_seconds,
            "assessment recorded"
        );
        Ok(())
    }
}

/// Keeps records in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub records: Vec<AssessmentRecord>,
}

impl AssessmentSink for MemorySink {
    fn record_assessment(&mut self, record: &AssessmentRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}
