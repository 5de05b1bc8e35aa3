//! Prediction history: JSONL append-only persistence.
//!
//! One JSON object per line, one line per completed prediction. The format
//! survives partial writes (a torn last line is skipped on read) and is easy
//! to stream or grep.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pricelab_core::domain::PredictionResult;
use pricelab_core::models::ModelKind;
use pricelab_core::pipeline::Recommendation;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("history serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A single persisted prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub user_id: String,
    pub symbol: String,
    pub predicted_price: f64,
    pub current_price: f64,
    pub price_change_percent: f64,
    pub confidence: f64,
    pub model_type: ModelKind,
    pub recommendation: Recommendation,
    pub created_at: DateTime<Utc>,
    /// Fingerprint of the prediction settings that produced this record.
    #[serde(default)]
    pub config_fingerprint: String,
}

impl PredictionRecord {
    pub fn from_result(user_id: &str, result: &PredictionResult, config_fingerprint: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            symbol: result.symbol.clone(),
            predicted_price: result.predicted_price,
            current_price: result.current_price,
            price_change_percent: result.price_change_percent,
            confidence: result.confidence,
            model_type: result.model_type,
            recommendation: result.recommendation,
            created_at: result.timestamp,
            config_fingerprint: config_fingerprint.to_string(),
        }
    }
}

/// JSONL history file manager.
///
/// Appends are serialized through an in-process lock and each record is
/// written with a single `write_all`, so concurrent batch workers never
/// interleave lines.
pub struct PredictionHistory {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl PredictionHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Append a record to the history file, creating it (and its parent
    /// directory) on first use.
    pub fn append(&self, record: &PredictionRecord) -> Result<(), HistoryError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Read all records in file order.
    ///
    /// Skips malformed lines (logged but not fatal).
    pub fn read_all(&self) -> Result<Vec<PredictionRecord>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path)?;
        let reader = io::BufReader::new(file);
        let mut records = Vec::new();

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<PredictionRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(line = number + 1, error = %e, "skipping malformed history line")
                }
            }
        }

        Ok(records)
    }

    /// Most recent records of one user, newest first, at most `limit`.
    pub fn for_user(&self, user_id: &str, limit: usize) -> Result<Vec<PredictionRecord>, HistoryError> {
        let mut records: Vec<PredictionRecord> = self
            .read_all()?
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        // Later lines win ties on created_at.
        records.reverse();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }

    /// Get the current file size in bytes.
    pub fn file_size_bytes(&self) -> io::Result<u64> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// Path to the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
