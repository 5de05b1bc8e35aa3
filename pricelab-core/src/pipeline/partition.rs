//! Chronological train/test partitioning.

use super::normalize::FeatureTargetPair;
use crate::error::PredictError;

/// Share of pairs assigned to the training partition.
pub const TRAIN_FRACTION: f64 = 0.8;

/// Order-preserving split: every training pair precedes every test pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub train_x: Vec<f64>,
    pub train_y: Vec<f64>,
    pub test_x: Vec<f64>,
    pub test_y: Vec<f64>,
}

/// Boundary index `floor(0.8 * len)`, computed in integers so it cannot be
/// nudged by floating-point rounding.
pub fn boundary(len: usize) -> usize {
    len * 4 / 5
}

/// Split at [`boundary`]. Both partitions must be non-empty.
pub fn partition(pair: &FeatureTargetPair) -> Result<Partition, PredictError> {
    let len = pair.len();
    let split = boundary(len);
    if split < 1 || split > len.saturating_sub(1) {
        return Err(PredictError::InsufficientData(format!(
            "{len} pairs cannot be split into non-empty train and test partitions"
        )));
    }
    let (train_x, test_x) = pair.features().split_at(split);
    let (train_y, test_y) = pair.targets().split_at(split);
    Ok(Partition {
        train_x: train_x.to_vec(),
        train_y: train_y.to_vec(),
        test_x: test_x.to_vec(),
        test_y: test_y.to_vec(),
    })
}
