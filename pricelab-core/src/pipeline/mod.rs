//! Prediction pipeline: normalize → partition → scale → fit → score → classify.

pub mod confidence;
pub mod normalize;
pub mod partition;
pub mod predictor;
pub mod recommendation;
pub mod scaler;

pub use confidence::{confidence, to_percent, RECURRENT_CONFIDENCE};
pub use normalize::{normalize, FeatureTargetPair};
pub use partition::{partition, Partition, TRAIN_FRACTION};
pub use predictor::{predict, Predictor};
pub use recommendation::Recommendation;
pub use scaler::MinMaxScaler;
