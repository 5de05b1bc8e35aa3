//! Domain types for PriceLab

pub mod prediction;
pub mod price;

pub use prediction::{round_to, PredictionResult};
pub use price::{PricePoint, PriceSeries, SeriesError};

/// Symbol type alias
pub type Symbol = String;
