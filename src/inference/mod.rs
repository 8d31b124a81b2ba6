//! Inference module
//!
//! A [`ModelBundle`] packages the best model with its scaling parameters and
//! feature order; the [`PricePredictor`] holds one bundle and turns feature
//! maps into nightly prices.

mod bundle;
mod engine;

pub use bundle::ModelBundle;
pub use engine::{parse_feature_pairs, PricePredictor};
