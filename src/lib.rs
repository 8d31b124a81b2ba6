//! Rental Insights - Short-term rental market analytics
//!
//! This crate loads per-city short-term rental datasets, summarises the
//! market, and trains a nightly price model:
//! - Data loading and price cleaning
//! - Neighbourhood counts, average prices and price histograms
//! - Feature preparation: schema negotiation, IQR outlier removal, one-hot encoding
//! - Random-forest importance ranking and feature selection
//! - Randomized hyperparameter search over random forests and gradient boosting
//! - Serializable model bundles and single-listing price prediction
//!
//! # Modules
//!
//! - [`utils`] - City dataset loading and price cleaning
//! - [`analysis`] - Market statistics per neighbourhood
//! - [`preprocessing`] - Feature preparation, encoding, scaling, selection
//! - [`training`] - Tree models, cross-validation and model comparison
//! - [`optimizer`] - Search spaces and randomized search
//! - [`inference`] - Model bundles and the price predictor
//! - [`pipeline`] - End-to-end training run
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data and analytics
pub mod utils;
pub mod analysis;

// Core ML modules
pub mod preprocessing;
pub mod training;
pub mod optimizer;
pub mod inference;
pub mod pipeline;

// Services
pub mod cli;

pub use error::{InsightsError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{InsightsError, Result};

    // Data loading
    pub use crate::utils::{CityDataLoader, CityDataset, DatasetSummary};

    // Analysis
    pub use crate::analysis::{HistogramBin, MarketAnalysis, MarketSummary, NeighbourhoodCount};

    // Preprocessing
    pub use crate::preprocessing::{
        FeaturePreparer, FeatureSelector, OneHotEncoder, PreparedData, PreparerConfig, SelectorConfig,
        StandardScaler,
    };

    // Training
    pub use crate::training::{ModelComparator, ModelFamily, PerformanceRecord, TrainedModel};

    // Optimization
    pub use crate::optimizer::{RandomizedSearch, SearchConfig, SearchSpace};

    // Inference
    pub use crate::inference::{ModelBundle, PricePredictor};

    // Pipeline
    pub use crate::pipeline::{PipelineConfig, PipelineOutcome, PipelineReport, PricePipeline};
}
