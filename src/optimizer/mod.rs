//! Hyperparameter search
//!
//! Randomized search over discrete grids: a fixed number of configurations
//! is drawn without replacement and each is scored by a caller-supplied
//! objective, typically a cross-validated R².

mod config;
mod random_search;
mod search_space;

pub use config::SearchConfig;
pub use random_search::{RandomizedSearch, Study, TrialResult};
pub use search_space::{format_params, Parameter, ParameterValue, SearchSpace, TrialParams};
