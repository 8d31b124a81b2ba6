//! Model training module
//!
//! Regression learners used by the price model:
//! - CART regression trees
//! - Random forests (bagged trees)
//! - Gradient boosted trees with row/column subsampling
//!
//! plus k-fold cross-validation, hold-out splitting, regression metrics and
//! the comparator that tunes and ranks the model families.

mod engine;
mod models;
pub mod cross_validation;
pub mod decision_tree;
pub mod gradient_boosting;
pub mod random_forest;

pub use cross_validation::{holdout_sizes, train_test_split, CVResults, CVSplit, CrossValidator};
pub use decision_tree::{DecisionTree, TreeNode};
pub use engine::{ComparisonResult, ModelComparator, PerformanceRecord};
pub use gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
pub use models::{r2_score, Model, ModelFamily, RegressionMetrics, TrainedModel};
pub use random_forest::RandomForest;
