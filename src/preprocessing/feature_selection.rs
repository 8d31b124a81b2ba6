//! Importance-driven feature selection
//!
//! A baseline random forest ranks the prepared columns; the top of the
//! ranking, any essential features and the complete indicator group of every
//! categorical field that made the cut form the selection.

use super::encoder::CategoricalGroup;
use crate::error::{InsightsError, Result};
use crate::training::RandomForest;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Configuration for the feature selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Number of top-ranked columns kept before group expansion
    pub top_n: usize,
    /// Always kept when present after preparation
    pub essential_features: Vec<String>,
    /// Trees in the ranking forest
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub random_state: u64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            essential_features: vec!["bathrooms".to_string()],
            n_estimators: 100,
            max_depth: Some(10),
            random_state: 42,
        }
    }
}

impl SelectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_essential_features<S: Into<String>>(mut self, features: impl IntoIterator<Item = S>) -> Self {
        self.essential_features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }
}

/// A ranked feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Ranking plus the final selected columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSelection {
    /// Descending by importance; ties keep column order
    pub ranking: Vec<FeatureImportance>,
    /// De-duplicated, sorted alphabetically
    pub selected: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FeatureSelector {
    config: SelectorConfig,
}

impl FeatureSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Fit the ranking forest and order features by importance
    pub fn rank(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        feature_names: &[String],
    ) -> Result<Vec<FeatureImportance>> {
        if x.ncols() != feature_names.len() {
            return Err(InsightsError::ShapeError {
                expected: format!("{} feature names", x.ncols()),
                actual: format!("{} feature names", feature_names.len()),
            });
        }

        let mut forest = RandomForest::new_regressor(self.config.n_estimators)
            .with_max_depth(self.config.max_depth)
            .with_random_state(self.config.random_state);
        forest.fit(x, y)?;

        let importances = forest
            .feature_importances()
            .ok_or_else(|| InsightsError::TrainingError("Forest produced no importances".to_string()))?;

        let mut ranking: Vec<FeatureImportance> = feature_names
            .iter()
            .zip(importances.iter())
            .map(|(name, &importance)| FeatureImportance {
                feature: name.clone(),
                importance,
            })
            .collect();
        // sort_by is stable, so equal scores keep column order
        ranking.sort_by(|a, b| b.importance.total_cmp(&a.importance));

        Ok(ranking)
    }

    /// Rank, cut and expand
    pub fn select(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        feature_names: &[String],
        groups: &[CategoricalGroup],
    ) -> Result<FeatureSelection> {
        let ranking = self.rank(x, y, feature_names)?;
        let selected = self.select_from_ranking(&ranking, groups);

        info!(
            candidates = feature_names.len(),
            selected = selected.len(),
            "Selected features"
        );

        Ok(FeatureSelection { ranking, selected })
    }

    /// Apply the top-N cut, essentials and group expansion to a ranking
    pub fn select_from_ranking(&self, ranking: &[FeatureImportance], groups: &[CategoricalGroup]) -> Vec<String> {
        let available: BTreeSet<&str> = ranking.iter().map(|f| f.feature.as_str()).collect();

        let mut selected: BTreeSet<String> = ranking
            .iter()
            .take(self.config.top_n)
            .map(|f| f.feature.clone())
            .collect();

        for essential in &self.config.essential_features {
            if available.contains(essential.as_str()) {
                selected.insert(essential.clone());
            }
        }

        for group in groups {
            if group.columns.iter().any(|c| selected.contains(c)) {
                let added = group
                    .columns
                    .iter()
                    .filter(|c| available.contains(c.as_str()))
                    .filter(|c| selected.insert((*c).clone()))
                    .count();
                if added > 0 {
                    debug!(field = %group.field, added, "Expanded categorical group");
                }
            }
        }

        selected.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking(names: &[&str]) -> Vec<FeatureImportance> {
        let n = names.len();
        names
            .iter()
            .enumerate()
            .map(|(i, name)| FeatureImportance {
                feature: name.to_string(),
                importance: (n - i) as f64,
            })
            .collect()
    }

    fn room_group() -> CategoricalGroup {
        CategoricalGroup {
            field: "room_type".to_string(),
            columns: vec![
                "room_type_Hotel room".to_string(),
                "room_type_Private room".to_string(),
                "room_type_Shared room".to_string(),
            ],
            categories: vec![
                "Entire home/apt".to_string(),
                "Hotel room".to_string(),
                "Private room".to_string(),
                "Shared room".to_string(),
            ],
        }
    }

    #[test]
    fn test_group_expanded_atomically() {
        let selector = FeatureSelector::new(SelectorConfig::new().with_top_n(2));
        let ranking = ranking(&[
            "accommodates",
            "room_type_Private room",
            "bedrooms",
            "room_type_Shared room",
            "bathrooms",
            "room_type_Hotel room",
        ]);

        let selected = selector.select_from_ranking(&ranking, &[room_group()]);
        assert_eq!(
            selected,
            vec![
                "accommodates",
                "bathrooms",
                "room_type_Hotel room",
                "room_type_Private room",
                "room_type_Shared room",
            ]
        );
    }

    #[test]
    fn test_essential_only_when_present() {
        let selector = FeatureSelector::new(SelectorConfig::new().with_top_n(1));
        let selected = selector.select_from_ranking(&ranking(&["bedrooms", "accommodates"]), &[]);
        assert_eq!(selected, vec!["bedrooms"]);
    }

    #[test]
    fn test_untouched_group_stays_out() {
        let selector = FeatureSelector::new(SelectorConfig::new().with_top_n(1));
        let selected = selector.select_from_ranking(
            &ranking(&["accommodates", "room_type_Private room"]),
            &[room_group()],
        );
        assert_eq!(selected, vec!["accommodates"]);
    }

    #[test]
    fn test_rank_stable_and_descending() {
        // second column is pure noise-free signal, the others are constant
        let x = Array2::from_shape_fn((30, 3), |(i, j)| if j == 1 { i as f64 } else { 1.0 });
        let y: Array1<f64> = (0..30).map(|i| 2.0 * i as f64).collect();
        let names: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();

        let selector = FeatureSelector::new(SelectorConfig::new().with_n_estimators(10));
        let ranking = selector.rank(&x, &y, &names).unwrap();

        assert_eq!(ranking[0].feature, "b");
        // constant columns tie at zero and keep their original order
        assert_eq!(ranking[1].feature, "a");
        assert_eq!(ranking[2].feature, "c");
        assert!(ranking.windows(2).all(|w| w[0].importance >= w[1].importance));
    }

    #[test]
    fn test_rank_rejects_name_mismatch() {
        let x = Array2::zeros((4, 2));
        let y = Array1::zeros(4);
        assert!(FeatureSelector::default().rank(&x, &y, &["a".to_string()]).is_err());
    }
}
