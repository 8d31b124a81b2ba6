//! Market analysis
//!
//! Exploratory statistics over a city's listings: how many properties each
//! neighbourhood has, what they cost on average, and how prices are spread.

use crate::error::{InsightsError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const NEIGHBOURHOOD_COLUMN: &str = "neighbourhood_cleansed";
pub const PRICE_COLUMN: &str = "price";

/// Default number of histogram bins
pub const DEFAULT_BINS: usize = 50;

/// Property count for one neighbourhood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighbourhoodCount {
    pub neighbourhood: String,
    pub count: usize,
}

/// One equal-width price bin; `upper` is exclusive except for the last bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Headline numbers for a city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub total_listings: usize,
    pub priced_listings: usize,
    pub average_price: Option<f64>,
    pub neighbourhoods: Vec<NeighbourhoodCount>,
}

/// Read-only view of a listings table for market statistics
#[derive(Debug, Clone)]
pub struct MarketAnalysis {
    neighbourhoods: Vec<Option<String>>,
    prices: Vec<Option<f64>>,
}

impl MarketAnalysis {
    /// Requires a neighbourhood column; a missing price column means every
    /// listing is unpriced.
    pub fn new(listings: &DataFrame) -> Result<Self> {
        let neighbourhoods: Vec<Option<String>> = listings
            .column(NEIGHBOURHOOD_COLUMN)
            .map_err(|_| InsightsError::missing_column("listings", NEIGHBOURHOOD_COLUMN))?
            .as_materialized_series()
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();

        let prices: Vec<Option<f64>> = match listings.column(PRICE_COLUMN) {
            Ok(column) => column
                .as_materialized_series()
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|v| v.filter(|p| p.is_finite()))
                .collect(),
            Err(_) => vec![None; listings.height()],
        };

        Ok(Self { neighbourhoods, prices })
    }

    /// Listings per neighbourhood, most listings first, then by name
    pub fn neighbourhood_counts(&self) -> Vec<NeighbourhoodCount> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for name in self.neighbourhoods.iter().flatten() {
            *counts.entry(name.as_str()).or_default() += 1;
        }

        let mut result: Vec<NeighbourhoodCount> = counts
            .into_iter()
            .map(|(neighbourhood, count)| NeighbourhoodCount {
                neighbourhood: neighbourhood.to_string(),
                count,
            })
            .collect();
        result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.neighbourhood.cmp(&b.neighbourhood)));
        result
    }

    fn prices_in<'a>(&'a self, neighbourhood: &'a str) -> impl Iterator<Item = f64> + 'a {
        self.neighbourhoods
            .iter()
            .zip(self.prices.iter())
            .filter(move |(n, _)| n.as_deref() == Some(neighbourhood))
            .filter_map(|(_, p)| *p)
    }

    /// Mean price of priced listings in the neighbourhood
    pub fn average_price(&self, neighbourhood: &str) -> Option<f64> {
        mean(self.prices_in(neighbourhood))
    }

    /// Mean price across all priced listings
    pub fn overall_average_price(&self) -> Option<f64> {
        mean(self.prices.iter().flatten().copied())
    }

    /// Equal-width histogram of the neighbourhood's prices
    pub fn price_histogram(&self, neighbourhood: &str, bins: usize) -> Result<Vec<HistogramBin>> {
        if bins == 0 {
            return Err(InsightsError::ValidationError("bins must be at least 1".to_string()));
        }
        let prices: Vec<f64> = self.prices_in(neighbourhood).collect();
        Ok(histogram(&prices, bins))
    }

    pub fn summary(&self) -> MarketSummary {
        MarketSummary {
            total_listings: self.prices.len(),
            priced_listings: self.prices.iter().flatten().count(),
            average_price: self.overall_average_price(),
            neighbourhoods: self.neighbourhood_counts(),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    Float64Chunked::from_iter_values(PRICE_COLUMN.into(), values).mean()
}

/// Equal-width bins over `[min, max]`. A constant sample gets a single bin.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max <= min {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count,
        })
        .collect()
}
