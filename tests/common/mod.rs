//! Shared listing fixtures

#![allow(dead_code)]

use polars::prelude::*;
use rental_insights::optimizer::SearchConfig;
use rental_insights::pipeline::PipelineConfig;

const NEIGHBOURHOODS: [&str; 3] = ["Centrum-West", "De Pijp", "Oost"];
const ROOM_TYPES: [&str; 2] = ["Entire home/apt", "Private room"];
const PROPERTY_TYPES: [&str; 3] = ["Entire condo", "Entire rental unit", "Private room in home"];

/// `n` complete listings with a clean numeric price and no outliers.
///
/// Prices are a permutation of `100..100 + n`, so the IQR fence keeps every row.
pub fn listings(n: usize) -> DataFrame {
    let price: Vec<f64> = (0..n).map(|i| 100.0 + ((i * 37) % n) as f64).collect();
    let accommodates: Vec<i64> = price.iter().map(|p| 1 + ((p - 100.0) / 20.0) as i64).collect();
    let bedrooms: Vec<i64> = accommodates.iter().map(|a| (a + 1) / 2).collect();
    let bathrooms: Vec<f64> = (0..n).map(|i| 1.0 + (i % 3) as f64 * 0.5).collect();
    let reviews: Vec<i64> = (0..n).map(|i| (i % 50) as i64).collect();
    let rating: Vec<f64> = (0..n).map(|i| 4.0 + (i % 10) as f64 / 10.0).collect();
    let value: Vec<f64> = (0..n).map(|i| 4.5 + (i % 5) as f64 / 10.0).collect();

    df! {
        "id" => (0..n as i64).collect::<Vec<_>>(),
        "accommodates" => accommodates,
        "bedrooms" => bedrooms,
        "bathrooms" => bathrooms,
        "number_of_reviews" => reviews,
        "review_scores_rating" => rating,
        "review_scores_value" => value,
        "room_type" => (0..n).map(|i| ROOM_TYPES[i % 2]).collect::<Vec<_>>(),
        "neighbourhood_cleansed" => (0..n).map(|i| NEIGHBOURHOODS[i % 3]).collect::<Vec<_>>(),
        "property_type" => (0..n).map(|i| PROPERTY_TYPES[(i / 2) % 3]).collect::<Vec<_>>(),
        "instant_bookable" => (0..n).map(|i| if i % 4 == 0 { "t" } else { "f" }).collect::<Vec<_>>(),
        "host_is_superhost" => (0..n).map(|i| if i % 5 == 0 { "t" } else { "f" }).collect::<Vec<_>>(),
        "price" => price,
    }
    .unwrap()
}

/// A small search so integration runs stay quick
pub fn quick_config() -> PipelineConfig {
    PipelineConfig::default().with_search(SearchConfig::new().with_n_iter(3).with_cv_folds(3))
}
