//! Per-city dataset loading
//!
//! A data root holds one directory per city, each with `listings.csv`,
//! `reviews.csv` and optionally `neighbourhoods.csv`.

use crate::error::{InsightsError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

pub const LISTINGS_FILE: &str = "listings.csv";
pub const REVIEWS_FILE: &str = "reviews.csv";
pub const NEIGHBOURHOODS_FILE: &str = "neighbourhoods.csv";

/// Tables loaded for one city
#[derive(Debug, Clone)]
pub struct CityDataset {
    pub city: String,
    /// Listings with `price` as `f64`
    pub listings: DataFrame,
    pub reviews: DataFrame,
    pub neighbourhoods: Option<DataFrame>,
}

/// Row counts and columns of a loaded city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub city: String,
    pub listings: usize,
    pub reviews: usize,
    pub neighbourhoods: Option<usize>,
    pub listing_columns: Vec<String>,
}

impl CityDataset {
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            city: self.city.clone(),
            listings: self.listings.height(),
            reviews: self.reviews.height(),
            neighbourhoods: self.neighbourhoods.as_ref().map(|df| df.height()),
            listing_columns: self
                .listings
                .get_column_names()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Loads city datasets from a data root
#[derive(Debug, Clone)]
pub struct CityDataLoader {
    root: PathBuf,
    infer_schema_length: Option<usize>,
}

impl CityDataLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            infer_schema_length: Some(10_000),
        }
    }

    /// Rows scanned for type inference (`None` scans the whole file)
    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn city_dir(&self, city: &str) -> PathBuf {
        self.root.join(city)
    }

    /// Load listings (with a cleaned price column), reviews and, when
    /// present, neighbourhoods.
    pub fn load(&self, city: &str) -> Result<CityDataset> {
        let start = Instant::now();
        let dir = self.city_dir(city);

        let listings = self.read_csv(&dir.join(LISTINGS_FILE), "listings")?;
        let listings = clean_price_column(&listings)?;
        let reviews = self.read_csv(&dir.join(REVIEWS_FILE), "reviews")?;

        let neighbourhoods_path = dir.join(NEIGHBOURHOODS_FILE);
        let neighbourhoods = if neighbourhoods_path.exists() {
            Some(self.read_csv(&neighbourhoods_path, "neighbourhoods")?)
        } else {
            debug!(city, "No neighbourhoods file");
            None
        };

        info!(
            city,
            listings = listings.height(),
            reviews = reviews.height(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded city data"
        );

        Ok(CityDataset {
            city: city.to_string(),
            listings,
            reviews,
            neighbourhoods,
        })
    }

    /// Load only the listings table, price cleaned
    pub fn load_listings(&self, city: &str) -> Result<DataFrame> {
        let listings = self.read_csv(&self.city_dir(city).join(LISTINGS_FILE), "listings")?;
        clean_price_column(&listings)
    }

    fn read_csv(&self, path: &Path, dataset: &str) -> Result<DataFrame> {
        let file = File::open(path)
            .map_err(|e| InsightsError::dataset(dataset, format!("{}: {}", path.display(), e)))?;

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| InsightsError::dataset(dataset, format!("{}: {}", path.display(), e)))
    }
}

/// Parse a price string such as `"$1,250.00"`. Blank or malformed input is `None`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Convert the listings `price` column to `f64`, stripping currency symbols
/// and thousands separators from text prices.
pub fn clean_price_column(listings: &DataFrame) -> Result<DataFrame> {
    let column = listings
        .column("price")
        .map_err(|_| InsightsError::missing_column("listings", "price"))?;
    let series = column.as_materialized_series();

    let cleaned: Series = match series.dtype() {
        DataType::String => {
            let prices: Float64Chunked = series
                .str()?
                .into_iter()
                .map(|v| v.and_then(parse_price))
                .collect();
            prices.with_name("price".into()).into_series()
        }
        _ => series.cast(&DataType::Float64)?,
    };

    let mut result = listings.clone();
    result.with_column(cleaned)?;
    Ok(result)
}

/// City directories under the data root, sorted by name
pub fn list_cities(root: impl AsRef<Path>) -> Result<Vec<String>> {
    let root = root.as_ref();
    let entries = std::fs::read_dir(root)
        .map_err(|e| InsightsError::dataset("data root", format!("{}: {}", root.display(), e)))?;

    let mut cities = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                cities.push(name.to_string());
            }
        }
    }
    cities.sort();
    Ok(cities)
}
