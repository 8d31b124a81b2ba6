//! Utility functions and types

pub mod data_loader;

pub use data_loader::{
    clean_price_column, list_cities, parse_price, CityDataLoader, CityDataset, DatasetSummary,
};
