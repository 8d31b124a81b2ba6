//! Rental Insights CLI Module
//!
//! Command-line surface for training the price model, predicting prices,
//! exploring a city's market and inspecting the data root.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::analysis::{MarketAnalysis, DEFAULT_BINS};
use crate::inference::PricePredictor;
use crate::pipeline::{PipelineConfig, PipelineOutcome, PricePipeline};
use crate::training::PerformanceRecord;
use crate::utils::{list_cities, CityDataLoader};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn kv(key: &str, val: &str) {
    println!("  {:<22} {}", muted(key), val.white());
}

fn money(value: f64) -> String {
    format!("${:.2}", value)
}

fn performance_header() -> String {
    format!("{:<20} {:>8} {:>10} {:>10} {:>8}", "Model", "R²", "RMSE", "MAE", "CV R²")
}

fn performance_row(record: &PerformanceRecord) -> String {
    format!(
        "{:<20} {:>8.4} {:>10.2} {:>10.2} {:>8.4}",
        record.family.name(),
        record.r2,
        record.rmse,
        record.mae,
        record.cv_score
    )
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "rental-insights")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Short-term rental market analytics and nightly price prediction")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the price model for a city and report model performance
    Train {
        /// Data root holding one directory per city
        #[arg(short, long)]
        data_dir: PathBuf,

        /// City directory name
        #[arg(short, long)]
        city: String,

        /// JSON file overriding pipeline settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// Where to write the trained model bundle
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Predict a nightly price with a saved model bundle
    Predict {
        /// Model bundle written by `train`
        #[arg(short, long)]
        model: PathBuf,

        /// Feature value as name=value; repeat for each feature
        #[arg(short, long = "feature", value_name = "NAME=VALUE")]
        features: Vec<String>,
    },

    /// Neighbourhood counts, average prices and price distribution
    Analyze {
        #[arg(short, long)]
        data_dir: PathBuf,

        #[arg(short, long)]
        city: String,

        /// Neighbourhood to report average price and histogram for
        #[arg(short, long)]
        neighbourhood: Option<String>,

        /// Histogram bins
        #[arg(long, default_value_t = DEFAULT_BINS)]
        bins: usize,
    },

    /// List cities, or describe one city's datasets
    Info {
        #[arg(short, long)]
        data_dir: PathBuf,

        #[arg(short, long)]
        city: Option<String>,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    data_dir: &Path,
    city: &str,
    config_path: Option<&Path>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Train");

    let config = match config_path {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    step_run(&format!("Loading {}", city.cyan()));
    let start = Instant::now();
    let listings = CityDataLoader::new(data_dir).load_listings(city)?;
    step_done(&format!("{} listings in {:?}", listings.height(), start.elapsed()));

    step_run("Preparing, selecting and tuning");
    let start = Instant::now();
    let outcome = PricePipeline::new(config).run(&listings)?;
    step_done(&format!("{:.1}s", start.elapsed().as_secs_f64()));

    let report = match outcome {
        PipelineOutcome::Trained(report) => report,
        PipelineOutcome::InsufficientData { rows, required } => {
            println!();
            println!(
                "  {} only {} usable listings, at least {} needed to train",
                "!".yellow().bold(),
                rows,
                required
            );
            println!();
            return Ok(());
        }
    };

    section("Model performance");
    println!("    {}", muted(&performance_header()));
    for record in &report.performance {
        let marker = if record.family == report.best_family { ok("●") } else { dim("○") };
        println!("  {} {}", marker, performance_row(record));
    }

    section("Feature importance");
    for item in report.importance.iter().take(10) {
        let bar = "█".repeat((item.importance * 40.0).round() as usize);
        println!("  {:<36} {:>6.3} {}", item.feature, item.importance, accent(&bar));
    }

    section("Summary");
    kv("Best model", report.best_family.name());
    kv("Prepared listings", &report.prepared_rows.to_string());
    kv("Training listings", &report.train_rows.to_string());
    kv("Selected features", &report.bundle.feature_names().join(", "));

    if let Some(path) = output {
        report.bundle.save(path)?;
        println!();
        println!("  {} model saved to {}", ok("✓"), path.display().to_string().cyan());
    }
    println!();

    Ok(())
}

pub fn cmd_predict(model_path: &Path, features: &[String]) -> anyhow::Result<()> {
    section("Predict");

    let predictor = PricePredictor::from_file(model_path)?;
    if let Some(bundle) = predictor.bundle() {
        kv("Model", bundle.family().name());
        kv("Expected features", &bundle.feature_names().join(", "));
    }

    let price = predictor.predict_text(features)?;
    println!();
    println!("  {:<22} {}", muted("Predicted price"), money(price).white().bold());
    println!();

    Ok(())
}

pub fn cmd_analyze(
    data_dir: &Path,
    city: &str,
    neighbourhood: Option<&str>,
    bins: usize,
) -> anyhow::Result<()> {
    section(&format!("Market analysis · {}", city));

    let listings = CityDataLoader::new(data_dir).load_listings(city)?;
    let analysis = MarketAnalysis::new(&listings)?;
    let summary = analysis.summary();

    kv("Listings", &summary.total_listings.to_string());
    kv("Priced listings", &summary.priced_listings.to_string());
    if let Some(avg) = summary.average_price {
        kv("Average price", &money(avg));
    }

    section("Properties per neighbourhood");
    for entry in summary.neighbourhoods.iter().take(20) {
        println!("  {:<36} {:>6}", entry.neighbourhood, entry.count);
    }
    if summary.neighbourhoods.len() > 20 {
        println!("  {}", dim(&format!("… {} more", summary.neighbourhoods.len() - 20)));
    }

    if let Some(name) = neighbourhood {
        section(&format!("Prices in {}", name));
        match analysis.average_price(name) {
            Some(avg) => kv("Average price", &money(avg)),
            None => println!("  {}", "No priced listings".yellow()),
        }

        let histogram = analysis.price_histogram(name, bins)?;
        let peak = histogram.iter().map(|b| b.count).max().unwrap_or(0).max(1);
        for bin in histogram.iter().filter(|b| b.count > 0) {
            let bar = "█".repeat((bin.count * 30).div_ceil(peak));
            println!(
                "  {:>10} – {:<10} {:>5} {}",
                money(bin.lower),
                money(bin.upper),
                bin.count,
                accent(&bar)
            );
        }
    }
    println!();

    Ok(())
}

pub fn cmd_info(data_dir: &Path, city: Option<&str>) -> anyhow::Result<()> {
    match city {
        None => {
            section("Cities");
            let cities = list_cities(data_dir)?;
            if cities.is_empty() {
                println!("  {}", dim("no city directories found"));
            }
            for name in cities {
                println!("  {} {}", accent("›"), name);
            }
        }
        Some(city) => {
            section(&format!("Dataset · {}", city));
            let summary = CityDataLoader::new(data_dir).load(city)?.summary();
            kv("Listings", &summary.listings.to_string());
            kv("Reviews", &summary.reviews.to_string());
            kv(
                "Neighbourhoods",
                &summary
                    .neighbourhoods
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "not provided".to_string()),
            );
            kv("Listing columns", &summary.listing_columns.len().to_string());
        }
    }
    println!();

    Ok(())
}
