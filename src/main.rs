//! Rental Insights - Main Entry Point
//!
//! Market analytics and nightly price prediction for short-term rentals.

use clap::Parser;
use rental_insights::cli::{cmd_analyze, cmd_info, cmd_predict, cmd_train, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rental_insights=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { data_dir, city, config, output } => {
            cmd_train(&data_dir, &city, config.as_deref(), output.as_deref())?;
        }
        Commands::Predict { model, features } => {
            cmd_predict(&model, &features)?;
        }
        Commands::Analyze { data_dir, city, neighbourhood, bins } => {
            cmd_analyze(&data_dir, &city, neighbourhood.as_deref(), bins)?;
        }
        Commands::Info { data_dir, city } => {
            cmd_info(&data_dir, city.as_deref())?;
        }
    }

    Ok(())
}
