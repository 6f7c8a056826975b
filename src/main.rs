use anyhow::{Context, Result};
use std::env;
use tracing::info;

use lightbnb_db::config::Config;
use lightbnb_db::db::models::property::PropertyFilters;
use lightbnb_db::db::postgres::pool;
use lightbnb_db::Repositories;

// Connects with the deployed configuration and prints the cheapest listings,
// optionally narrowed to the city given as the first argument.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // --- Configuration ---
    let config_path =
        env::var("CONFIG_PATH").unwrap_or_else(|_| "config/lightbnb.toml".to_string());
    info!("Loading configuration from: {}", config_path);
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    // --- Database Setup ---
    let db_pool = pool::connect(&config.database)?;
    let repos = Repositories::new(db_pool);

    let filters = PropertyFilters {
        city: env::args().nth(1),
        ..Default::default()
    };
    let listings = repos
        .properties
        .get_all_properties(&filters, None)
        .await
        .context("Failed to fetch property listings")?;
    info!(count = listings.len(), "Fetched property listings");

    println!("{}", serde_json::to_string_pretty(&listings)?);
    Ok(())
}
