use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pharmalocate_core::Coordinates;
use pharmalocate_gemini::GeminiClient;
use pharmalocate_search::{SearchOrchestrator, StaticGeoProvider};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

#[derive(Debug, Parser)]
#[command(name = "pharmalocate")]
#[command(about = "Find nearby pharmacies, their opening hours and likely medicine stock")]
struct Cli {
    /// Device latitude; overrides PHARMALOCATE_LATITUDE
    #[arg(long, global = true, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Device longitude; overrides PHARMALOCATE_LONGITUDE
    #[arg(long, global = true, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for pharmacies; an empty query searches near the device
    Search {
        query: Vec<String>,

        /// Look up opening hours for every result
        #[arg(long)]
        with_hours: bool,

        /// Print the full snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search by the postal code of the device position
    Pincode {
        #[arg(long)]
        json: bool,
    },
    /// Find a pharmacy by name, then assess whether it stocks a medicine
    Stock {
        #[arg(required = true)]
        pharmacy: Vec<String>,

        #[arg(long)]
        medicine: String,
    },
    /// Read medicine names from a prescription image
    Scan {
        image: PathBuf,

        /// Search for pharmacies stocking the detected medicines
        #[arg(long)]
        search: bool,

        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn position_override(&self) -> Option<Coordinates> {
        self.lat
            .zip(self.lon)
            .map(|(lat, lon)| Coordinates::new(lat, lon))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = pharmalocate_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let gateway = GeminiClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("failed to build Gemini client: {e}"))?;
    let position = cli.position_override().or(config.default_location);
    let orchestrator = SearchOrchestrator::new(gateway, StaticGeoProvider::new(position));
    tracing::debug!(env = %config.env, model = %config.gemini_model, "starting");
    orchestrator.initialize().await;

    match cli.command {
        Commands::Search {
            query,
            with_hours,
            json,
        } => commands::run_search(&orchestrator, &query.join(" "), with_hours, json).await,
        Commands::Pincode { json } => commands::run_pincode(&orchestrator, json).await,
        Commands::Stock { pharmacy, medicine } => {
            commands::run_stock(&orchestrator, &pharmacy.join(" "), &medicine).await
        }
        Commands::Scan {
            image,
            search,
            json,
        } => commands::run_scan(&orchestrator, &image, search, json).await,
    }
}

#[cfg(test)]
mod tests;
