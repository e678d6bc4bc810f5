#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for rental listing hotspot analysis.
//!
//! ```text
//! hotspot cities
//! hotspot analyze --city nyc --listings listings.csv.gz [--premium-threshold 250]
//! ```
//!
//! Uses `indicatif-log-bridge` (via [`hotspot_cli_utils::init_logger`]) so
//! log lines and progress bars never fight for the terminal. Set
//! `RUST_LOG=info` for per-stage logging.

mod export;
mod input;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hotspot_analysis::progress::ProgressCallback;
use hotspot_analysis::{AnalysisOptions, analyze};
use hotspot_analysis_models::AnalysisSummary;
use hotspot_city::{parse_city_toml, registry};
use hotspot_city_models::CityConfig;
use hotspot_cli_utils::{IndicatifProgress, MultiProgress};

#[derive(Parser)]
#[command(
    name = "hotspot",
    about = "Find premium short-term-rental hotspots and score neighborhoods"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered cities
    Cities,
    /// Analyze a listings snapshot for one city
    Analyze {
        /// City code from the registry (see `cities`)
        #[arg(long)]
        city: String,
        /// Listings CSV, optionally gzip compressed (`.csv.gz`)
        #[arg(long)]
        listings: PathBuf,
        /// City configuration TOML to use instead of the registry entry
        #[arg(long)]
        config: Option<PathBuf>,
        /// Lower price bound of the first tier
        #[arg(long)]
        premium_threshold: Option<f64>,
        /// Only analyze the first N listings
        #[arg(long)]
        max_listings: Option<usize>,
        /// Snapshot date label (defaults to today)
        #[arg(long)]
        snapshot_date: Option<String>,
        /// Directory for result files
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = hotspot_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Cities => {
            println!("{:<14} NAME", "CODE");
            println!("{}", "-".repeat(40));
            for city in registry::all_cities() {
                println!("{:<14} {}", city.code, city.name);
            }
        }
        Commands::Analyze {
            city,
            listings,
            config,
            premium_threshold,
            max_listings,
            snapshot_date,
            output_dir,
        } => {
            let config = load_config(&city, config.as_deref())?;
            let snapshot_date = snapshot_date.unwrap_or_else(|| {
                chrono::Local::now()
                    .date_naive()
                    .format("%Y-%m-%d")
                    .to_string()
            });
            let options = AnalysisOptions {
                snapshot_date: Some(snapshot_date.clone()),
                premium_threshold,
                max_listings,
            };

            let summary = run_analysis(&multi, &config, &listings, &options)?;
            print_findings(&summary);

            let files = export::OutputFiles::new(
                &output_dir,
                &config.code,
                &snapshot_date,
                summary.premium_threshold,
            );
            let written = export::write_all(&files, &summary, &config)?;
            println!();
            println!("Wrote {} files:", written.len());
            for path in written {
                println!("  {}", path.display());
            }
        }
    }

    Ok(())
}

fn load_config(
    city: &str,
    path: Option<&std::path::Path>,
) -> Result<CityConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(registry::find_city(city)?);
    };

    let contents = std::fs::read_to_string(path)?;
    let config = parse_city_toml(&contents)?;
    if !config.code.eq_ignore_ascii_case(city) {
        log::warn!(
            "Config {} is for '{}', not '{city}'",
            path.display(),
            config.code
        );
    }
    Ok(config)
}

fn run_analysis(
    multi: &MultiProgress,
    config: &CityConfig,
    listings: &std::path::Path,
    options: &AnalysisOptions,
) -> Result<AnalysisSummary, Box<dyn std::error::Error>> {
    let loading = IndicatifProgress::records_spinner(multi, "Reading listings");
    let loaded = input::load_listings(listings, &loading)?;
    loading.finish(format!("Read {} listings", loaded.listings.len()));

    let stages = IndicatifProgress::stages_bar(multi, &format!("Analyzing {}", config.name));
    Ok(analyze(&loaded.listings, config, options, &stages)?)
}

fn print_findings(summary: &AnalysisSummary) {
    println!();
    println!(
        "{} ({}), snapshot {}",
        summary.city_name,
        summary.city_code,
        summary.snapshot_date.as_deref().unwrap_or("-")
    );
    println!(
        "Listings: {} received, {} cleaned, {} dropped",
        summary.total_listings_received,
        summary.total_listings_after_cleaning,
        summary.cleaning.dropped_count()
    );
    if let Some(median) = summary.median_price {
        println!("Median nightly price: ${median:.2}");
    }
    println!("Premium threshold: ${:.2}", summary.premium_threshold);

    println!();
    println!(
        "{:<16} {:>9} {:>9} {:>7} TOP CLUSTER",
        "TIER", "LISTINGS", "CLUSTERS", "NOISE"
    );
    println!("{}", "-".repeat(80));
    for tier in &summary.tiers {
        let top = tier.clusters.first().map_or_else(
            || "-".to_string(),
            |c| {
                format!(
                    "{} listings, avg ${:.0} at ({:.4}, {:.4})",
                    c.listing_count,
                    c.average_price,
                    c.centroid_location.latitude,
                    c.centroid_location.longitude
                )
            },
        );
        println!(
            "{:<16} {:>9} {:>9} {:>7} {top}",
            tier.tier, tier.listing_count, tier.cluster_count, tier.noise_count
        );
    }

    if summary.neighborhoods.is_empty() {
        return;
    }

    println!();
    println!(
        "{:<5} {:<30} {:>7} {:>7} {:>7} {:>7}",
        "RANK", "NEIGHBORHOOD", "SCORE", "PRICE", "LOC", "DEMAND"
    );
    println!("{}", "-".repeat(70));
    for score in summary.neighborhoods.iter().take(10) {
        println!(
            "{:<5} {:<30} {:>7.1} {:>7.1} {:>7.1} {:>7.1}",
            score.rank,
            score.neighborhood,
            score.investment_score,
            score.price_score,
            score.location_score,
            score.demand_score
        );
    }
}
