use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, warn};

use campus_scraper::config::Config;
use campus_scraper::constants;
use campus_scraper::faults::FaultPolicy;
use campus_scraper::gateway::{GeminiBackend, ModelGateway};
use campus_scraper::logging;
use campus_scraper::pipeline::{Pipeline, RunOptions, RunSummary};
use campus_scraper::reconcile::InMemoryRecordStore;
use campus_scraper::sources::cordy::CordySource;
use campus_scraper::sources::fetch::HttpFetcher;
use campus_scraper::sources::sg_innovate::SgInnovateSource;
use campus_scraper::sources::EventSource;

#[derive(Parser)]
#[command(name = "campus_scraper")]
#[command(about = "Academic event data scraper for the campus events catalog")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scrape of all (or selected) sources
    Scrape {
        /// Specific sources to run (comma-separated). Available: cordy, sg_innovate
        #[arg(long)]
        sources: Option<String>,
        /// Snapshot and print the results without reconciling into the store
        #[arg(long)]
        no_persist: bool,
        /// Pause for operator confirmation on unparseable/fatal conditions
        #[arg(long)]
        interactive: bool,
    },
    /// Run scrapes on a fixed schedule
    Schedule {
        /// Minutes between runs (overrides config.toml)
        #[arg(long)]
        interval_minutes: Option<u64>,
    },
    /// List the supported sources
    Sources,
}

fn create_source(source_name: &str) -> Option<Box<dyn EventSource>> {
    match source_name {
        constants::CORDY_SOURCE => Some(Box::new(CordySource::new())),
        constants::SG_INNOVATE_SOURCE => Some(Box::new(SgInnovateSource::new())),
        _ => None,
    }
}

fn build_pipeline(config: &Config, sources_arg: Option<&str>) -> anyhow::Result<Pipeline> {
    let source_names: Vec<String> = match sources_arg {
        Some(list) => list.split(',').map(|s| s.trim().to_string()).collect(),
        None => config.run.sources.clone(),
    };

    let mut sources = Vec::new();
    for name in &source_names {
        match create_source(name) {
            Some(source) => sources.push(source),
            None => {
                warn!("Unknown source specified");
                println!("⚠️  Unknown source: {name}");
            }
        }
    }

    let backend = GeminiBackend::from_env().context("GEMINI_API_KEY must be set")?;
    let gateway = ModelGateway::new(Box::new(backend), &config.gateway);
    let store = Arc::new(InMemoryRecordStore::new());
    Ok(Pipeline::new(
        sources,
        Box::new(HttpFetcher::new()),
        gateway,
        store,
        config.fetch.clone(),
    ))
}

fn print_summary(summary: &RunSummary) {
    println!("\n📊 Run results:");
    println!("   Scraped: {}", summary.scraped);
    println!("   Classified: {}", summary.classified);
    println!("   Snapshot: {}", summary.snapshot_file);
    if let Some(reconcile) = &summary.reconcile {
        println!(
            "   Created: {}   Updated: {}   Failed: {}",
            reconcile.created, reconcile.updated, reconcile.failed
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::load().context("loading config.toml")?;
    logging::init_logging(config.run.verbosity);

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            sources,
            no_persist,
            interactive,
        } => {
            println!("🔄 Running scrape pipeline...");
            let pipeline = build_pipeline(&config, sources.as_deref())?;
            let options = RunOptions {
                persist: config.run.persist && !no_persist,
                faults: if interactive || config.run.interactive {
                    FaultPolicy::Interactive
                } else {
                    FaultPolicy::Unattended
                },
                output_dir: config.run.output_dir.clone(),
            };
            match pipeline.run(&options).await {
                Ok(summary) => {
                    print_summary(&summary);
                    println!("✅ Run completed successfully");
                }
                Err(e) => {
                    error!("Pipeline run failed: {}", e);
                    println!("❌ Run failed: {e}");
                }
            }
        }
        Commands::Schedule { interval_minutes } => {
            let interval = interval_minutes.unwrap_or(config.schedule.interval_minutes);
            let pipeline = build_pipeline(&config, None)?;
            // Scheduled runs can never prompt an operator
            let options = RunOptions {
                persist: config.run.persist,
                faults: FaultPolicy::Unattended,
                output_dir: config.run.output_dir.clone(),
            };
            println!("⏰ Scraping every {interval} minutes. Press Ctrl-C to stop.");
            pipeline.run_on_schedule(interval, options).await;
        }
        Commands::Sources => {
            println!("Supported sources:");
            for name in constants::supported_sources() {
                println!("   - {name}");
            }
        }
    }
    Ok(())
}
