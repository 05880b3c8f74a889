//! Campaign Express: customer segmentation and personalized campaign pipeline.
//!
//! Runs the pipeline for one customer or the whole directory and exports the
//! results.

use campaign_agents::{build_enhancer, PipelineOrchestrator, PipelineOutcome, PipelineResult};
use campaign_cdp::{CustomerDirectory, MockSocialProvider};
use campaign_core::config::AppConfig;
use campaign_reporting::{BatchSummary, ReportWriter};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-express")]
#[command(about = "Customer segmentation and personalized campaign pipeline")]
#[command(version)]
struct Cli {
    /// JSON file with customer records (overrides config)
    #[arg(long, global = true, env = "CAMPAIGN_EXPRESS__DATA__CUSTOMERS_PATH")]
    customers: Option<String>,

    /// Directory for exported results (overrides config)
    #[arg(long, global = true, env = "CAMPAIGN_EXPRESS__OUTPUT__DIR")]
    output_dir: Option<String>,

    /// Rewrite campaign copy with the generative enhancer
    #[arg(long, global = true, default_value_t = false)]
    enhance: bool,

    /// Simulated social lookup latency in milliseconds (overrides config)
    #[arg(long, global = true, env = "CAMPAIGN_EXPRESS__SOCIAL__LATENCY_MS")]
    social_latency_ms: Option<u64>,

    /// Emit logs as JSON
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Skip writing result files
    #[arg(long, global = true, default_value_t = false)]
    no_export: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the pipeline for one customer
    Run {
        /// Customer name, matched exactly
        name: String,
    },
    /// Run the pipeline for every customer, one after another
    Batch,
    /// List the customers in the directory
    List,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "campaign_express=info,campaign_agents=info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(path) = cli.customers.clone() {
        config.data.customers_path = Some(path);
    }
    if let Some(dir) = cli.output_dir.clone() {
        config.output.dir = dir;
    }
    if let Some(latency) = cli.social_latency_ms {
        config.social.latency_ms = latency;
    }
    if cli.enhance {
        config.enhancer.enabled = true;
    }

    info!(
        customers = config.data.customers_path.as_deref().unwrap_or("demo"),
        output_dir = %config.output.dir,
        social_latency_ms = config.social.latency_ms,
        enhancer = config.enhancer.enabled,
        "Configuration loaded"
    );

    let directory = match &config.data.customers_path {
        Some(path) => CustomerDirectory::from_json_file(path)?,
        None => CustomerDirectory::demo(),
    };

    if let Commands::List = cli.command {
        for customer in directory.iter() {
            println!(
                "{:>4}  {:<24} {}",
                customer.id,
                customer.name,
                customer.sector_str()
            );
        }
        return Ok(());
    }

    let social = MockSocialProvider::demo(Duration::from_millis(config.social.latency_ms));
    let mut orchestrator = PipelineOrchestrator::new(Arc::new(directory), Arc::new(social));
    if config.enhancer.enabled {
        orchestrator = orchestrator.with_enhancer(
            build_enhancer(&config.enhancer),
            Duration::from_millis(config.enhancer.timeout_ms),
        );
    }

    let writer = (!cli.no_export).then(|| ReportWriter::new(&config.output.dir));

    match cli.command {
        Commands::Run { name } => cmd_run(&orchestrator, writer.as_ref(), &name).await,
        Commands::Batch => cmd_batch(&orchestrator, writer.as_ref()).await,
        Commands::List => Ok(()),
    }
}

async fn cmd_run(
    orchestrator: &PipelineOrchestrator,
    writer: Option<&ReportWriter>,
    name: &str,
) -> anyhow::Result<()> {
    let outcome = orchestrator.run(name).await;
    println!("{}", outcome.log().render());
    println!();

    match outcome {
        PipelineOutcome::Completed(result) => {
            print_campaign(&result);
            if let Some(writer) = writer {
                let path = writer.write_run(&result)?;
                println!("Result written to: {}", path.display());
            }
            Ok(())
        }
        PipelineOutcome::Failed(failure) => {
            anyhow::bail!("pipeline failed at {}: {}", failure.failed_at, failure.error)
        }
    }
}

async fn cmd_batch(
    orchestrator: &PipelineOrchestrator,
    writer: Option<&ReportWriter>,
) -> anyhow::Result<()> {
    let outcomes = orchestrator.run_batch().await;

    for outcome in &outcomes {
        match outcome {
            PipelineOutcome::Completed(result) => {
                println!(
                    "{:<24} {:<16} {:<24} {}",
                    result.customer.name,
                    result.segmentation.result.segment.as_str(),
                    result.campaign.payload.name,
                    result.campaign.payload.channel
                );
                if let Some(writer) = writer {
                    writer.write_run(result)?;
                }
            }
            PipelineOutcome::Failed(failure) => {
                eprintln!("FAILED: {}", failure.error);
            }
        }
    }

    let summary = BatchSummary::from_outcomes(&outcomes);
    println!();
    println!(
        "Processed {} customers: {} completed, {} failed",
        summary.total, summary.completed, summary.failed
    );

    if let Some(writer) = writer {
        let json = writer.write_summary(&summary)?;
        let csv = writer.write_summary_csv(&summary)?;
        println!("Summary written to: {} and {}", json.display(), csv.display());
    }

    Ok(())
}

fn print_campaign(result: &PipelineResult) {
    let segmentation = &result.segmentation.result;
    let payload = &result.campaign.payload;

    println!(
        "Segment:    {} ({:.0}% confidence)",
        segmentation.segment.display_name(),
        segmentation.confidence * 100.0
    );
    for reason in &segmentation.reasons {
        println!("  - {reason}");
    }
    println!("Campaign:   {} via {}", payload.name, payload.channel);
    println!("Discount:   {:.0}%", payload.discount * 100.0);
    println!(
        "Estimated:  open {} / CTR {} / conversion {}",
        payload.metrics.open_rate,
        payload.metrics.click_through_rate,
        payload.metrics.conversion_rate
    );
    println!("Enhanced:   {}", if payload.was_enhanced() { "yes" } else { "no" });
    println!();
    println!("Subject: {}", payload.subject);
    println!();
    println!("{}", payload.body);
    println!();
    println!("[{}]", payload.cta);
}
