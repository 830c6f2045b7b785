use clap::Parser;
use mortality_etl::config::toml_config::TomlConfig;
use mortality_etl::utils::{logger, validation::Validate};
use mortality_etl::{EtlEngine, LocalStorage, RatesPipeline};

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "Run a death-rates job described by a TOML file")]
struct Args {
    /// Path to the TOML job file
    #[arg(short, long, default_value = "rates-job.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the monitoring setting from the job file
    #[arg(long)]
    monitor: Option<bool>,

    /// Show what would be processed without running the pipeline
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("Loading job file: {}", args.config);
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load job file '{}': {}", args.config, e);
            eprintln!("Suggestion: {}", e.recovery_suggestion());
            std::process::exit(2);
        }
    };

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    let job_name = config.job.name.clone();
    let settings = config.resolve();

    if let Err(e) = settings.validate() {
        tracing::error!("Job validation failed: {}", e);
        eprintln!("{}", e.user_friendly_message());
        eprintln!("Suggestion: {}", e.recovery_suggestion());
        std::process::exit(2);
    }

    tracing::info!(
        "Job '{}': year {}, {} location(s), output to {}",
        job_name,
        settings.year,
        settings.locations.len(),
        settings.output_path
    );

    if args.dry_run {
        for spec in &settings.locations {
            tracing::info!("Would compute rates for {} ({})", spec.name, spec.rate_column);
        }
        tracing::info!("Dry run, nothing executed");
        return Ok(());
    }

    let storage = LocalStorage::new(".".to_string());
    let pipeline = RatesPipeline::new(storage, settings);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            println!("Report saved to: {}", output_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Job '{}' failed: {}", job_name, e);
            eprintln!("{}", e.user_friendly_message());
            eprintln!("Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }
}
