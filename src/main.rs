use clap::Parser;
use poly_edge::cli::{Cli, Commands};
use poly_edge::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    poly_edge::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Scan(args) => {
            tracing::info!("Starting one-shot scan");
            args.execute(config).await?;
        }
        Commands::Watch(args) => {
            tracing::info!("Starting auto-refresh watch");
            args.execute(config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Instruments: {}", config.instruments.len());
            for instrument in &config.instruments {
                println!(
                    "    {} ({}) slug={}",
                    instrument.ticker, instrument.name, instrument.slug
                );
            }
            println!(
                "  Resolution: {}",
                config.pricing.resolution_date.to_rfc3339()
            );
            println!("  Risk-free rate: {}", config.pricing.risk_free_rate);
            println!(
                "  Scanner: top {} / every {}s",
                config.scanner.top_n, config.scanner.refresh_interval_secs
            );
        }
    }

    Ok(())
}
