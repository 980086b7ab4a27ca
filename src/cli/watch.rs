//! Watch command implementation
//!
//! Auto-refresh loop in the style of the scan command, with change markers
//! carried between cycles. A tick that lands while a refresh is still running
//! is skipped by the scanner's busy guard rather than queued.

use super::table;
use crate::config::Config;
use crate::scanner::{LiveMarketData, Scanner};
use clap::Args;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Refresh interval in seconds (overrides config)
    #[arg(short, long)]
    pub interval: Option<u64>,
}

impl WatchArgs {
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let secs = self
            .interval
            .unwrap_or(config.scanner.refresh_interval_secs);

        let source = LiveMarketData::new(&config.api)?;
        let scanner = Scanner::new(config, source);

        tracing::info!(interval_secs = secs, "starting watch loop");

        let mut ticker = tokio::time::interval(Duration::from_secs(secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match scanner.try_refresh().await {
                        Ok(Some(dashboard)) => {
                            println!("{}", table::render_opportunities(&dashboard));
                        }
                        Ok(None) => {
                            tracing::debug!("tick skipped, refresh still running");
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "refresh cycle failed");
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("received shutdown signal");
                    break;
                }
            }
        }

        Ok(())
    }
}
