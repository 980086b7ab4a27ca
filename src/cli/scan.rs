//! Scan command implementation

use super::table;
use crate::config::Config;
use crate::scanner::{LiveMarketData, Scanner};
use clap::Args;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Show the detailed view for one ticker instead of the global table
    #[arg(short, long)]
    pub ticker: Option<String>,
}

impl ScanArgs {
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let source = LiveMarketData::new(&config.api)?;
        let scanner = Scanner::new(config.clone(), source);

        let Some(dashboard) = scanner.try_refresh().await? else {
            anyhow::bail!("refresh already in progress");
        };

        match &self.ticker {
            Some(ticker) => {
                let Some(view) = dashboard.instrument(ticker) else {
                    anyhow::bail!("unknown or unavailable ticker: {}", ticker);
                };
                println!("{}", table::render_instrument(view, &config.pricing));
            }
            None => {
                println!("{}", table::render_opportunities(&dashboard));
            }
        }

        Ok(())
    }
}
