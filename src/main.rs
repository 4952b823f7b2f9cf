//! 定期実行用エントリポイント
//!
//! 設定は環境変数から読む（`RECIPE_OUTPUT`, `RECIPE_BATCH_FILE`, `CHROME_PATH` など）。
//! 同時に複数起動しないことはスケジューラ側で保証すること。

use recipe_scraper::{PagePlan, ScrapeRequest, ScraperConfig, ScraperService};
use tower::Service;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ログ設定
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ScraperConfig::from_env()?;
    let request = ScrapeRequest::from(&config);
    let mut service = ScraperService::new(config);

    match service.call(request).await {
        Ok(report) => {
            match report.plan {
                PagePlan::Scrape(range) => info!(
                    "Batch {} done: pages {}, {} links, {} skipped, {} written",
                    report.batch_number,
                    range,
                    report.links_collected,
                    report.recipes_skipped,
                    report.records_written
                ),
                PagePlan::Exhausted { .. } => {
                    info!("Batch {}: nothing left to scrape", report.batch_number)
                }
            }
            Ok(())
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            Err(e.into())
        }
    }
}
