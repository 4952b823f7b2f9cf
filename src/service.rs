use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use chrono::{Local, SubsecRound};
use tower::Service;
use tracing::info;

use crate::chrome::ChromeDriver;
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::pipeline::{execute, prepare, ScrapeReport};
use crate::state::PagePlan;

/// スクレイピングリクエスト
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub output_path: PathBuf,
    pub batch_counter_path: PathBuf,
    pub headless: bool,
}

impl ScrapeRequest {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            batch_counter_path: PathBuf::from("batch_number.txt"),
            headless: false,
        }
    }

    pub fn with_batch_counter_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.batch_counter_path = path.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// サービスの基本設定にリクエストの値を上書きする
    pub fn apply(self, base: ScraperConfig) -> ScraperConfig {
        base.with_output_path(self.output_path)
            .with_batch_counter_path(self.batch_counter_path)
            .with_headless(self.headless)
    }
}

impl From<&ScraperConfig> for ScrapeRequest {
    fn from(config: &ScraperConfig) -> Self {
        Self {
            output_path: config.output_path.clone(),
            batch_counter_path: config.batch_counter_path.clone(),
            headless: config.headless,
        }
    }
}

/// tower::Serviceを実装したスクレイパーサービス
#[derive(Debug, Clone, Default)]
pub struct ScraperService {
    config: ScraperConfig,
}

impl ScraperService {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }
}

impl Service<ScrapeRequest> for ScraperService {
    type Response = ScrapeReport;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        info!("Scrape request: output={:?}", req.output_path);
        let config = req.apply(self.config.clone());

        Box::pin(async move {
            let ctx = prepare(&config, Local::now().naive_local().trunc_subsecs(0))?;

            // 全ページ処理済みならブラウザは起動しない
            if let PagePlan::Exhausted { .. } = ctx.plan {
                return Ok(ScrapeReport::from(&ctx));
            }

            let mut driver = ChromeDriver::launch(&config).await?;
            let report = execute(&mut driver, &config, &ctx).await?;

            info!(
                "Scrape finished: batch={}, links={}, skipped={}, written={}",
                report.batch_number,
                report.links_collected,
                report.recipes_skipped,
                report.records_written
            );
            Ok(report)
        })
    }
}
