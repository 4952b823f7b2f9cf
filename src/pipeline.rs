//! 1回分の実行: 状態読込 → 範囲計画 → リンク収集 → 抽出 → CSV追記

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::recipes::{collect_links, extract_recipe, BatchWriter, Extraction};
use crate::state::{plan, BatchCounter, PagePlan, RunState};
use crate::traits::BrowserDriver;

/// ブラウザを起動する前に確定する実行情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub load_date: NaiveDateTime,
    pub batch_number: u64,
    pub plan: PagePlan,
}

/// 実行結果のサマリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeReport {
    pub batch_number: u64,
    pub load_date: NaiveDateTime,
    pub plan: PagePlan,
    pub links_collected: usize,
    pub recipes_skipped: usize,
    pub records_written: usize,
}

impl From<&RunContext> for ScrapeReport {
    fn from(ctx: &RunContext) -> Self {
        Self {
            batch_number: ctx.batch_number,
            load_date: ctx.load_date,
            plan: ctx.plan,
            links_collected: 0,
            recipes_skipped: 0,
            records_written: 0,
        }
    }
}

/// 前回状態を読み、バッチ番号を確定・保存して、今回の範囲を決める
///
/// バッチ番号は結果に関わらずここで消費される（全ページ処理済みでも）。
pub fn prepare(config: &ScraperConfig, now: NaiveDateTime) -> Result<RunContext, ScraperError> {
    config.validate()?;

    let last_run = RunState::from_output(&config.output_path)?;
    let batch_number = BatchCounter::new(&config.batch_counter_path).next()?;
    let plan = plan(
        now.date(),
        last_run.as_ref(),
        config.total_pages,
        config.pages_per_day,
    );

    match plan {
        PagePlan::Scrape(range) => info!("Batch {}: scraping pages {}", batch_number, range),
        PagePlan::Exhausted { next_page } => info!(
            "Batch {}: all {} pages already processed (next would be {}), nothing to do",
            batch_number, config.total_pages, next_page
        ),
    }

    Ok(RunContext {
        load_date: now,
        batch_number,
        plan,
    })
}

/// 計画に従ってスクレイピングし、成否に関わらず最後にブラウザを閉じる
pub async fn execute<D: BrowserDriver>(
    driver: &mut D,
    config: &ScraperConfig,
    ctx: &RunContext,
) -> Result<ScrapeReport, ScraperError> {
    let result = scrape(driver, config, ctx).await;

    if let Err(e) = driver.quit().await {
        warn!("Failed to quit browser: {}", e);
    }

    result
}

async fn scrape<D: BrowserDriver>(
    driver: &mut D,
    config: &ScraperConfig,
    ctx: &RunContext,
) -> Result<ScrapeReport, ScraperError> {
    let mut report = ScrapeReport::from(ctx);
    let PagePlan::Scrape(range) = ctx.plan else {
        return Ok(report);
    };

    let links = collect_links(driver, config, range).await?;
    report.links_collected = links.len();

    let mut writer = BatchWriter::new(&config.output_path, ctx.load_date, ctx.batch_number);
    for link in &links {
        info!("Processing link: {}", link.url);
        match extract_recipe(driver, &link.url, config.recipe_timeout).await? {
            Extraction::Found(fields) => writer.push(fields, link),
            Extraction::NotFound { reason } => {
                warn!(
                    "No recipe extracted from {} (page {}): {}",
                    link.url, link.source_page, reason
                );
                report.recipes_skipped += 1;
            }
        }
    }

    report.records_written = writer.finish()?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::recipes::{listing_url, LOAD_DTE_FORMAT};
    use crate::state::PageRange;
    use crate::testing::{FakeDriver, FakePage};

    const BASE: &str = "https://example.test";

    fn config(dir: &tempfile::TempDir) -> ScraperConfig {
        ScraperConfig::new(dir.path().join("recipes.csv"))
            .with_batch_counter_path(dir.path().join("batch_number.txt"))
            .with_base_url(BASE)
            .with_pages(223, 2)
            .with_timeouts(Duration::from_millis(20), Duration::from_millis(20))
            .with_page_delay(Duration::ZERO)
    }

    fn now(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, LOAD_DTE_FORMAT).unwrap()
    }

    fn seed_output(config: &ScraperConfig, last_page: u32) {
        let content = format!(
            "title,ingredients,instructions,load_dte,batch_number,page_number\n\
             Adobo,pork,simmer,2026-10-16 06:00:00,4,{}\n",
            last_page
        );
        std::fs::write(&config.output_path, content).unwrap();
    }

    #[test]
    fn test_prepare_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);

        let ctx = prepare(&config, now("2026-10-17 06:00:00")).unwrap();

        assert_eq!(ctx.batch_number, 1);
        assert_eq!(ctx.plan, PagePlan::Scrape(PageRange::new(1, 2, 223).unwrap()));
    }

    #[test]
    fn test_prepare_continues_from_last_row() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        seed_output(&config, 5);
        std::fs::write(&config.batch_counter_path, "4").unwrap();

        let ctx = prepare(&config, now("2026-10-17 06:00:00")).unwrap();

        assert_eq!(ctx.batch_number, 5);
        assert_eq!(ctx.plan, PagePlan::Scrape(PageRange::new(6, 7, 223).unwrap()));
    }

    #[test]
    fn test_prepare_exhausted_still_consumes_batch() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        seed_output(&config, 223);
        std::fs::write(&config.batch_counter_path, "9").unwrap();

        let ctx = prepare(&config, now("2026-10-17 06:00:00")).unwrap();

        assert_eq!(ctx.plan, PagePlan::Exhausted { next_page: 224 });
        assert_eq!(ctx.batch_number, 10);
        assert_eq!(std::fs::read_to_string(&config.batch_counter_path).unwrap(), "10");
    }

    #[test]
    fn test_prepare_corrupt_output_aborts_before_counting() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        std::fs::write(
            &config.output_path,
            "title,ingredients,instructions,load_dte,batch_number,page_number\n\
             Adobo,pork,simmer,not-a-date,4,5\n",
        )
        .unwrap();

        let result = prepare(&config, now("2026-10-17 06:00:00"));

        assert!(matches!(result, Err(ScraperError::StateCorrupt(_))));
        assert!(!config.batch_counter_path.exists());
    }

    #[tokio::test]
    async fn test_execute_writes_one_batch() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        seed_output(&config, 5);
        std::fs::write(&config.batch_counter_path, "4").unwrap();
        let before = std::fs::read_to_string(&config.output_path).unwrap();

        let mut driver = FakeDriver::default()
            .with_page(
                listing_url(BASE, 6),
                FakePage::listing(&["https://example.test/sinigang/", "https://example.test/broken/"]),
            )
            .with_page(
                listing_url(BASE, 7),
                FakePage::listing(&["https://example.test/pancit/"]),
            )
            .with_page(
                "https://example.test/sinigang/",
                FakePage::recipe("Sinigang", "pork\ntamarind", "Boil."),
            )
            .with_page(
                "https://example.test/broken/",
                FakePage::recipe("Broken", "rice", "Cook.").without(crate::recipes::INGREDIENTS),
            )
            .with_page(
                "https://example.test/pancit/",
                FakePage::recipe("Pancit", "noodles", "Stir fry."),
            );

        let ctx = prepare(&config, now("2026-10-17 06:00:00")).unwrap();
        let report = execute(&mut driver, &config, &ctx).await.unwrap();

        assert_eq!(report.batch_number, 5);
        assert_eq!(report.links_collected, 3);
        assert_eq!(report.recipes_skipped, 1);
        assert_eq!(report.records_written, 2);
        assert_eq!(driver.quit_calls, 1);

        let after = std::fs::read_to_string(&config.output_path).unwrap();
        assert!(after.starts_with(&before));

        let mut reader = csv::Reader::from_path(&config.output_path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[1][0], "Sinigang");
        assert_eq!(&rows[2][0], "Pancit");
        for row in &rows[1..] {
            assert_eq!(&row[3], "2026-10-17 06:00:00");
            assert_eq!(&row[4], "5");
        }
        assert_eq!(&rows[1][5], "6");
        assert_eq!(&rows[2][5], "7");

        // 次回は最終行のページの次から
        let next = prepare(&config, now("2026-10-18 06:00:00")).unwrap();
        assert_eq!(next.plan, PagePlan::Scrape(PageRange::new(8, 9, 223).unwrap()));
        assert_eq!(next.batch_number, 6);
    }

    #[tokio::test]
    async fn test_execute_exhausted_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        seed_output(&config, 223);
        let before = std::fs::read_to_string(&config.output_path).unwrap();

        let mut driver = FakeDriver::default();
        let ctx = prepare(&config, now("2026-10-17 06:00:00")).unwrap();
        let report = execute(&mut driver, &config, &ctx).await.unwrap();

        assert_eq!(report.records_written, 0);
        assert!(driver.visited.is_empty());
        assert_eq!(std::fs::read_to_string(&config.output_path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_driver_loss_aborts_and_releases_browser() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);

        let mut driver = FakeDriver::default()
            .with_page(
                listing_url(BASE, 1),
                FakePage::listing(&["https://example.test/adobo/", "https://example.test/lechon/"]),
            )
            .with_page(
                "https://example.test/adobo/",
                FakePage::recipe("Adobo", "pork", "Simmer."),
            )
            .dies_at("https://example.test/lechon/");

        let ctx = prepare(&config, now("2026-10-17 06:00:00")).unwrap();
        let result = execute(&mut driver, &config, &ctx).await;

        assert!(matches!(result, Err(ScraperError::DriverLost(_))));
        assert_eq!(driver.quit_calls, 1);
        // 収集済みのレコードも書かれない
        assert!(!config.output_path.exists());
        assert_eq!(std::fs::read_to_string(&config.batch_counter_path).unwrap(), "1");
    }
}
