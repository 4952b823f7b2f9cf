use chrono::NaiveDate;
use tracing::{debug, info};

use super::types::{PagePlan, PageRange, RunState};

/// 今回処理する一覧ページ範囲を決める
///
/// 前回の最終ページの次から `pages_per_day` ページ分（`total_pages` で打ち切り）。
/// 開始ページが `total_pages` を超えていれば `Exhausted`。
pub fn plan(
    today: NaiveDate,
    last_run: Option<&RunState>,
    total_pages: u32,
    pages_per_day: u32,
) -> PagePlan {
    let start = match last_run {
        Some(state) => {
            debug!(
                "Last run: {} (page {}), {} day(s) ago",
                state.load_date,
                state.last_page,
                (today - state.load_date.date()).num_days()
            );
            state.last_page.saturating_add(1)
        }
        None => {
            info!("No previous output, starting from page 1");
            1
        }
    };

    let end = start
        .saturating_add(pages_per_day.saturating_sub(1))
        .min(total_pages);

    match PageRange::new(start, end, total_pages) {
        Some(range) => PagePlan::Scrape(range),
        None => PagePlan::Exhausted { next_page: start },
    }
}
