use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::state::PageRange;
use crate::traits::BrowserDriver;

use super::types::RecipeLink;

pub(crate) const LISTING_CONTAINER: &str = "div.content-sidebar-wrap";
pub(crate) const RECIPE_LINK: &str = "div.content-sidebar-wrap a.entry-title-link";

/// 一覧ページのURL（1ページ目は `/recipes/`、以降は `/recipes/page/N/`）
pub fn listing_url(base_url: &str, page: u32) -> String {
    let base = base_url.trim_end_matches('/');
    if page <= 1 {
        format!("{}/recipes/", base)
    } else {
        format!("{}/recipes/page/{}/", base, page)
    }
}

/// 範囲内の一覧ページを順に開き、レシピ詳細URLを集める
///
/// コンテナが現れないページは飛ばす。ページごとに `page_delay` 待機する。
/// 返り値はページ順・DOM順で、重複は除かない。
pub async fn collect_links<D: BrowserDriver>(
    driver: &mut D,
    config: &ScraperConfig,
    range: PageRange,
) -> Result<Vec<RecipeLink>, ScraperError> {
    info!("Collecting recipe links from pages {}", range);
    let mut links = Vec::new();

    for page in range.pages() {
        match collect_page(driver, config, page).await {
            Ok(found) => {
                info!("Page {}: {} links", page, found.len());
                links.extend(found);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => warn!("Error while collecting links on page {}: {}", page, e),
        }

        sleep(config.page_delay).await;
    }

    info!("All links collected: {} links", links.len());
    Ok(links)
}

async fn collect_page<D: BrowserDriver>(
    driver: &mut D,
    config: &ScraperConfig,
    page: u32,
) -> Result<Vec<RecipeLink>, ScraperError> {
    let url = listing_url(&config.base_url, page);
    debug!("Opening listing page {}: {}", page, url);
    driver.navigate(&url).await?;

    if !driver
        .wait_for(LISTING_CONTAINER, config.listing_timeout)
        .await?
    {
        warn!(
            "Timed out after {:?} waiting for listing container on page {} ({})",
            config.listing_timeout, page, url
        );
        return Ok(Vec::new());
    }

    let hrefs = driver.property_all(RECIPE_LINK, "href").await?;
    let mut links = Vec::with_capacity(hrefs.len());
    for (index, href) in hrefs.into_iter().enumerate() {
        match href {
            Some(href) if !href.is_empty() => links.push(RecipeLink {
                url: href,
                source_page: page,
            }),
            _ => warn!("Stale link #{} on page {}, skipping", index + 1, page),
        }
    }

    Ok(links)
}
