use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ScraperError;

const DEFAULT_BASE_URL: &str = "https://panlasangpinoy.com";

/// サイト全体の一覧ページ数
pub const DEFAULT_TOTAL_PAGES: u32 = 223;
/// 1回の実行で処理する一覧ページ数
pub const DEFAULT_PAGES_PER_DAY: u32 = 2;

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    pub total_pages: u32,
    pub pages_per_day: u32,
    pub output_path: PathBuf,
    pub batch_counter_path: PathBuf,
    /// ヘッドレスだとCORSエラーになることがあるため既定は表示モード
    pub headless: bool,
    pub debug: bool,
    pub chrome_path: Option<String>,
    pub listing_timeout: Duration,
    pub recipe_timeout: Duration,
    /// 一覧ページごとの待機時間（サイトへの負荷軽減）
    pub page_delay: Duration,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            total_pages: DEFAULT_TOTAL_PAGES,
            pages_per_day: DEFAULT_PAGES_PER_DAY,
            output_path: PathBuf::from("recipes.csv"),
            batch_counter_path: PathBuf::from("batch_number.txt"),
            headless: false,
            debug: false,
            chrome_path: None,
            listing_timeout: Duration::from_secs(10),
            recipe_timeout: Duration::from_secs(20),
            page_delay: Duration::from_secs(5),
        }
    }
}

impl ScraperConfig {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            ..Default::default()
        }
    }

    /// 環境変数から設定を読み込む（未設定の項目は既定値）
    pub fn from_env() -> Result<Self, ScraperError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `lookup` で引いた値を既定値に上書きする
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScraperError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("RECIPE_BASE_URL") {
            config.base_url = url;
        }
        if let Some(pages) = parse_value(&lookup, "RECIPE_TOTAL_PAGES")? {
            config.total_pages = pages;
        }
        if let Some(pages) = parse_value(&lookup, "RECIPE_PAGES_PER_DAY")? {
            config.pages_per_day = pages;
        }
        if let Some(path) = lookup("RECIPE_OUTPUT") {
            config.output_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("RECIPE_BATCH_FILE") {
            config.batch_counter_path = PathBuf::from(path);
        }
        if let Some(headless) = parse_value(&lookup, "RECIPE_HEADLESS")? {
            config.headless = headless;
        }
        if let Some(debug) = parse_value(&lookup, "RECIPE_DEBUG")? {
            config.debug = debug;
        }
        config.chrome_path = lookup("CHROME_PATH").or_else(|| lookup("CHROMIUM_PATH"));

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScraperError> {
        if self.total_pages == 0 {
            return Err(ScraperError::Config("total_pages は1以上が必要です".into()));
        }
        if self.pages_per_day == 0 {
            return Err(ScraperError::Config("pages_per_day は1以上が必要です".into()));
        }
        Ok(())
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_pages(mut self, total_pages: u32, pages_per_day: u32) -> Self {
        self.total_pages = total_pages;
        self.pages_per_day = pages_per_day;
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_batch_counter_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.batch_counter_path = path.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_timeouts(mut self, listing: Duration, recipe: Duration) -> Self {
        self.listing_timeout = listing;
        self.recipe_timeout = recipe;
        self
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }
}

fn parse_value<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ScraperError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ScraperError::Config(format!("{} の値が不正です: {}", key, value))),
        None => Ok(None),
    }
}
