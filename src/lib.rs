//! レシピスクレイパーライブラリ
//!
//! - 一覧ページを日ごとに数ページずつ巡回してレシピ詳細URLを収集
//! - 詳細ページからタイトル・材料・手順を抽出
//! - 実行ごとのバッチ番号と取込日時を付けてCSVに追記
//!
//! 前回どこまで処理したかは出力CSVの最終行の `page_number` から復元する。
//!
//! # 使用例
//!
//! ```rust,ignore
//! use recipe_scraper::{ScrapeRequest, ScraperConfig, ScraperService};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = ScraperService::new(ScraperConfig::default());
//!
//!     let request = ScrapeRequest::new("./recipes.csv")
//!         .with_batch_counter_path("./batch_number.txt")
//!         .with_headless(false);
//!
//!     let report = service.call(request).await.unwrap();
//!     println!("written: {}", report.records_written);
//! }
//! ```

pub mod chrome;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod recipes;
pub mod service;
pub mod state;
pub mod traits;

#[cfg(test)]
mod testing;

// 主要な型をリエクスポート
pub use chrome::ChromeDriver;
pub use config::ScraperConfig;
pub use error::ScraperError;
pub use pipeline::{RunContext, ScrapeReport};
pub use service::{ScrapeRequest, ScraperService};
pub use traits::BrowserDriver;

pub use recipes::{Extraction, RecipeFields, RecipeLink, RecipeRecord};
pub use state::{PagePlan, PageRange, RunState};
