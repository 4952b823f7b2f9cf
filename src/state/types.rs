//! 実行状態の型定義

use std::fmt;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::error::ScraperError;
use crate::recipes::{LOAD_DTE_FORMAT, LOAD_DTE_HEADER, PAGE_NUMBER_HEADER};

/// 処理対象の一覧ページ範囲（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    start: u32,
    end: u32,
}

impl PageRange {
    /// `1 <= start <= end <= total_pages` を満たさなければ `None`
    pub fn new(start: u32, end: u32, total_pages: u32) -> Option<Self> {
        (1 <= start && start <= end && end <= total_pages).then_some(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// 今回の実行計画
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePlan {
    Scrape(PageRange),
    /// 全ページ処理済み。`next_page` は本来次に処理するはずだったページ
    Exhausted { next_page: u32 },
}

/// 前回実行の状態（出力CSVの最終行から復元）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    pub load_date: NaiveDateTime,
    pub last_page: u32,
}

impl RunState {
    /// 出力CSVの最終データ行を読む
    ///
    /// ファイルがない、空、またはヘッダーのみなら `None`。
    /// ヘッダーに `load_dte` / `page_number` 列が無ければ `StateCorrupt`。
    /// 最終行の `load_dte` / `page_number` が読めなければ `StateCorrupt`。
    pub fn from_output(path: &Path) -> Result<Option<Self>, ScraperError> {
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(None);
        }

        // データ行が無くても列構成は先に確認する
        let column = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                ScraperError::StateCorrupt(format!("{:?} に {} 列がありません", path, name))
            })
        };
        let load_dte_column = column(LOAD_DTE_HEADER)?;
        let page_number_column = column(PAGE_NUMBER_HEADER)?;

        let mut last = None;
        for record in reader.records() {
            last = Some(record?);
        }
        let Some(last) = last else {
            return Ok(None);
        };

        let load_dte = last.get(load_dte_column).unwrap_or_default();
        let page_number = last.get(page_number_column).unwrap_or_default();

        let load_date = NaiveDateTime::parse_from_str(load_dte.trim(), LOAD_DTE_FORMAT)
            .map_err(|e| {
                ScraperError::StateCorrupt(format!("load_dte を解析できません ({:?}): {}", load_dte, e))
            })?;
        let last_page = page_number.trim().parse().map_err(|_| {
            ScraperError::StateCorrupt(format!("page_number を解析できません: {:?}", page_number))
        })?;

        Ok(Some(Self {
            load_date,
            last_page,
        }))
    }
}
