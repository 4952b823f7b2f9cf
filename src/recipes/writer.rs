use std::fs::OpenOptions;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use tracing::info;

use crate::error::ScraperError;

use super::types::{RecipeFields, RecipeLink, RecipeRecord, CSV_HEADERS};

/// 1回の実行分のレコードを溜めて、最後にまとめてCSVへ追記する
///
/// 全レコードが同じ `load_date` と `batch_number` を持つ。
#[derive(Debug)]
pub struct BatchWriter {
    path: PathBuf,
    load_date: NaiveDateTime,
    batch_number: u64,
    records: Vec<RecipeRecord>,
}

impl BatchWriter {
    pub fn new(path: impl Into<PathBuf>, load_date: NaiveDateTime, batch_number: u64) -> Self {
        Self {
            path: path.into(),
            load_date,
            batch_number,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, fields: RecipeFields, link: &RecipeLink) {
        self.records.push(RecipeRecord::new(
            fields,
            link,
            self.load_date,
            self.batch_number,
        ));
    }

    /// 溜めたレコードを追記し、書いた行数を返す
    ///
    /// レコードが無ければファイルに触れない。
    /// ファイルが無いか空ならヘッダー行から書く。
    pub fn finish(self) -> Result<usize, ScraperError> {
        if self.records.is_empty() {
            info!("No recipes collected, {:?} left untouched", self.path);
            return Ok(0);
        }

        let needs_header = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record(CSV_HEADERS)?;
        }
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!(
            "Wrote {} recipes to {:?} (batch {})",
            self.records.len(),
            self.path,
            self.batch_number
        );
        Ok(self.records.len())
    }
}
