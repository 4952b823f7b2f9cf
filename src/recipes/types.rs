//! レシピ関連の型定義

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// `load_dte` 列の書式
pub const LOAD_DTE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const LOAD_DTE_HEADER: &str = "load_dte";
pub const PAGE_NUMBER_HEADER: &str = "page_number";

/// 出力CSVのヘッダー行
pub const CSV_HEADERS: [&str; 6] = [
    "title",
    "ingredients",
    "instructions",
    LOAD_DTE_HEADER,
    "batch_number",
    PAGE_NUMBER_HEADER,
];

/// 一覧ページから拾ったレシピ詳細URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeLink {
    pub url: String,
    /// リンクがあった一覧ページ番号
    pub source_page: u32,
}

/// 詳細ページから抜き出したテキスト（いずれも空でない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFields {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
}

/// 詳細ページの抽出結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Found(RecipeFields),
    NotFound { reason: String },
}

/// CSVの1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeRecord {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    #[serde(rename = "load_dte", serialize_with = "serialize_load_dte")]
    pub load_date: NaiveDateTime,
    pub batch_number: u64,
    pub page_number: u32,
}

impl RecipeRecord {
    pub fn new(
        fields: RecipeFields,
        link: &RecipeLink,
        load_date: NaiveDateTime,
        batch_number: u64,
    ) -> Self {
        Self {
            title: fields.title,
            ingredients: fields.ingredients,
            instructions: fields.instructions,
            load_date,
            batch_number,
            page_number: link.source_page,
        }
    }
}

fn serialize_load_dte<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&value.format(LOAD_DTE_FORMAT))
}
