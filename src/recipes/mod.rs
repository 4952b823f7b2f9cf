//! レシピ一覧の巡回・詳細ページの抽出・CSV追記

mod collector;
mod extractor;
mod types;
mod writer;

pub use collector::{collect_links, listing_url};
pub use extractor::extract_recipe;
pub use types::{
    Extraction, RecipeFields, RecipeLink, RecipeRecord, CSV_HEADERS, LOAD_DTE_FORMAT,
    LOAD_DTE_HEADER, PAGE_NUMBER_HEADER,
};
pub use writer::BatchWriter;

#[cfg(test)]
pub(crate) use collector::{LISTING_CONTAINER, RECIPE_LINK};
#[cfg(test)]
pub(crate) use extractor::{INGREDIENTS, INSTRUCTIONS, RECIPE_CONTAINER, TITLE};
