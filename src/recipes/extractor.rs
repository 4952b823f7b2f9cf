use std::time::Duration;

use tracing::debug;

use crate::error::ScraperError;
use crate::traits::BrowserDriver;

use super::types::{Extraction, RecipeFields};

pub(crate) const RECIPE_CONTAINER: &str = ".oc-recipe-container";
pub(crate) const TITLE: &str = ".oc-recipe-container .wprm-recipe-name";
pub(crate) const INGREDIENTS: &str = ".oc-recipe-container .wprm-recipe-ingredients";
pub(crate) const INSTRUCTIONS: &str = ".oc-recipe-container .wprm-recipe-instructions";

/// レシピ詳細ページからタイトル・材料・手順を抜き出す
///
/// ページが開けない、コンテナが現れない、どれかの項目が無いか空の場合は
/// `Extraction::NotFound`。ブラウザ自体が死んだ場合のみ `Err`。
pub async fn extract_recipe<D: BrowserDriver>(
    driver: &mut D,
    url: &str,
    timeout: Duration,
) -> Result<Extraction, ScraperError> {
    match try_extract(driver, url, timeout).await {
        Ok(extraction) => Ok(extraction),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => Ok(Extraction::NotFound {
            reason: e.to_string(),
        }),
    }
}

async fn try_extract<D: BrowserDriver>(
    driver: &mut D,
    url: &str,
    timeout: Duration,
) -> Result<Extraction, ScraperError> {
    driver.navigate(url).await?;

    if !driver.wait_for(RECIPE_CONTAINER, timeout).await? {
        return Ok(not_found(format!(
            "recipe container did not appear within {:?}",
            timeout
        )));
    }

    let Some(title) = field(driver, TITLE).await? else {
        return Ok(not_found("missing title"));
    };
    let Some(ingredients) = field(driver, INGREDIENTS).await? else {
        return Ok(not_found("missing ingredients"));
    };
    let Some(instructions) = field(driver, INSTRUCTIONS).await? else {
        return Ok(not_found("missing instructions"));
    };

    debug!("Extracted recipe {:?} from {}", title, url);
    Ok(Extraction::Found(RecipeFields {
        title,
        ingredients,
        instructions,
    }))
}

/// 空白のみのテキストは無いものとして扱う
async fn field<D: BrowserDriver>(driver: &D, selector: &str) -> Result<Option<String>, ScraperError> {
    Ok(driver
        .text(selector)
        .await?
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty()))
}

fn not_found(reason: impl Into<String>) -> Extraction {
    Extraction::NotFound {
        reason: reason.into(),
    }
}
