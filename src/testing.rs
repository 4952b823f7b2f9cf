//! テスト用のインメモリ `BrowserDriver`

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::error::ScraperError;
use crate::recipes::{
    INGREDIENTS, INSTRUCTIONS, LISTING_CONTAINER, RECIPE_CONTAINER, RECIPE_LINK, TITLE,
};
use crate::traits::BrowserDriver;

/// 1ページ分のDOM（セレクタ単位）
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    elements: HashSet<String>,
    properties: HashMap<String, Vec<Option<String>>>,
    texts: HashMap<String, String>,
}

impl FakePage {
    pub fn listing(hrefs: &[&str]) -> Self {
        Self::default().element(LISTING_CONTAINER).properties(
            RECIPE_LINK,
            hrefs.iter().map(|href| Some(href.to_string())).collect(),
        )
    }

    pub fn recipe(title: &str, ingredients: &str, instructions: &str) -> Self {
        Self::default()
            .element(RECIPE_CONTAINER)
            .text(TITLE, title)
            .text(INGREDIENTS, ingredients)
            .text(INSTRUCTIONS, instructions)
    }

    pub fn element(mut self, selector: &str) -> Self {
        self.elements.insert(selector.to_string());
        self
    }

    pub fn properties(mut self, selector: &str, values: Vec<Option<String>>) -> Self {
        self.elements.insert(selector.to_string());
        self.properties.insert(selector.to_string(), values);
        self
    }

    pub fn text(mut self, selector: &str, text: &str) -> Self {
        self.elements.insert(selector.to_string());
        self.texts.insert(selector.to_string(), text.to_string());
        self
    }

    pub fn without(mut self, selector: &str) -> Self {
        self.elements.remove(selector);
        self.properties.remove(selector);
        self.texts.remove(selector);
        self
    }
}

/// 登録されていないURLは空ページとして開く
#[derive(Debug, Default)]
pub struct FakeDriver {
    pages: HashMap<String, FakePage>,
    failing: HashSet<String>,
    dead_at: Option<String>,
    current: Option<String>,
    pub visited: Vec<String>,
    pub quit_calls: usize,
}

impl FakeDriver {
    pub fn with_page(mut self, url: impl Into<String>, page: FakePage) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    /// このURLへの遷移はナビゲーションエラー
    pub fn fails_at(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    /// このURLへ遷移しようとするとブラウザが落ちる
    pub fn dies_at(mut self, url: impl Into<String>) -> Self {
        self.dead_at = Some(url.into());
        self
    }

    fn page(&self) -> Option<&FakePage> {
        self.current.as_ref().and_then(|url| self.pages.get(url))
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
        self.visited.push(url.to_string());
        if self.dead_at.as_deref() == Some(url) {
            return Err(ScraperError::DriverLost("browser crashed".into()));
        }
        if self.failing.contains(url) {
            self.current = None;
            return Err(ScraperError::Navigation(format!("{}: net::ERR_FAILED", url)));
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn exists(&self, selector: &str) -> Result<bool, ScraperError> {
        Ok(self
            .page()
            .is_some_and(|page| page.elements.contains(selector)))
    }

    async fn property_all(
        &self,
        selector: &str,
        _name: &str,
    ) -> Result<Vec<Option<String>>, ScraperError> {
        Ok(self
            .page()
            .and_then(|page| page.properties.get(selector).cloned())
            .unwrap_or_default())
    }

    async fn text(&self, selector: &str) -> Result<Option<String>, ScraperError> {
        Ok(self.page().and_then(|page| page.texts.get(selector).cloned()))
    }

    async fn quit(&mut self) -> Result<(), ScraperError> {
        self.quit_calls += 1;
        self.current = None;
        Ok(())
    }
}
