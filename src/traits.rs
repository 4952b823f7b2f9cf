use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::ScraperError;

/// 要素待機のポーリング間隔
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// ブラウザ操作の抽象
///
/// セレクタはCSSセレクタ。要素そのものは外に出さず、必要な値だけを返す。
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// URLへ遷移
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError>;

    /// セレクタに一致する要素が現在のページにあるか
    async fn exists(&self, selector: &str) -> Result<bool, ScraperError>;

    /// 一致する全要素のプロパティ値を DOM 順で取得
    ///
    /// 読み取り中に要素が消えた（stale）ものは `None`。
    async fn property_all(
        &self,
        selector: &str,
        name: &str,
    ) -> Result<Vec<Option<String>>, ScraperError>;

    /// 最初に一致した要素の表示テキスト。要素がなければ `None`
    async fn text(&self, selector: &str) -> Result<Option<String>, ScraperError>;

    /// リソース解放
    async fn quit(&mut self) -> Result<(), ScraperError>;

    /// 要素が現れるまで最大 `timeout` 待機。タイムアウトなら `false`
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, ScraperError> {
        let start = Instant::now();
        let poll_interval = WAIT_POLL_INTERVAL.min(timeout);

        loop {
            if self.exists(selector).await? {
                debug!("{} found after {:?}", selector, start.elapsed());
                return Ok(true);
            }
            if start.elapsed() >= timeout {
                return Ok(false);
            }
            sleep(poll_interval).await;
        }
    }
}
