use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::BrowserDriver;

/// chromiumoxide の既定引数から `--enable-automation` を除いたもの
const BASE_ARGS: &[&str] = &[
    "--disable-background-networking",
    "--enable-features=NetworkService,NetworkServiceInProcess",
    "--disable-background-timer-throttling",
    "--disable-backgrounding-occluded-windows",
    "--disable-breakpad",
    "--disable-client-side-phishing-detection",
    "--disable-component-extensions-with-background-pages",
    "--disable-default-apps",
    "--disable-dev-shm-usage",
    "--disable-features=TranslateUI",
    "--disable-hang-monitor",
    "--disable-ipc-flooding-protection",
    "--disable-popup-blocking",
    "--disable-prompt-on-repost",
    "--disable-renderer-backgrounding",
    "--disable-sync",
    "--force-color-profile=srgb",
    "--metrics-recording-only",
    "--no-first-run",
    "--password-store=basic",
    "--use-mock-keychain",
];

/// ボット対策を回避するための起動オプション
const STEALTH_ARGS: &[&str] = &[
    "--start-maximized",
    "--ignore-certificate-errors",
    "--disable-extensions",
    "--disable-gpu",
    "--disable-blink-features=AutomationControlled",
];

pub struct ChromeDriver {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    /// 起動ごとのユーザーデータディレクトリ。`quit` またはドロップで削除
    profile: Option<TempDir>,
}

impl ChromeDriver {
    /// ブラウザを起動して空ページを1枚開く
    pub async fn launch(config: &ScraperConfig) -> Result<Self, ScraperError> {
        info!("Launching browser (headless={})...", config.headless);

        // プロファイルのロック競合を避けるため起動ごとに別ディレクトリ
        let profile = tempfile::Builder::new()
            .prefix("recipe-scraper-")
            .tempdir()?;

        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile.path())
            .disable_default_args()
            .viewport(None::<Viewport>)
            .no_sandbox()
            .request_timeout(Duration::from_secs(60));

        if let Some(path) = &config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        if !config.headless {
            builder = builder.with_head();
        }

        for arg in BASE_ARGS.iter().chain(STEALTH_ARGS) {
            builder = builder.arg(*arg);
        }

        if config.debug {
            builder = builder.arg("--enable-logging=stderr").arg("--v=1");
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(format!("ブラウザ設定エラー: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        // ブラウザイベントハンドラをバックグラウンドで実行
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        info!("Browser launched");
        Ok(Self {
            browser: Some(browser),
            page: Some(page),
            handler: Some(handler),
            profile: Some(profile),
        })
    }

    fn get_page(&self) -> Result<&Page, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::DriverLost("ブラウザは既に終了しています".into()))
    }
}

/// CDP接続そのものが切れたエラーか
fn is_connection_lost(err: &CdpError) -> bool {
    matches!(
        err,
        CdpError::Ws(_) | CdpError::ChannelSendError(_) | CdpError::NoResponse
    )
}

fn lost(err: CdpError) -> ScraperError {
    ScraperError::DriverLost(err.to_string())
}

#[async_trait]
impl BrowserDriver for ChromeDriver {
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
        let page = self.get_page()?;
        match page.goto(url).await {
            Ok(_) => Ok(()),
            Err(e) if is_connection_lost(&e) => Err(lost(e)),
            Err(e) => Err(ScraperError::Navigation(format!("{}: {}", url, e))),
        }
    }

    async fn exists(&self, selector: &str) -> Result<bool, ScraperError> {
        let page = self.get_page()?;
        match page.find_element(selector).await {
            Ok(_) => Ok(true),
            Err(e) if is_connection_lost(&e) => Err(lost(e)),
            Err(_) => Ok(false),
        }
    }

    async fn property_all(
        &self,
        selector: &str,
        name: &str,
    ) -> Result<Vec<Option<String>>, ScraperError> {
        let page = self.get_page()?;
        let elements = match page.find_elements(selector).await {
            Ok(elements) => elements,
            Err(e) if is_connection_lost(&e) => return Err(lost(e)),
            Err(_) => return Ok(Vec::new()),
        };

        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            let value = match element.property(name).await {
                Ok(value) => value.and_then(|v| v.as_str().map(str::to_string)),
                Err(e) if is_connection_lost(&e) => return Err(lost(e)),
                Err(e) => {
                    debug!("Failed to read {} of {}: {}", name, selector, e);
                    None
                }
            };
            values.push(value);
        }
        Ok(values)
    }

    async fn text(&self, selector: &str) -> Result<Option<String>, ScraperError> {
        let page = self.get_page()?;
        let element = match page.find_element(selector).await {
            Ok(element) => element,
            Err(e) if is_connection_lost(&e) => return Err(lost(e)),
            Err(_) => return Ok(None),
        };

        match element.inner_text().await {
            Ok(text) => Ok(text),
            Err(e) if is_connection_lost(&e) => Err(lost(e)),
            Err(e) => {
                debug!("Failed to read text of {}: {}", selector, e);
                Ok(None)
            }
        }
    }

    async fn quit(&mut self) -> Result<(), ScraperError> {
        info!("Closing browser...");
        self.page = None;

        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("Failed to close browser: {}", e);
            }
            if let Err(e) = browser.wait().await {
                debug!("Failed to wait for browser exit: {}", e);
            }
        }

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        if let Some(profile) = self.profile.take() {
            let path = profile.path().to_path_buf();
            if let Err(e) = profile.close() {
                warn!("Failed to remove browser profile {:?}: {}", path, e);
            }
        }

        info!("Browser closed");
        Ok(())
    }
}
