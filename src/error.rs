use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("ブラウザとの接続が失われました: {0}")]
    DriverLost(String),

    #[error("状態ファイルが壊れています: {0}")]
    StateCorrupt(String),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),
}

impl ScraperError {
    /// ブラウザが使えなくなった等、その場で回復できないエラーか
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::BrowserInit(_) | Self::DriverLost(_))
    }
}
