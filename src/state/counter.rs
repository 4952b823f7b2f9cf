use std::path::PathBuf;

use tracing::info;

use crate::error::ScraperError;

/// ファイルに永続化するバッチ番号カウンタ
///
/// ロックは取らない。同時実行はスケジューラ側で防ぐ前提。
#[derive(Debug, Clone)]
pub struct BatchCounter {
    path: PathBuf,
}

impl BatchCounter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 前回値を読み、+1 して即座に保存した値を返す
    ///
    /// ファイルがなければ前回値は 0。
    pub fn next(&self) -> Result<u64, ScraperError> {
        let previous = match std::fs::read_to_string(&self.path) {
            Ok(content) => content.trim().parse::<u64>().map_err(|_| {
                ScraperError::StateCorrupt(format!(
                    "バッチ番号を解析できません ({:?}): {:?}",
                    self.path, content
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };

        let next = previous.checked_add(1).ok_or_else(|| {
            ScraperError::StateCorrupt(format!("バッチ番号が上限です: {}", previous))
        })?;

        std::fs::write(&self.path, next.to_string())?;
        info!("Batch number: {} (saved to {:?})", next, self.path);

        Ok(next)
    }
}
