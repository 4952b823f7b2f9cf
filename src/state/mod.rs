//! 実行状態（前回の処理ページ・バッチ番号）と今回の処理範囲の計算

mod counter;
mod planner;
mod types;

pub use counter::BatchCounter;
pub use planner::plan;
pub use types::{PagePlan, PageRange, RunState};
