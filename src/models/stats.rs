use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// 会话计数器（派生记账数据，不作为权威来源）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(default)]
    pub words_indexed: u64,
    #[serde(default)]
    pub answers_helped: u64,
    #[serde(default = "Local::now")]
    pub session_start: DateTime<Local>,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            words_indexed: 0,
            answers_helped: 0,
            session_start: Local::now(),
        }
    }
}

/// `WordStore::stats()` 的返回值
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    /// 原词数量
    pub keys: usize,
    /// 译文总数
    pub translations: usize,
    pub words_indexed: u64,
    pub answers_helped: u64,
    pub session_start: DateTime<Local>,
}
