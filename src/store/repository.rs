//! 词库持久化接口
//!
//! `load` 在启动时等待一次；`save` 返回的 future 由调用方 spawn 出去，不等待结果

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{self, BoxFuture};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppResult;
use crate::models::{Settings, Stats};

/// 持久化的完整状态（首次运行时各字段均可能缺失）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
}

/// 词库持久化 I/F
pub trait WordRepository: Send + Sync {
    fn load(&self) -> BoxFuture<'_, AppResult<PersistedState>>;
    fn save(&self, state: PersistedState) -> BoxFuture<'static, AppResult<()>>;
}

/// JSON 文件持久化
///
/// 写入先落到临时文件再 rename；并发的旧写入不会覆盖较新的状态
pub struct JsonFileRepository {
    path: PathBuf,
    generation: AtomicU64,
    last_written: Arc<tokio::sync::Mutex<u64>>,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            generation: AtomicU64::new(0),
            last_written: Arc::new(tokio::sync::Mutex::new(0)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WordRepository for JsonFileRepository {
    fn load(&self) -> BoxFuture<'_, AppResult<PersistedState>> {
        Box::pin(async move {
            let content = match tokio::fs::read_to_string(&self.path).await {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("词库文件不存在，首次运行: {}", self.path.display());
                    return Ok(PersistedState::default());
                }
                Err(e) => return Err(e.into()),
            };
            Ok(serde_json::from_str(&content)?)
        })
    }

    fn save(&self, state: PersistedState) -> BoxFuture<'static, AppResult<()>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let path = self.path.clone();
        let last_written = Arc::clone(&self.last_written);

        Box::pin(async move {
            let mut last = last_written.lock().await;
            if generation < *last {
                debug!("跳过过期的保存 (第 {} 次 < 第 {} 次)", generation, *last);
                return Ok(());
            }

            let content = serde_json::to_string_pretty(&state)?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            let tmp_path = path.with_extension("json.tmp");
            tokio::fs::write(&tmp_path, content).await?;
            tokio::fs::rename(&tmp_path, &path).await?;

            *last = generation;
            debug!("💾 词库已保存: {}", path.display());
            Ok(())
        })
    }
}

/// 内存持久化（测试与一次性命令使用），`save` 调用时立即记录
#[derive(Default, Clone)]
pub struct MemoryRepository {
    state: Arc<Mutex<PersistedState>>,
    saves: Arc<AtomicU64>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            saves: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 最近一次保存的状态
    pub fn snapshot(&self) -> PersistedState {
        self.state
            .lock()
            .map(|state| state.clone())
            .unwrap_or_default()
    }

    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::SeqCst)
    }
}

impl WordRepository for MemoryRepository {
    fn load(&self) -> BoxFuture<'_, AppResult<PersistedState>> {
        Box::pin(future::ready(Ok(self.snapshot())))
    }

    fn save(&self, state: PersistedState) -> BoxFuture<'static, AppResult<()>> {
        if let Ok(mut current) = self.state.lock() {
            *current = state;
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Box::pin(future::ready(Ok(())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_repository_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("words.json"));

        assert_eq!(repo.load().await.unwrap(), PersistedState::default());

        let mut words = BTreeMap::new();
        words.insert("katze".to_string(), vec!["cat".to_string()]);
        let state = PersistedState {
            words: Some(words),
            settings: Some(Settings::default()),
            stats: None,
        };
        repo.save(state.clone()).await.unwrap();

        assert_eq!(repo.load().await.unwrap(), state);
    }

    #[tokio::test]
    async fn test_file_repository_skips_stale_write() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("words.json"));

        let older = repo.save(PersistedState {
            settings: Some(Settings::default()),
            ..Default::default()
        });
        let newer_state = PersistedState {
            settings: Some(Settings {
                auto_answer: true,
                ..Settings::default()
            }),
            ..Default::default()
        };
        let newer = repo.save(newer_state.clone());

        newer.await.unwrap();
        older.await.unwrap();
        assert_eq!(repo.load().await.unwrap(), newer_state);
    }

    #[tokio::test]
    async fn test_file_repository_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(JsonFileRepository::new(path).load().await.is_err());
    }
}
