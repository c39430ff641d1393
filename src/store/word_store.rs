//! 词库
//!
//! 归一化的双向映射：原词 → 有序去重的译文列表，反向索引始终由正向映射推导。
//! 所有修改都会触发一次不等待结果的保存

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::models::{Settings, Stats, StoreStats};
use crate::services::ui_text::matches_ui_phrase;
use crate::store::repository::{PersistedState, WordRepository};
use crate::utils::normalize;
use crate::utils::text::{has_long_numeral, is_pure_digits, letter_count};

/// 部分匹配的最短查询长度（字符数）
const MIN_PARTIAL_QUERY_LEN: usize = 2;

/// 单侧词条是否可以入库
fn is_valid_entry(word: &str) -> bool {
    !word.is_empty()
        && !is_pure_digits(word)
        && !has_long_numeral(word)
        && letter_count(word) >= 2
        && !matches_ui_phrase(word)
}

/// 归一化并校验一对词，不合格返回 None
pub fn validate_pair(source: &str, target: &str) -> Option<(String, String)> {
    let source = normalize(source);
    let target = normalize(target);
    if source == target || !is_valid_entry(&source) || !is_valid_entry(&target) {
        return None;
    }
    Some((source, target))
}

fn push_unique(list: &mut Vec<String>, value: &str) -> bool {
    if list.iter().any(|existing| existing == value) {
        false
    } else {
        list.push(value.to_string());
        true
    }
}

/// 按字典序插入，保持与正向映射（BTreeMap）反推的顺序一致
fn insert_sorted(list: &mut Vec<String>, value: &str) -> bool {
    match list.binary_search_by(|existing| existing.as_str().cmp(value)) {
        Ok(_) => false,
        Err(index) => {
            list.insert(index, value.to_string());
            true
        }
    }
}

/// 词库
pub struct WordStore {
    words: BTreeMap<String, Vec<String>>,
    reverse: BTreeMap<String, Vec<String>>,
    settings: Settings,
    stats: Stats,
    repository: Option<Arc<dyn WordRepository>>,
}

impl WordStore {
    /// 创建空词库（不持久化）
    pub fn new() -> Self {
        Self {
            words: BTreeMap::new(),
            reverse: BTreeMap::new(),
            settings: Settings::default(),
            stats: Stats::default(),
            repository: None,
        }
    }

    /// 创建空词库，修改时写入 `repository`
    pub fn with_repository(repository: Arc<dyn WordRepository>) -> Self {
        Self {
            repository: Some(repository),
            ..Self::new()
        }
    }

    /// 从持久化层加载；数据无法解析时视为不存在，从空词库开始
    pub async fn load(repository: Arc<dyn WordRepository>) -> Self {
        let mut store = Self::with_repository(Arc::clone(&repository));

        let state = match repository.load().await {
            Ok(state) => state,
            Err(e) => {
                warn!("⚠️ 词库数据无法读取，将从空词库开始: {}", e);
                PersistedState::default()
            }
        };

        if let Some(words) = state.words {
            for (source, targets) in &words {
                for target in targets {
                    store.insert(source, target);
                }
            }
        }
        if let Some(settings) = state.settings {
            store.settings = settings;
        }
        // 计数沿用持久化值，会话开始时间属于本进程
        store.stats = Stats {
            session_start: chrono::Local::now(),
            ..state.stats.unwrap_or_default()
        };

        info!(
            "📚 词库已加载: {} 个词条, {} 个译文",
            store.words.len(),
            store.translation_count()
        );
        store
    }

    /// 只修改内存映射，不计数、不保存
    fn insert(&mut self, source: &str, target: &str) -> bool {
        let Some((source, target)) = validate_pair(source, target) else {
            debug!("拒绝词对: '{}' → '{}'", source, target);
            return false;
        };

        let targets = self.words.entry(source.clone()).or_default();
        if !push_unique(targets, &target) {
            return false;
        }
        insert_sorted(self.reverse.entry(target).or_default(), &source);
        true
    }

    /// 添加一对词；新增返回 true，重复或被过滤返回 false
    pub fn add(&mut self, source: &str, target: &str) -> bool {
        if !self.insert(source, target) {
            return false;
        }
        self.stats.words_indexed += 1;
        self.schedule_save();
        true
    }

    /// 逐对添加（保持顺序、不短路），返回新增数量
    pub fn add_many<I, S, T>(&mut self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut added = 0;
        for (source, target) in pairs {
            if self.insert(source.as_ref(), target.as_ref()) {
                added += 1;
            }
        }
        if added > 0 {
            self.stats.words_indexed += added as u64;
            self.schedule_save();
        }
        added
    }

    /// 查询：正向 → 反向 → 双向子串部分匹配
    pub fn lookup(&self, word: &str) -> Option<Vec<String>> {
        let query = normalize(word);
        if query.is_empty() {
            return None;
        }

        if let Some(targets) = self.words.get(&query) {
            return Some(targets.clone());
        }
        if let Some(sources) = self.reverse.get(&query) {
            return Some(sources.clone());
        }
        if query.chars().count() < MIN_PARTIAL_QUERY_LEN {
            return None;
        }

        let mut matched = Vec::new();
        for map in [&self.words, &self.reverse] {
            for (key, values) in map.iter() {
                if key.contains(&query) || query.contains(key.as_str()) {
                    for value in values {
                        push_unique(&mut matched, value);
                    }
                }
            }
        }

        if matched.is_empty() {
            None
        } else {
            Some(matched)
        }
    }

    /// 清空词库并重置计数
    pub fn clear(&mut self) {
        self.words.clear();
        self.reverse.clear();
        self.stats.words_indexed = 0;
        self.stats.answers_helped = 0;
        info!("🗑️ 词库已清空");
        self.schedule_save();
    }

    /// 导出为 `{ 原词: [译文, ...] }` JSON 文本
    pub fn export_all(&self) -> String {
        serde_json::to_string_pretty(&self.words).unwrap_or_else(|_| "{}".to_string())
    }

    /// 导入 `export_all` 格式的文本，返回新增数量
    ///
    /// 单个条目格式错误时跳过；整体无法解析时返回 0
    pub fn import_all(&mut self, serialized: &str) -> usize {
        let document: serde_json::Value = match serde_json::from_str(serialized) {
            Ok(value) => value,
            Err(e) => {
                warn!("⚠️ 导入数据无法解析: {}", e);
                return 0;
            }
        };
        let Some(entries) = document.as_object() else {
            warn!("⚠️ 导入数据不是对象");
            return 0;
        };

        let mut pairs = Vec::new();
        for (source, value) in entries {
            match value {
                serde_json::Value::Array(targets) => {
                    for target in targets {
                        match target.as_str() {
                            Some(target) => pairs.push((source.clone(), target.to_string())),
                            None => debug!("跳过非字符串译文: {} → {}", source, target),
                        }
                    }
                }
                serde_json::Value::String(target) => pairs.push((source.clone(), target.clone())),
                other => debug!("跳过格式错误的条目: {} → {}", source, other),
            }
        }

        let added = self.add_many(pairs);
        info!("📥 导入完成: 新增 {} 个词对", added);
        added
    }

    /// 统计信息
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            keys: self.words.len(),
            translations: self.translation_count(),
            words_indexed: self.stats.words_indexed,
            answers_helped: self.stats.answers_helped,
            session_start: self.stats.session_start,
        }
    }

    /// 记录一次提示 / 帮助
    pub fn record_help(&mut self) {
        self.stats.answers_helped += 1;
        self.schedule_save();
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.schedule_save();
    }

    /// 反向索引（只读）
    pub fn reverse_index(&self) -> &BTreeMap<String, Vec<String>> {
        &self.reverse
    }

    /// 正向映射（只读）
    pub fn entries(&self) -> &BTreeMap<String, Vec<String>> {
        &self.words
    }

    fn translation_count(&self) -> usize {
        self.words.values().map(Vec::len).sum()
    }

    fn persisted_state(&self) -> PersistedState {
        PersistedState {
            words: Some(self.words.clone()),
            settings: Some(self.settings),
            stats: Some(self.stats),
        }
    }

    /// 立即保存并等待完成（进程退出前调用）
    pub async fn flush(&self) -> AppResult<()> {
        match &self.repository {
            Some(repository) => repository.save(self.persisted_state()).await,
            None => Ok(()),
        }
    }

    /// 触发一次保存，不等待结果
    fn schedule_save(&self) {
        let Some(repository) = &self.repository else {
            return;
        };
        let save = repository.save(self.persisted_state());

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = save.await {
                        warn!("⚠️ 词库保存失败: {}", e);
                    }
                });
            }
            Err(_) => debug!("没有运行中的 tokio 运行时，本次保存未执行"),
        }
    }
}

impl Default for WordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::repository::MemoryRepository;

    /// 由正向映射重新推导的反向索引
    fn inverted(store: &WordStore) -> BTreeMap<String, Vec<String>> {
        let mut reverse: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (source, targets) in store.entries() {
            for target in targets {
                let sources = reverse.entry(target.clone()).or_default();
                if !sources.contains(source) {
                    sources.push(source.clone());
                }
            }
        }
        reverse
    }

    #[test]
    fn test_add_and_lookup_both_directions() {
        let mut store = WordStore::new();
        assert!(store.add("  Katze ", "CAT"));

        assert_eq!(store.lookup("katze"), Some(vec!["cat".to_string()]));
        assert_eq!(store.lookup("Cat"), Some(vec!["katze".to_string()]));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut store = WordStore::new();
        assert!(store.add("Hund", "dog"));
        let before = store.stats();
        assert!(!store.add("hund", " Dog "));
        let after = store.stats();

        assert_eq!(before.keys, after.keys);
        assert_eq!(before.translations, after.translations);
        assert_eq!(after.words_indexed, 1);
    }

    #[test]
    fn test_add_rejects_invalid_pairs() {
        let mut store = WordStore::new();
        assert!(!store.add("cat", "CAT"));
        assert!(!store.add("12345", "cat"));
        assert!(!store.add("cat", "1700000000000"));
        assert!(!store.add("a", "cat"));
        assert!(!store.add("Katze", "next"));
        assert!(!store.add("správně", "dům"));
        assert!(!store.add("", "dům"));
        assert_eq!(store.stats().keys, 0);
    }

    #[test]
    fn test_targets_keep_insertion_order() {
        let mut store = WordStore::new();
        assert!(store.add("Bank", "bench"));
        assert!(store.add("Bank", "bank account"));
        assert!(!store.add("Bank", "bench"));
        assert_eq!(
            store.lookup("bank"),
            Some(vec!["bench".to_string(), "bank account".to_string()])
        );
    }

    #[test]
    fn test_partial_match() {
        let mut store = WordStore::new();
        store.add("Katze", "cat");
        assert_eq!(store.lookup("Katz"), Some(vec!["cat".to_string()]));
        assert_eq!(store.lookup("die katze schläft"), Some(vec!["cat".to_string()]));
        assert_eq!(store.lookup("k"), None);
        assert_eq!(store.lookup("vogel"), None);
    }

    #[test]
    fn test_partial_match_unions_both_maps() {
        let mut store = WordStore::new();
        store.add("Hausaufgabe", "homework");
        store.add("Haus", "house");
        store.add("Haustür", "front door");

        // "haus" 命中正向键，不进入部分匹配
        assert_eq!(store.lookup("haus"), Some(vec!["house".to_string()]));
        // "haust" 包含键 "haus"，同时被键 "haustür" 包含
        assert_eq!(
            store.lookup("haust"),
            Some(vec!["house".to_string(), "front door".to_string()])
        );
        assert_eq!(
            store.lookup("hous"),
            Some(vec!["haus".to_string()])
        );
    }

    #[test]
    fn test_reverse_index_is_inversion() {
        let mut store = WordStore::new();
        store.add_many(vec![
            ("Katze", "cat"),
            ("Kater", "cat"),
            ("Hund", "dog"),
            ("Hund", "hound"),
            ("bad", "bad"),
        ]);
        assert_eq!(store.reverse_index(), &inverted(&store));

        assert_eq!(
            store.reverse_index().get("cat"),
            Some(&vec!["kater".to_string(), "katze".to_string()])
        );

        store.clear();
        assert_eq!(store.reverse_index(), &inverted(&store));
        assert!(store.reverse_index().is_empty());
    }

    #[tokio::test]
    async fn test_reverse_lookup_order_survives_reload() {
        let repository = MemoryRepository::new();
        let mut store = WordStore::with_repository(Arc::new(repository.clone()));
        store.add("Katze", "cat");
        store.add("Kater", "cat");
        let before = store.lookup("cat");

        let reloaded = WordStore::load(Arc::new(repository)).await;
        assert_eq!(reloaded.lookup("cat"), before);
        assert_eq!(reloaded.reverse_index(), store.reverse_index());
    }

    #[test]
    fn test_add_many_counts_new_pairs() {
        let mut store = WordStore::new();
        let added = store.add_many(vec![("eins", "one"), ("eins", "one"), ("1", "one"), ("zwei", "two")]);
        assert_eq!(added, 2);
        assert_eq!(store.stats().words_indexed, 2);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let mut store = WordStore::new();
        store.add("Katze", "cat");
        store.add("Hund", "dog");
        store.add("Hund", "hound");

        let mut copy = WordStore::new();
        assert_eq!(copy.import_all(&store.export_all()), 3);
        assert_eq!(copy.entries(), store.entries());
    }

    #[test]
    fn test_import_skips_malformed_entries() {
        let mut store = WordStore::new();
        let imported = store.import_all(
            r#"{"katze": ["cat", 5, null], "hund": "dog", "vogel": {"x": 1}, "maus": 3}"#,
        );
        assert_eq!(imported, 2);
        assert_eq!(store.lookup("hund"), Some(vec!["dog".to_string()]));
    }

    #[test]
    fn test_import_rejects_bad_document() {
        let mut store = WordStore::new();
        assert_eq!(store.import_all("not json at all"), 0);
        assert_eq!(store.import_all("[\"katze\", \"cat\"]"), 0);
        assert_eq!(store.stats().keys, 0);
    }

    #[test]
    fn test_clear_resets_counters() {
        let mut store = WordStore::new();
        store.add("Katze", "cat");
        store.record_help();
        store.clear();

        let stats = store.stats();
        assert_eq!(stats.keys, 0);
        assert_eq!(stats.words_indexed, 0);
        assert_eq!(stats.answers_helped, 0);
        assert_eq!(store.lookup("katze"), None);
    }

    #[test]
    fn test_mutations_are_persisted() {
        let repository = MemoryRepository::new();
        let mut store = WordStore::with_repository(Arc::new(repository.clone()));

        store.add("Katze", "cat");
        store.add("Katze", "cat");
        store.update_settings(Settings {
            auto_answer: true,
            ..Settings::default()
        });

        assert_eq!(repository.save_count(), 2);
        let saved = repository.snapshot();
        assert_eq!(
            saved.words.unwrap().get("katze"),
            Some(&vec!["cat".to_string()])
        );
        assert!(saved.settings.unwrap().auto_answer);
    }

    #[test]
    fn test_load_restores_state_and_normalizes() {
        let mut words = BTreeMap::new();
        words.insert("  KATZE ".to_string(), vec!["Cat".to_string(), "42".to_string()]);
        let repository = MemoryRepository::with_state(PersistedState {
            words: Some(words),
            settings: Some(Settings {
                show_hints: false,
                ..Settings::default()
            }),
            stats: None,
        });

        let store = tokio_test::block_on(WordStore::load(Arc::new(repository)));
        assert_eq!(store.lookup("katze"), Some(vec!["cat".to_string()]));
        assert!(!store.settings().show_hints);
        assert_eq!(store.stats().translations, 1);
    }

    #[test]
    fn test_load_starts_new_session() {
        let first_run = chrono::Local::now() - chrono::Duration::days(30);
        let repository = MemoryRepository::with_state(PersistedState {
            words: None,
            settings: None,
            stats: Some(Stats {
                words_indexed: 12,
                answers_helped: 4,
                session_start: first_run,
            }),
        });

        let before_load = chrono::Local::now();
        let store = tokio_test::block_on(WordStore::load(Arc::new(repository)));
        let stats = store.stats();

        assert_eq!(stats.words_indexed, 12);
        assert_eq!(stats.answers_helped, 4);
        assert!(stats.session_start >= before_load);
    }
}
