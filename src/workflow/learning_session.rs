//! 单次页面处理流程 - 流程层
//!
//! 核心职责：定义"一次处理"的完整顺序
//!
//! 流程顺序：
//! 1. 识别练习模式
//! 2. 反馈跟踪（发现题目 / 提交学到的词对）
//! 3. 词汇表页面：批量收录词对
//! 4. 为仍在等待反馈的题目规划提示

use tracing::{debug, info};

use crate::dom::PageTree;
use crate::models::{ExerciseMode, LearnEvent};
use crate::services::{extract_word_pairs, plan_actions, Assistance, ExerciseClassifier, TextScorer};
use crate::store::WordStore;
use crate::workflow::feedback_tracker::FeedbackTracker;

/// 一次处理的结果
#[derive(Debug, Clone, PartialEq)]
pub struct PassOutcome {
    pub mode: ExerciseMode,
    /// 仍在等待反馈的题目
    pub question: Option<String>,
    pub event: Option<LearnEvent>,
    /// 从词汇表新收录的词对数量
    pub harvested: usize,
    pub assistance: Assistance,
}

/// 学习会话
///
/// - 持有词库与反馈跟踪器
/// - 不持有页面；页面写操作以 `PageAction` 形式交给调用方执行
pub struct LearningSession {
    store: WordStore,
    tracker: FeedbackTracker,
    /// 已计入 answers_helped 的题目键
    helped_key: Option<String>,
}

impl LearningSession {
    /// 创建新的学习会话
    ///
    /// # 参数
    /// - `store`: 已加载的词库
    /// - `scorer`: 题目定位服务（带配置的兜底选择器）
    pub fn new(store: WordStore, scorer: TextScorer) -> Self {
        Self {
            store,
            tracker: FeedbackTracker::new(scorer),
            helped_key: None,
        }
    }

    pub fn store(&self) -> &WordStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut WordStore {
        &mut self.store
    }

    pub fn tracker(&self) -> &FeedbackTracker {
        &self.tracker
    }

    /// 处理一次页面状态
    pub fn process<T: PageTree + ?Sized>(&mut self, tree: &T) -> PassOutcome {
        let mode = ExerciseClassifier::classify(tree);
        let event = self.tracker.observe(tree, mode, &mut self.store);

        let harvested = if mode == ExerciseMode::Vocabulary {
            let pairs = extract_word_pairs(tree);
            let added = self.store.add_many(pairs);
            if added > 0 {
                info!("📚 从词汇表收录 {} 个新词对", added);
            }
            added
        } else {
            0
        };

        let pending = self.tracker.pending().cloned();
        let question = pending.as_ref().map(|record| record.text.clone());
        let settings = self.store.settings();
        let assistance = plan_actions(tree, mode, question.as_deref(), &self.store, settings);

        if !assistance.is_empty() {
            let key = pending.map(|record| record.key);
            if key.is_some() && key != self.helped_key {
                self.store.record_help();
                self.helped_key = key;
            }
        }

        debug!(
            "处理完成: 模式={}, 题目={:?}, 学到={}, 收录={}, 操作={}",
            mode,
            question,
            event.is_some(),
            harvested,
            assistance.actions.len()
        );

        PassOutcome {
            mode,
            question,
            event,
            harvested,
            assistance,
        }
    }

    /// 清空词库并重置跟踪状态
    pub fn clear(&mut self) {
        self.store.clear();
        self.tracker.reset();
        self.helped_key = None;
    }
}
