//! 反馈跟踪状态机 - 流程层
//!
//! 核心职责：把"题目出现 → 用户作答 → 页面反馈"这一过程转换成词库中的一条记录
//!
//! 状态转换：
//! 1. Idle / AwaitingResult + 发现新题目 → AwaitingResult(新题目)
//! 2. AwaitingResult + 正确反馈 + 取到答案 → 写入词库 → Idle
//! 3. AwaitingResult + 错误反馈 + 取到公布的答案 → 写入词库 → Idle
//!
//! 同一次处理中先发现题目，再检查反馈；正确信号先于错误信号检查。
//! 已处理完的题目会记住其键，页面不变时重复处理不会再次提交

use tracing::{debug, info};

use crate::dom::PageTree;
use crate::models::{ExerciseMode, LearnEvent, LearnKind, QuestionRecord};
use crate::services::feedback::{has_correct_signal, has_incorrect_signal};
use crate::services::{AnswerExtractor, TextScorer};
use crate::store::WordStore;
use crate::utils::normalize;

/// 跟踪器状态
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerState {
    /// 没有等待反馈的题目
    Idle,
    /// 题目已出现，等待页面给出反馈
    AwaitingResult(QuestionRecord),
}

/// 反馈跟踪器
///
/// - 每个被观察的页面一个实例
/// - 只通过 `observe` 推进状态
/// - 不持有页面，只读取传入的节点树
pub struct FeedbackTracker {
    scorer: TextScorer,
    state: TrackerState,
    /// 最近一次看到的题目键（处理完成后仍保留）
    current_key: Option<String>,
}

impl FeedbackTracker {
    /// 创建新的跟踪器
    pub fn new(scorer: TextScorer) -> Self {
        Self {
            scorer,
            state: TrackerState::Idle,
            current_key: None,
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    /// 正在等待反馈的题目
    pub fn pending(&self) -> Option<&QuestionRecord> {
        match &self.state {
            TrackerState::AwaitingResult(question) => Some(question),
            TrackerState::Idle => None,
        }
    }

    /// 最近一次看到的题目键
    pub fn current_key(&self) -> Option<&str> {
        self.current_key.as_deref()
    }

    /// 回到初始状态（清空词库后调用）
    pub fn reset(&mut self) {
        self.state = TrackerState::Idle;
        self.current_key = None;
    }

    /// 处理一次页面状态
    ///
    /// # 参数
    /// - `tree`: 当前页面快照
    /// - `mode`: 本次识别出的练习模式
    /// - `store`: 学到答案时写入的词库
    ///
    /// # 返回
    /// 本次提交的学习事件；没有提交时返回 None
    pub fn observe<T: PageTree + ?Sized>(
        &mut self,
        tree: &T,
        mode: ExerciseMode,
        store: &mut WordStore,
    ) -> Option<LearnEvent> {
        self.discover(tree, mode);

        let TrackerState::AwaitingResult(question) = &self.state else {
            return None;
        };

        let (kind, answer) = if has_correct_signal(tree) {
            (LearnKind::Correct, AnswerExtractor::find_correct_answer(tree))
        } else if has_incorrect_signal(tree) {
            (
                LearnKind::Correction,
                AnswerExtractor::find_revealed_answer(tree),
            )
        } else {
            return None;
        };

        let Some(answer) = answer.filter(|answer| !answer.trim().is_empty()) else {
            debug!("检测到 {:?} 反馈，但没有取到答案，继续等待", kind);
            return None;
        };

        let stored = store.add(&question.text, &answer);
        let event = LearnEvent {
            kind,
            question: question.text.clone(),
            answer,
            stored,
            at: chrono::Local::now(),
        };

        match (kind, stored) {
            (LearnKind::Correct, true) => {
                info!("✅ 回答正确，已记住: {} → {}", event.question, event.answer)
            }
            (LearnKind::Correction, true) => {
                info!("📝 回答错误，已记住正确答案: {} → {}", event.question, event.answer)
            }
            (_, false) => debug!("词对未写入（重复或被过滤）: {} → {}", event.question, event.answer),
        }

        self.state = TrackerState::Idle;
        Some(event)
    }

    /// 发现题目：键与上一次不同时进入 AwaitingResult（旧题目直接被替换）
    fn discover<T: PageTree + ?Sized>(&mut self, tree: &T, mode: ExerciseMode) {
        let Some(text) = self.scorer.locate_question(tree) else {
            return;
        };
        let key = normalize(&text);
        if key.is_empty() || self.current_key.as_deref() == Some(key.as_str()) {
            return;
        }

        let record = QuestionRecord::new(text, mode);
        if let TrackerState::AwaitingResult(previous) = &self.state {
            debug!("题目 {} 未得到反馈，被 {} 替换", previous, record);
        }
        info!("🆕 发现新题目: {}", record);
        self.current_key = Some(key);
        self.state = TrackerState::AwaitingResult(record);
    }
}

impl Default for FeedbackTracker {
    fn default() -> Self {
        Self::new(TextScorer::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Snapshot, SnapshotBuilder};

    /// 题目 + 文本输入框（可选反馈）
    fn typing_page(question: &str, typed: &str, feedback: Option<(&str, &str)>) -> Snapshot {
        let mut builder = SnapshotBuilder::new();
        builder.element(0, "div", &[("class", "question")], question);
        let input = builder.element(0, "input", &[("type", "text")], "");
        builder.edit(input, |node| {
            node.value = Some(typed.to_string());
            node.focused = true;
        });
        if let Some((class, text)) = feedback {
            builder.element(0, "div", &[("class", class)], text);
        }
        builder.build()
    }

    fn pending_key(tracker: &FeedbackTracker) -> Option<&str> {
        tracker.pending().map(|question| question.key.as_str())
    }

    #[test]
    fn test_correct_answer_is_learned_once() {
        let mut tracker = FeedbackTracker::default();
        let mut store = WordStore::new();

        let page = typing_page("Katze", "", None);
        assert!(tracker.observe(&page, ExerciseMode::Typing, &mut store).is_none());
        assert_eq!(pending_key(&tracker), Some("katze"));

        let page = typing_page("Katze", "cat", Some(("feedback correct", "Correct!")));
        let event = tracker
            .observe(&page, ExerciseMode::Typing, &mut store)
            .expect("learn event");
        assert_eq!(event.kind, LearnKind::Correct);
        assert_eq!(event.answer, "cat");
        assert!(event.stored);
        assert_eq!(tracker.state(), &TrackerState::Idle);
        assert_eq!(store.lookup("Katze"), Some(vec!["cat".to_string()]));

        // 页面未变化：不会再次提交
        assert!(tracker.observe(&page, ExerciseMode::Typing, &mut store).is_none());
        assert_eq!(tracker.state(), &TrackerState::Idle);

        let page = typing_page("Hund", "", None);
        assert!(tracker.observe(&page, ExerciseMode::Typing, &mut store).is_none());
        assert_eq!(pending_key(&tracker), Some("hund"));
        assert_eq!(store.stats().keys, 1);
    }

    #[test]
    fn test_question_and_feedback_in_same_pass() {
        let mut tracker = FeedbackTracker::default();
        let mut store = WordStore::new();

        let page = typing_page("Katze", "cat", Some(("feedback correct", "Correct!")));
        let event = tracker.observe(&page, ExerciseMode::Typing, &mut store);
        assert_eq!(event.map(|event| event.answer), Some("cat".to_string()));
    }

    #[test]
    fn test_revealed_answer_after_mistake() {
        let mut tracker = FeedbackTracker::default();
        let mut store = WordStore::new();

        tracker.observe(&typing_page("Hund", "", None), ExerciseMode::Typing, &mut store);
        let page = typing_page(
            "Hund",
            "cat",
            Some(("feedback wrong", "Wrong. The correct answer is: dog")),
        );
        let event = tracker
            .observe(&page, ExerciseMode::Typing, &mut store)
            .expect("learn event");

        assert_eq!(event.kind, LearnKind::Correction);
        assert_eq!(event.answer, "dog");
        assert_eq!(store.lookup("hund"), Some(vec!["dog".to_string()]));
    }

    #[test]
    fn test_announced_answer_is_not_taken_from_input() {
        for announcement in ["Correct answer: dog", "The right answer is dog"] {
            let mut tracker = FeedbackTracker::default();
            let mut store = WordStore::new();

            tracker.observe(&typing_page("Hund", "", None), ExerciseMode::Typing, &mut store);
            let page = typing_page("Hund", "cat", Some(("feedback", announcement)));
            let event = tracker
                .observe(&page, ExerciseMode::Typing, &mut store)
                .expect("learn event");

            assert_eq!(event.kind, LearnKind::Correction, "{}", announcement);
            assert_eq!(event.answer, "dog");
            assert_eq!(store.lookup("hund"), Some(vec!["dog".to_string()]));
            assert_eq!(store.lookup("cat"), None);
        }
    }

    #[test]
    fn test_new_question_supersedes_pending() {
        let mut tracker = FeedbackTracker::default();
        let mut store = WordStore::new();

        tracker.observe(&typing_page("Katze", "", None), ExerciseMode::Typing, &mut store);
        tracker.observe(&typing_page("Maus", "", None), ExerciseMode::Typing, &mut store);
        assert_eq!(pending_key(&tracker), Some("maus"));

        let page = typing_page("Maus", "mouse", Some(("feedback correct", "Correct!")));
        let event = tracker.observe(&page, ExerciseMode::Typing, &mut store);
        assert_eq!(event.map(|event| event.question), Some("Maus".to_string()));
        assert_eq!(store.lookup("Katze"), None);
    }

    #[test]
    fn test_feedback_without_answer_keeps_waiting() {
        let mut tracker = FeedbackTracker::default();
        let mut store = WordStore::new();

        let page = typing_page("Vogel", "", Some(("feedback wrong", "Wrong")));
        assert!(tracker.observe(&page, ExerciseMode::Typing, &mut store).is_none());
        assert_eq!(pending_key(&tracker), Some("vogel"));
        assert!(store.entries().is_empty());
    }

    #[test]
    fn test_feedback_without_question_is_ignored() {
        let mut tracker = FeedbackTracker::default();
        let mut store = WordStore::new();

        let mut builder = SnapshotBuilder::new();
        builder.element(0, "div", &[("class", "feedback correct")], "Correct!");
        let page = builder.build();

        assert!(tracker.observe(&page, ExerciseMode::None, &mut store).is_none());
        assert_eq!(tracker.state(), &TrackerState::Idle);
    }

    #[test]
    fn test_reset_forgets_current_question() {
        let mut tracker = FeedbackTracker::default();
        let mut store = WordStore::new();

        let page = typing_page("Katze", "cat", Some(("feedback correct", "Correct!")));
        assert!(tracker.observe(&page, ExerciseMode::Typing, &mut store).is_some());
        tracker.reset();
        assert_eq!(tracker.current_key(), None);

        // 重置后同一页面会再次提交（词库中已存在，stored=false）
        let event = tracker.observe(&page, ExerciseMode::Typing, &mut store);
        assert_eq!(event.map(|event| event.stored), Some(false));
    }
}
