//! 题目定位服务 - 业务能力层
//!
//! 在没有结构约定的节点树里找出"当前题目"文本，按三个策略依次尝试：
//! 1. 显著节点扫描（固定优先级选择器）
//! 2. 全局打分（字号、位置、标签、类名）
//! 3. 配置的选择器兜底

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::dom::patterns::PROMINENT_QUESTION;
use crate::dom::{NodeId, PageTree, Selector};
use crate::services::ui_text::is_ui_text;

/// 全局打分时跳过的标签（脚本、交互控件、结构容器）
static EXCLUDED_TAGS: phf::Set<&'static str> = phf::phf_set! {
    "script", "style", "noscript", "template", "input", "textarea", "select",
    "option", "button", "html", "head", "body", "nav", "header", "footer",
    "form", "svg", "iframe",
};

static HEADING_TAGS: phf::Set<&'static str> = phf::phf_set! {
    "h1", "h2", "h3", "h4", "h5", "h6",
};

static QUESTION_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)word|question|vocab|term|prompt").expect("valid regex"));

const MAX_PROMINENT_CHILDREN: usize = 3;
const MAX_LEAF_CHILDREN: usize = 2;
const MIN_TEXT_LEN: usize = 2;
const MAX_TEXT_LEN: usize = 100;

/// 题目定位服务
///
/// 职责：
/// - 纯读取，不修改节点树
/// - 第一个非空结果胜出
pub struct TextScorer {
    configured: Vec<Selector>,
}

impl TextScorer {
    /// 使用配置中的兜底选择器创建（无效选择器会被跳过）
    pub fn new<S: AsRef<str>>(configured_selectors: &[S]) -> Self {
        Self {
            configured: Selector::parse_lossy(configured_selectors),
        }
    }

    /// 定位当前题目文本
    pub fn locate_question<T: PageTree + ?Sized>(&self, tree: &T) -> Option<String> {
        if let Some(text) = self.prominent_scan(tree) {
            debug!("题目来自显著节点: {}", text);
            return Some(text);
        }
        if let Some((id, score)) = self.best_scored(tree) {
            let text = tree.text(id);
            debug!("题目来自全局打分 (score={:.1}): {}", score, text);
            return Some(text);
        }
        if let Some(text) = self.configured_fallback(tree) {
            debug!("题目来自配置选择器: {}", text);
            return Some(text);
        }
        None
    }

    /// 策略 1：显著节点扫描
    fn prominent_scan<T: PageTree + ?Sized>(&self, tree: &T) -> Option<String> {
        tree.query_ordered(&PROMINENT_QUESTION)
            .into_iter()
            .filter(|&id| tree.children(id).len() <= MAX_PROMINENT_CHILDREN)
            .filter(|&id| tree.is_visible(id))
            .map(|id| tree.text(id))
            .find(|text| !text.is_empty() && !is_ui_text(text))
    }

    /// 策略 2：全局打分，返回得分最高的节点（同分时先出现者胜出）
    pub(crate) fn best_scored<T: PageTree + ?Sized>(&self, tree: &T) -> Option<(NodeId, f64)> {
        let mut best: Option<(NodeId, f64)> = None;

        for id in tree.traverse() {
            let Some(score) = self.score_node(tree, id) else {
                continue;
            };
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((id, score)),
            }
        }

        best
    }

    /// 单个节点得分；不合格返回 None
    fn score_node<T: PageTree + ?Sized>(&self, tree: &T, id: NodeId) -> Option<f64> {
        let tag = tree.tag(id);
        if EXCLUDED_TAGS.contains(tag) || tree.children(id).len() > MAX_LEAF_CHILDREN {
            return None;
        }

        let text = tree.text(id);
        let len = text.chars().count();
        if !(MIN_TEXT_LEN..=MAX_TEXT_LEN).contains(&len) || is_ui_text(&text) {
            return None;
        }

        let bounds = tree.bounds(id);
        if !bounds.is_visible() {
            return None;
        }

        let mut score = tree.font_size(id);
        if bounds.y < tree.viewport_height() / 2.0 {
            score *= 2.0;
        }
        if HEADING_TAGS.contains(tag) {
            score *= 1.5;
        }
        if tree
            .attr(id, "class")
            .map_or(false, |class| QUESTION_CLASS.is_match(class))
        {
            score *= 2.0;
        }
        Some(score)
    }

    /// 策略 3：配置的选择器
    fn configured_fallback<T: PageTree + ?Sized>(&self, tree: &T) -> Option<String> {
        tree.query_ordered(&self.configured)
            .into_iter()
            .map(|id| tree.text(id))
            .find(|text| !text.is_empty() && !is_ui_text(text))
    }
}

impl Default for TextScorer {
    fn default() -> Self {
        Self::new::<&str>(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Bounds, SnapshotBuilder};

    #[test]
    fn test_prominent_node_wins() {
        let mut builder = SnapshotBuilder::new();
        builder.element(0, "h1", &[], "Lesson 4");
        builder.element(0, "div", &[("class", "word-card")], "Katze");
        builder.element(0, "p", &[], "irrelevant paragraph text");
        let tree = builder.build();

        let scorer = TextScorer::default();
        assert_eq!(scorer.locate_question(&tree).as_deref(), Some("Katze"));
    }

    #[test]
    fn test_prominent_skips_invisible_and_containers() {
        let mut builder = SnapshotBuilder::new();
        let hidden = builder.element(0, "div", &[("class", "question")], "Hund");
        builder.edit(hidden, |node| node.bounds = Bounds::default());
        let container = builder.element(0, "div", &[("class", "question-list")], "");
        for word in ["a1", "b2", "c3", "d4"] {
            builder.element(container, "span", &[], word);
        }
        builder.element(0, "h2", &[], "Vogel");
        let tree = builder.build();

        let scorer = TextScorer::default();
        assert_eq!(scorer.locate_question(&tree).as_deref(), Some("Vogel"));
    }

    #[test]
    fn test_global_scoring_prefers_large_upper_text() {
        let mut builder = SnapshotBuilder::new();
        let small = builder.element(0, "p", &[], "kleiner Text");
        let big = builder.element(0, "div", &[], "Schmetterling");
        let low = builder.element(0, "div", &[], "unten");
        builder
            .edit(small, |node| node.font_size = 14.0)
            .edit(big, |node| node.font_size = 30.0)
            .edit(low, |node| {
                node.font_size = 40.0;
                node.bounds = Bounds::new(0.0, 700.0, 100.0, 20.0);
            });
        let tree = builder.build();

        // 40 (下半部) < 30 * 2 (上半部)
        let scorer = TextScorer::default();
        assert_eq!(scorer.best_scored(&tree).map(|(id, _)| id), Some(big));
        assert_eq!(scorer.locate_question(&tree).as_deref(), Some("Schmetterling"));
    }

    #[test]
    fn test_global_scoring_tie_break_is_stable() {
        let mut builder = SnapshotBuilder::new();
        let first = builder.element(0, "div", &[], "Apfel");
        builder.element(0, "div", &[], "Birne");
        let tree = builder.build();

        let scorer = TextScorer::default();
        for _ in 0..5 {
            assert_eq!(scorer.best_scored(&tree).map(|(id, _)| id), Some(first));
        }
    }

    #[test]
    fn test_global_scoring_rejects_noise() {
        let mut builder = SnapshotBuilder::new();
        builder.element(0, "button", &[], "Abschicken");
        builder.element(0, "span", &[], "1700000000000");
        builder.element(0, "span", &[], "next");
        builder.element(0, "span", &[], &"lang".repeat(30));
        let tree = builder.build();

        assert_eq!(TextScorer::default().locate_question(&tree), None);
    }

    #[test]
    fn test_configured_selector_fallback() {
        let mut builder = SnapshotBuilder::new();
        let prompt = builder.element(0, "span", &[("data-role", "prompt")], "Maus");
        builder.edit(prompt, |node| node.bounds = Bounds::default());
        let tree = builder.build();

        let scorer = TextScorer::new(&["[broken", "[data-role=prompt]"]);
        assert_eq!(scorer.locate_question(&tree).as_deref(), Some("Maus"));
    }
}
