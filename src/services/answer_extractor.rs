//! 答案提取服务 - 业务能力层
//!
//! 页面给出反馈后，按固定顺序尝试多种形态恢复正确答案文本。
//! 纯读取；找不到时返回 None 而不是报错

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::dom::patterns::{
    ACTIVE_SELECTED, CORRECT_LIKE, FEEDBACK_CONTAINERS, HIGHLIGHTED, REVEALED_ANSWER,
};
use crate::dom::{NodeId, PageTree, Selector};
use crate::services::candidates::{active_input, collect_options, input_text};
use crate::services::feedback::{failure_nodes, success_nodes};
use crate::services::ui_text::is_ui_text;

const MAX_LEAF_CHILDREN: usize = 3;
const MAX_ANSWER_LEN: usize = 100;

/// "正确答案是 …" 的多语言写法，按顺序尝试
static ANSWER_PHRASES: Lazy<Vec<Regex>> = Lazy::new(|| {
    const TAIL: &str = r#"\s*:?\s*["'„“«]?([^"'“”»\n.!?]+)"#;
    [
        r"(?i)the (?:correct|right) answer (?:is|was)",
        r"(?i)(?:correct|right) answer\s*(?:is|was|:)",
        r"(?i)správná odpověď(?:\s+(?:je|byla|zní))?",
        r"(?i)správně (?:je|bylo)",
        r"(?i)richtige antwort(?:\s+(?:ist|lautet|wäre))?",
        r"(?i)la bonne réponse (?:est|était)",
        r"(?i)la respuesta correcta (?:es|era)",
        r"(?i)(?:answer|odpověď|antwort|réponse|respuesta)\s*:",
    ]
    .iter()
    .filter_map(|head| Regex::new(&format!("{}{}", head, TAIL)).ok())
    .collect()
});

/// 成功反馈中需要剥离的肯定用语与符号
static AFFIRMATIONS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(?:well done|great job|good job|nice work)\b",
        r"(?i)\b(?:correct|right|great|excellent|perfect|nice|awesome)\b",
        r"(?i)\b(?:správně|výborně|skvěle|dobře|perfektní)\b",
        r"(?i)\b(?:richtig|super|bravo|génial|parfait|correcto)\b",
        r"[✓✔✅👍🎉⭐]",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// 按顺序匹配短语，返回第一个捕获组
pub fn extract_from_phrase(text: &str) -> Option<String> {
    ANSWER_PHRASES.iter().find_map(|regex| {
        regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|answer| !answer.is_empty())
    })
}

/// 剥离肯定用语后剩余的文本（1..=100 个字符才接受）
pub fn strip_affirmations(text: &str) -> Option<String> {
    let mut rest = text.to_string();
    for regex in AFFIRMATIONS.iter() {
        rest = regex.replace_all(&rest, " ").into_owned();
    }
    let rest = rest
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c.is_whitespace() || "!.,:;-–—".contains(c))
        .to_string();

    let len = rest.chars().count();
    if (1..=MAX_ANSWER_LEN).contains(&len) {
        Some(rest)
    } else {
        None
    }
}

fn matches_any<T: PageTree + ?Sized>(tree: &T, id: NodeId, selectors: &[Selector]) -> bool {
    selectors.iter().any(|selector| selector.matches(tree, id))
}

/// 叶子类节点的非界面文本
fn leaf_text<T: PageTree + ?Sized>(tree: &T, id: NodeId) -> Option<String> {
    if tree.children(id).len() > MAX_LEAF_CHILDREN {
        return None;
    }
    let text = tree.text(id);
    if text.is_empty() || is_ui_text(&text) {
        None
    } else {
        Some(text)
    }
}

/// 答案提取服务
///
/// 职责：
/// - 回答正确时恢复用户给出的答案
/// - 回答错误时恢复页面公布的正确答案
/// - 不写词库，不关心状态
pub struct AnswerExtractor;

impl AnswerExtractor {
    /// 回答正确后的答案
    pub fn find_correct_answer<T: PageTree + ?Sized>(tree: &T) -> Option<String> {
        // 1. 活动输入框的值
        if let Some(value) = active_input(tree)
            .and_then(|id| tree.input_value(id).map(|_| input_text(tree, id)))
            .filter(|value| !value.is_empty())
        {
            debug!("答案来自输入框: {}", value);
            return Some(value);
        }

        // 2. 既被高亮又标记为正确的节点
        if let Some(text) = tree
            .query_ordered(&HIGHLIGHTED)
            .into_iter()
            .filter(|&id| matches_any(tree, id, &CORRECT_LIKE))
            .find_map(|id| leaf_text(tree, id))
        {
            debug!("答案来自高亮的正确选项: {}", text);
            return Some(text);
        }

        // 3. 通用的选中 / 激活节点
        if let Some(text) = tree
            .query_ordered(&ACTIVE_SELECTED)
            .into_iter()
            .find_map(|id| leaf_text(tree, id))
        {
            debug!("答案来自选中节点: {}", text);
            return Some(text);
        }

        // 4. 成功反馈文本剥离肯定用语
        let answer = success_nodes(tree).into_iter().find_map(|id| {
            let text = tree.text(id);
            extract_from_phrase(&text).or_else(|| strip_affirmations(&text))
        });
        if let Some(text) = &answer {
            debug!("答案来自成功反馈: {}", text);
        }
        answer
    }

    /// 回答错误后页面公布的正确答案
    pub fn find_revealed_answer<T: PageTree + ?Sized>(tree: &T) -> Option<String> {
        // 1. 显式公布答案的节点
        if let Some(text) = tree.query_ordered(&REVEALED_ANSWER).into_iter().find_map(|id| {
            let text = tree
                .attr(id, "data-correct-answer")
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| tree.text(id));
            let text = extract_from_phrase(&text).unwrap_or(text);
            (!text.is_empty() && !is_ui_text(&text)).then_some(text)
        }) {
            debug!("答案来自公布节点: {}", text);
            return Some(text);
        }

        // 2. 标记为正确但未被选中的节点
        if let Some(text) = tree
            .query_ordered(&CORRECT_LIKE)
            .into_iter()
            .filter(|&id| !matches_any(tree, id, &HIGHLIGHTED))
            .find_map(|id| leaf_text(tree, id))
        {
            debug!("答案来自未选中的正确节点: {}", text);
            return Some(text);
        }

        // 3. 反馈文本中的"正确答案是 …"
        let mut feedback = failure_nodes(tree);
        for id in tree.query_all(&FEEDBACK_CONTAINERS) {
            if !feedback.contains(&id) {
                feedback.push(id);
            }
        }
        if let Some(text) = feedback
            .into_iter()
            .find_map(|id| extract_from_phrase(&tree.text(id)))
        {
            debug!("答案来自反馈短语: {}", text);
            return Some(text);
        }

        // 4. 被标记为正确的选项
        let answer = collect_options(tree)
            .into_iter()
            .find(|option| {
                matches_any(tree, option.node, &CORRECT_LIKE)
                    || tree
                        .class_list(option.node)
                        .iter()
                        .any(|class| class.to_ascii_lowercase().contains("correct")
                            && !class.to_ascii_lowercase().contains("incorrect"))
            })
            .map(|option| option.text);
        if let Some(text) = &answer {
            debug!("答案来自正确选项: {}", text);
        }
        answer
    }
}
