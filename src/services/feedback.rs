//! 反馈信号探测
//!
//! 类名 / 属性信号与反馈容器文本判定二者取其一。
//! 否定短语先于肯定短语判断，"incorrect" 永远不会被读成 "correct"。
//! 公布答案的句式（"Correct answer: …"、"The right answer is …"）属于否定

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::patterns::{CORRECT_FEEDBACK, FEEDBACK_CONTAINERS, INCORRECT_FEEDBACK};
use crate::dom::{NodeId, PageTree};

/// 反馈判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
}

static NEGATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
          \b(incorrect|wrong|not\ quite|mistake|špatně|nesprávně|chyba|falsch|faux|incorrecto)\b
          | \b(correct|right)\ answer\s*(is|was|:)
          | správná\ odpověď
          | \bsprávně\ (je|bylo)\b
          | richtige\ antwort\s*(ist|lautet|wäre|:)
          | la\ bonne\ réponse\s*(est|était|:)
          | la\ respuesta\ correcta\s*(es|era|:)
        ",
    )
    .expect("valid regex")
});

static AFFIRMATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(correct|right|well done|great|excellent|perfect|správně|výborně|skvěle|richtig|bravo|parfait|correcto)\b|[✓✔✅]",
    )
    .expect("valid regex")
});

/// 根据文本判断反馈类型
pub fn classify_feedback_text(text: &str) -> Option<Verdict> {
    if NEGATIVE.is_match(text) {
        Some(Verdict::Incorrect)
    } else if AFFIRMATIVE.is_match(text) {
        Some(Verdict::Correct)
    } else {
        None
    }
}

/// 可见的、文本判定为 `verdict` 的反馈容器
fn containers_with_verdict<T: PageTree + ?Sized>(tree: &T, verdict: Verdict) -> Vec<NodeId> {
    tree.query_all(&FEEDBACK_CONTAINERS)
        .into_iter()
        .filter(|&id| tree.is_visible(id))
        .filter(|&id| classify_feedback_text(&tree.text(id)) == Some(verdict))
        .collect()
}

/// 表示"回答正确"的可见节点（类名信号优先，其次文本判定）
pub fn success_nodes<T: PageTree + ?Sized>(tree: &T) -> Vec<NodeId> {
    let mut nodes: Vec<NodeId> = tree
        .query_ordered(&CORRECT_FEEDBACK)
        .into_iter()
        .filter(|&id| tree.is_visible(id))
        .collect();
    for id in containers_with_verdict(tree, Verdict::Correct) {
        if !nodes.contains(&id) {
            nodes.push(id);
        }
    }
    nodes
}

/// 表示"回答错误"的可见节点
pub fn failure_nodes<T: PageTree + ?Sized>(tree: &T) -> Vec<NodeId> {
    let mut nodes: Vec<NodeId> = tree
        .query_ordered(&INCORRECT_FEEDBACK)
        .into_iter()
        .filter(|&id| tree.is_visible(id))
        .collect();
    for id in containers_with_verdict(tree, Verdict::Incorrect) {
        if !nodes.contains(&id) {
            nodes.push(id);
        }
    }
    nodes
}

pub fn has_correct_signal<T: PageTree + ?Sized>(tree: &T) -> bool {
    !success_nodes(tree).is_empty()
}

pub fn has_incorrect_signal<T: PageTree + ?Sized>(tree: &T) -> bool {
    !failure_nodes(tree).is_empty()
}
