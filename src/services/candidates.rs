//! 候选节点收集
//!
//! 选择题选项与文本输入框的识别在分类、答案提取、提示规划中共用

use std::collections::HashSet;

use crate::dom::patterns::{ANSWER_OPTIONS, TEXT_INPUTS};
use crate::dom::{NodeId, PageTree};
use crate::services::ui_text::is_ui_text;
use crate::utils::normalize;

/// 一个选择题选项
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOption {
    pub node: NodeId,
    pub text: String,
}

fn is_descendant<T: PageTree + ?Sized>(tree: &T, node: NodeId, ancestor: NodeId) -> bool {
    let mut current = tree.parent(node);
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        current = tree.parent(id);
    }
    false
}

/// 收集选项：可见、非界面文本、只保留最内层、按归一化文本去重
pub fn collect_options<T: PageTree + ?Sized>(tree: &T) -> Vec<AnswerOption> {
    let matched = tree.query_all(&ANSWER_OPTIONS);

    let innermost: Vec<NodeId> = matched
        .iter()
        .copied()
        .filter(|&id| !matched.iter().any(|&other| other != id && is_descendant(tree, other, id)))
        .collect();

    let mut seen = HashSet::new();
    let mut options = Vec::new();
    for id in innermost {
        if !tree.is_visible(id) {
            continue;
        }
        let text = tree.text(id);
        if text.is_empty() || is_ui_text(&text) {
            continue;
        }
        if seen.insert(normalize(&text)) {
            options.push(AnswerOption { node: id, text });
        }
    }
    options
}

/// 所有可输入文本的节点（文档顺序）
pub fn text_inputs<T: PageTree + ?Sized>(tree: &T) -> Vec<NodeId> {
    tree.traverse()
        .into_iter()
        .filter(|&id| {
            (tree.tag(id) == "input" && tree.attr(id, "type").is_none())
                || TEXT_INPUTS.iter().any(|selector| selector.matches(tree, id))
        })
        .collect()
}

/// 输入框中的文本（contenteditable 节点取其文本）
pub fn input_text<T: PageTree + ?Sized>(tree: &T, id: NodeId) -> String {
    match tree.input_value(id) {
        Some(value) => value.trim().to_string(),
        None => tree.text(id),
    }
}

/// 当前活动输入框：获得焦点者优先，其次第一个有内容的，最后第一个可见的
pub fn active_input<T: PageTree + ?Sized>(tree: &T) -> Option<NodeId> {
    let inputs = text_inputs(tree);
    inputs
        .iter()
        .copied()
        .find(|&id| tree.is_focused(id))
        .or_else(|| {
            inputs
                .iter()
                .copied()
                .find(|&id| !input_text(tree, id).is_empty())
        })
        .or_else(|| inputs.iter().copied().find(|&id| tree.is_visible(id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::SnapshotBuilder;

    #[test]
    fn test_collect_options_innermost_and_dedup() {
        let mut builder = SnapshotBuilder::new();
        let list = builder.element(0, "ul", &[("class", "options")], "");
        builder.element(list, "li", &[("class", "option")], "cat");
        builder.element(list, "li", &[("class", "option")], "Cat ");
        builder.element(list, "li", &[("class", "option")], "dog");
        builder.element(list, "li", &[("class", "option")], "Next");
        let tree = builder.build();

        let texts: Vec<String> = collect_options(&tree).into_iter().map(|o| o.text).collect();
        assert_eq!(texts, vec!["cat".to_string(), "dog".to_string()]);
    }

    #[test]
    fn test_active_input_prefers_focus() {
        let mut builder = SnapshotBuilder::new();
        let first = builder.element(0, "input", &[], "");
        let second = builder.element(0, "input", &[("type", "text")], "");
        builder.element(0, "input", &[("type", "checkbox")], "");
        builder
            .edit(first, |node| node.value = Some("foo".into()))
            .edit(second, |node| node.focused = true);
        let tree = builder.build();

        assert_eq!(text_inputs(&tree), vec![first, second]);
        assert_eq!(active_input(&tree), Some(second));
    }
}
