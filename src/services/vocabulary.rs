//! 词汇表结构化提取
//!
//! 从表格行、`dt`/`dd`、带词 / 译文类名的行中提取词对；只保留能通过词库校验的词对

use std::collections::HashSet;

use crate::dom::patterns::{VOCAB_ROWS, VOCAB_SOURCE, VOCAB_TARGET};
use crate::dom::{NodeId, PageTree, Selector};
use crate::store::validate_pair;

fn first_descendant<T: PageTree + ?Sized>(
    tree: &T,
    root: NodeId,
    selectors: &[Selector],
) -> Option<NodeId> {
    let mut stack: Vec<NodeId> = tree.children(root).iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        if selectors.iter().any(|selector| selector.matches(tree, id)) {
            return Some(id);
        }
        stack.extend(tree.children(id).iter().rev().copied());
    }
    None
}

/// 表格行：前两个 `td`
fn table_pairs<T: PageTree + ?Sized>(tree: &T, order: &[NodeId]) -> Vec<(String, String)> {
    order
        .iter()
        .filter(|&&id| tree.tag(id) == "tr")
        .filter_map(|&row| {
            let cells: Vec<NodeId> = tree
                .children(row)
                .iter()
                .copied()
                .filter(|&cell| tree.tag(cell) == "td")
                .collect();
            match cells.as_slice() {
                [source, target, ..] => Some((tree.text(*source), tree.text(*target))),
                _ => None,
            }
        })
        .collect()
}

/// 定义列表：相邻的 `dt` + `dd`
fn definition_pairs<T: PageTree + ?Sized>(tree: &T, order: &[NodeId]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for &list in order.iter().filter(|&&id| tree.tag(id) == "dl") {
        let children = tree.children(list);
        for window in children.windows(2) {
            if tree.tag(window[0]) == "dt" && tree.tag(window[1]) == "dd" {
                pairs.push((tree.text(window[0]), tree.text(window[1])));
            }
        }
    }
    pairs
}

/// 带类名的词汇行
fn labeled_pairs<T: PageTree + ?Sized>(tree: &T) -> Vec<(String, String)> {
    tree.query_all(&VOCAB_ROWS)
        .into_iter()
        .filter_map(|row| {
            let source = first_descendant(tree, row, &VOCAB_SOURCE)?;
            let target = first_descendant(tree, row, &VOCAB_TARGET)?;
            (source != target).then(|| (tree.text(source), tree.text(target)))
        })
        .collect()
}

/// 提取页面上的全部词对（原文形式，按文档顺序，按归一化结果去重）
pub fn extract_word_pairs<T: PageTree + ?Sized>(tree: &T) -> Vec<(String, String)> {
    let order = tree.traverse();
    let mut seen = HashSet::new();

    table_pairs(tree, &order)
        .into_iter()
        .chain(definition_pairs(tree, &order))
        .chain(labeled_pairs(tree))
        .filter(|(source, target)| {
            validate_pair(source, target).map_or(false, |key| seen.insert(key))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::SnapshotBuilder;

    #[test]
    fn test_table_and_definition_pairs() {
        let mut builder = SnapshotBuilder::new();
        let table = builder.element(0, "table", &[], "");
        let header = builder.element(table, "tr", &[], "");
        builder.element(header, "th", &[], "Deutsch");
        builder.element(header, "th", &[], "English");
        let row = builder.element(table, "tr", &[], "");
        builder.element(row, "td", &[], "Katze");
        builder.element(row, "td", &[], "cat");
        let noise = builder.element(table, "tr", &[], "");
        builder.element(noise, "td", &[], "12");
        builder.element(noise, "td", &[], "34");

        let dl = builder.element(0, "dl", &[], "");
        builder.element(dl, "dt", &[], "Hund");
        builder.element(dl, "dd", &[], "dog");
        let tree = builder.build();

        assert_eq!(
            extract_word_pairs(&tree),
            vec![
                ("Katze".to_string(), "cat".to_string()),
                ("Hund".to_string(), "dog".to_string())
            ]
        );
    }

    #[test]
    fn test_labeled_pairs_and_dedup() {
        let mut builder = SnapshotBuilder::new();
        for _ in 0..2 {
            let row = builder.element(0, "div", &[("class", "vocab-item")], "");
            builder.element(row, "span", &[("class", "term")], "Vogel");
            builder.element(row, "span", &[("class", "translation")], "bird");
        }
        let tree = builder.build();

        assert_eq!(
            extract_word_pairs(&tree),
            vec![("Vogel".to_string(), "bird".to_string())]
        );
    }
}
