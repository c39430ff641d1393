//! 页面树能力接口
//!
//! 核心算法只依赖 `PageTree`，因此同一套逻辑可以运行在真实页面快照或测试构造的节点树上

use serde::{Deserialize, Serialize};

use crate::dom::selector::Selector;

/// 节点编号（快照内的下标）
pub type NodeId = usize;

/// 节点可见区域（视口坐标，单位 px）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// 宽高均非零
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// 只读的页面树查询能力
///
/// 实现者只需提供节点级别的访问器，遍历与选择器查询由默认方法给出
pub trait PageTree {
    fn root(&self) -> Option<NodeId>;
    fn parent(&self, id: NodeId) -> Option<NodeId>;
    fn children(&self, id: NodeId) -> &[NodeId];
    /// 小写标签名
    fn tag(&self, id: NodeId) -> &str;
    fn attr(&self, id: NodeId, name: &str) -> Option<&str>;
    /// 节点自身直接包含的文本（不含子节点）
    fn own_text(&self, id: NodeId) -> &str;
    fn bounds(&self, id: NodeId) -> Bounds;
    fn font_size(&self, id: NodeId) -> f64;
    /// 输入框当前值（非输入类节点为 None）
    fn input_value(&self, id: NodeId) -> Option<&str>;
    fn is_focused(&self, id: NodeId) -> bool;
    fn viewport_height(&self) -> f64;

    /// 先序遍历（文档顺序），结果稳定
    fn traverse(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let Some(root) = self.root() else {
            return order;
        };

        let mut visited = std::collections::HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            order.push(id);
            for &child in self.children(id).iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// 节点及其后代的全部文本，空白折叠（不改变大小写）
    fn text(&self, id: NodeId) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let mut stack = vec![id];
        let mut visited = std::collections::HashSet::new();
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let own = self.own_text(current);
            if !own.trim().is_empty() {
                parts.push(own);
            }
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        parts
            .iter()
            .flat_map(|part| part.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn is_visible(&self, id: NodeId) -> bool {
        self.bounds(id).is_visible()
    }

    /// 类名列表
    fn class_list(&self, id: NodeId) -> Vec<&str> {
        self.attr(id, "class")
            .map(|class| class.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// 匹配任一选择器的全部节点，去重并保持文档顺序
    fn query_all(&self, selectors: &[Selector]) -> Vec<NodeId> {
        self.traverse()
            .into_iter()
            .filter(|&id| selectors.iter().any(|selector| selector.matches(self, id)))
            .collect()
    }

    /// 按选择器列表顺序，返回第一个有匹配的选择器的第一个节点
    fn query_first(&self, selectors: &[Selector]) -> Option<NodeId> {
        let order = self.traverse();
        selectors.iter().find_map(|selector| {
            order
                .iter()
                .copied()
                .find(|&id| selector.matches(self, id))
        })
    }

    /// 与 `query_first` 相同顺序，但逐个产出所有候选（选择器优先，其次文档顺序）
    fn query_ordered(&self, selectors: &[Selector]) -> Vec<NodeId> {
        let order = self.traverse();
        let mut seen = std::collections::HashSet::new();
        let mut result = Vec::new();
        for selector in selectors {
            for &id in &order {
                if selector.matches(self, id) && seen.insert(id) {
                    result.push(id);
                }
            }
        }
        result
    }
}
