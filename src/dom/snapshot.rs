//! 页面快照
//!
//! 浏览器端脚本把 DOM 压平成节点数组（先序，下标 0 为根），这里反序列化并实现 `PageTree`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::tree::{Bounds, NodeId, PageTree};
use crate::error::AppResult;

fn default_font_size() -> f64 {
    16.0
}

fn default_viewport_height() -> f64 {
    800.0
}

/// 快照中的单个元素节点
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotNode {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// 自身直接文本
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub bounds: Bounds,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub focused: bool,
}

impl SnapshotNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            text: String::new(),
            children: Vec::new(),
            bounds: Bounds::default(),
            font_size: default_font_size(),
            value: None,
            focused: false,
        }
    }
}

/// 页面快照
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    nodes: Vec<SnapshotNode>,
    #[serde(default = "default_viewport_height")]
    viewport_height: f64,
    #[serde(skip)]
    parents: Vec<Option<NodeId>>,
}

impl Snapshot {
    /// 由节点数组构建快照
    ///
    /// 越界的子节点引用会被丢弃；每个节点只保留第一个父节点，
    /// 重复引用和会形成环的引用一并丢弃，父链因此总能走到尽头
    pub fn new(mut nodes: Vec<SnapshotNode>, viewport_height: f64) -> Self {
        let len = nodes.len();
        let mut dropped = 0usize;
        for node in nodes.iter_mut() {
            let before = node.children.len();
            node.children.retain(|&child| child < len);
            dropped += before - node.children.len();
            node.tag.make_ascii_lowercase();
        }
        if dropped > 0 {
            debug!("快照中丢弃了 {} 个越界子节点引用", dropped);
        }

        let mut parents: Vec<Option<NodeId>> = vec![None; len];
        for (id, node) in nodes.iter().enumerate() {
            for &child in &node.children {
                if parents[child].is_none() && !is_ancestor_or_self(&parents, child, id) {
                    parents[child] = Some(id);
                }
            }
        }

        let mut unlinked = 0usize;
        for (id, node) in nodes.iter_mut().enumerate() {
            let before = node.children.len();
            let mut kept = Vec::with_capacity(before);
            for &child in &node.children {
                if parents[child] == Some(id) && !kept.contains(&child) {
                    kept.push(child);
                }
            }
            unlinked += before - kept.len();
            node.children = kept;
        }
        if unlinked > 0 {
            debug!("快照中丢弃了 {} 个重复或成环的子节点引用", unlinked);
        }

        Self {
            nodes,
            viewport_height,
            parents,
        }
    }

    /// 从浏览器脚本返回的 JSON 解析
    pub fn from_json(value: serde_json::Value) -> AppResult<Self> {
        let raw: Snapshot = serde_json::from_value(value)?;
        Ok(Self::new(raw.nodes, raw.viewport_height))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&SnapshotNode> {
        self.nodes.get(id)
    }

    /// 页面上可见文本的总长度（用于变化幅度判断）
    pub fn visible_text_len(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.bounds.is_visible())
            .map(|node| node.text.trim().chars().count())
            .sum()
    }
}

impl PageTree for Snapshot {
    fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id).copied().flatten()
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    fn tag(&self, id: NodeId) -> &str {
        self.nodes.get(id).map(|node| node.tag.as_str()).unwrap_or("")
    }

    fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(id)
            .and_then(|node| node.attrs.get(name))
            .map(String::as_str)
    }

    fn own_text(&self, id: NodeId) -> &str {
        self.nodes.get(id).map(|node| node.text.as_str()).unwrap_or("")
    }

    fn bounds(&self, id: NodeId) -> Bounds {
        self.nodes.get(id).map(|node| node.bounds).unwrap_or_default()
    }

    fn font_size(&self, id: NodeId) -> f64 {
        self.nodes
            .get(id)
            .map(|node| node.font_size)
            .unwrap_or_else(default_font_size)
    }

    fn input_value(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).and_then(|node| node.value.as_deref())
    }

    fn is_focused(&self, id: NodeId) -> bool {
        self.nodes.get(id).map_or(false, |node| node.focused)
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }
}

/// 测试 / 离线场景下手工构建快照
///
/// 新节点默认可见：纵向依次排列，每个 100x20
pub struct SnapshotBuilder {
    nodes: Vec<SnapshotNode>,
    viewport_height: f64,
    next_y: f64,
}

impl SnapshotBuilder {
    /// 创建只含 `body` 根节点的构建器
    pub fn new() -> Self {
        let mut body = SnapshotNode::new("body");
        body.bounds = Bounds::new(0.0, 0.0, 1280.0, 800.0);
        Self {
            nodes: vec![body],
            viewport_height: default_viewport_height(),
            next_y: 10.0,
        }
    }

    pub fn viewport_height(mut self, height: f64) -> Self {
        self.viewport_height = height;
        self
    }

    /// 追加子元素，返回新节点编号
    pub fn element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> NodeId {
        let mut node = SnapshotNode::new(tag);
        for (name, value) in attrs {
            node.attrs.insert(name.to_string(), value.to_string());
        }
        node.text = text.to_string();
        node.bounds = Bounds::new(10.0, self.next_y, 100.0, 20.0);
        self.next_y += 24.0;

        let id = self.nodes.len();
        self.nodes.push(node);
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        id
    }

    /// 修改已有节点
    pub fn edit(&mut self, id: NodeId, f: impl FnOnce(&mut SnapshotNode)) -> &mut Self {
        if let Some(node) = self.nodes.get_mut(id) {
            f(node);
        }
        self
    }

    pub fn build(&self) -> Snapshot {
        Snapshot::new(self.nodes.clone(), self.viewport_height)
    }
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `candidate` 是否为 `node` 本身或其祖先
fn is_ancestor_or_self(parents: &[Option<NodeId>], candidate: NodeId, node: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(id) = current {
        if id == candidate {
            return true;
        }
        current = parents[id];
    }
    false
}
