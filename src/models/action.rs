use chrono::{DateTime, Local};
use serde::Serialize;

use crate::dom::NodeId;

/// 学习事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LearnKind {
    /// 回答正确
    Correct,
    /// 回答错误后页面公布了正确答案
    Correction,
}

/// 一次 (题目, 答案) 的提交
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearnEvent {
    pub kind: LearnKind,
    pub question: String,
    pub answer: String,
    /// 是否真正写入了词库（重复或被过滤时为 false）
    pub stored: bool,
    pub at: DateTime<Local>,
}

/// 请求渲染层执行的页面写操作
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PageAction {
    /// 高亮节点
    Highlight { node: NodeId },
    /// 向输入框写入文本
    SetInputValue { node: NodeId, text: String },
}
