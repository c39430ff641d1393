use serde::{Deserialize, Serialize};

/// 用户开关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// 选择题中高亮已知答案
    pub auto_highlight: bool,
    /// 显示提示
    pub show_hints: bool,
    /// 填写题中自动填入已知答案
    pub auto_answer: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_highlight: true,
            show_hints: true,
            auto_answer: false,
        }
    }
}
