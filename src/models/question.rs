use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::utils::normalize;

/// 练习模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExerciseMode {
    /// 选择题
    Selection,
    /// 填写 / 拼写
    Typing,
    /// 游戏
    Game,
    /// 测验
    Test,
    /// 词汇表
    Vocabulary,
    /// 无法识别
    None,
}

impl ExerciseMode {
    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            ExerciseMode::Selection => "选择",
            ExerciseMode::Typing => "填写",
            ExerciseMode::Game => "游戏",
            ExerciseMode::Test => "测验",
            ExerciseMode::Vocabulary => "词汇表",
            ExerciseMode::None => "未识别",
        }
    }
}

impl std::fmt::Display for ExerciseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 当前正在等待反馈的题目
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRecord {
    /// 页面上的原始文本
    pub text: String,
    /// 归一化后的键
    pub key: String,
    /// 发现时间
    pub discovered_at: DateTime<Local>,
    /// 发现时的练习模式
    pub mode: ExerciseMode,
}

impl QuestionRecord {
    pub fn new(text: impl Into<String>, mode: ExerciseMode) -> Self {
        let text = text.into();
        Self {
            key: normalize(&text),
            text,
            discovered_at: Local::now(),
            mode,
        }
    }
}

impl std::fmt::Display for QuestionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let preview = crate::utils::truncate_text(&self.text, 40);
        write!(f, "「{}」[{}]", preview, self.mode)
    }
}
