//! # Word Learner
//!
//! 被动观察网页练习、自动积累词对的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供 eval() / 快照抓取 / 页面写操作
//! - `dom/` - `PageTree` 能力接口、快照实现、CSS 选择器子集
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只读取节点树
//! - `TextScorer` - 定位当前题目
//! - `AnswerExtractor` - 反馈出现后恢复答案
//! - `ExerciseClassifier` - 识别练习模式
//! - `is_ui_text` - 界面文本过滤
//! - `store/` - 双向词库与持久化约定
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次页面处理"的完整流程
//! - `FeedbackTracker` - 题目 / 反馈状态机
//! - `LearningSession` - 识别 → 跟踪 → 收录 → 提示
//! - `TrailingDebounce` / `PassGate` - 处理节奏控制
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/page_watcher` - 观察循环，管理浏览器资源
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod dom;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod store;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_browser_and_page;
pub use config::Config;
pub use dom::{PageTree, Snapshot, SnapshotBuilder};
pub use error::{AppError, AppResult};
pub use infrastructure::JsExecutor;
pub use models::{ExerciseMode, LearnEvent, LearnKind, PageAction, Settings};
pub use orchestrator::PageWatcher;
pub use services::{is_ui_text, AnswerExtractor, ExerciseClassifier, TextScorer};
pub use store::{JsonFileRepository, WordStore};
pub use workflow::{FeedbackTracker, LearningSession, PassOutcome};
