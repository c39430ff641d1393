//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责长时间运行的观察循环，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! page_watcher (观察循环：轮询 → 去抖 → 闸门)
//!     ↓
//! workflow::LearningSession (处理一次页面状态)
//!     ↓
//! workflow::FeedbackTracker (题目 / 反馈状态机)
//!     ↓
//! services (能力层：定位 / 提取 / 识别 / 提示)
//!     ↓
//! infrastructure (基础设施：JsExecutor)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层持有 Browser 和 JsExecutor
//! 2. **向下依赖**：编排层 → workflow → services → dom
//! 3. **无业务逻辑**：只做调度，不做具体业务判断

pub mod page_watcher;

pub use page_watcher::PageWatcher;
