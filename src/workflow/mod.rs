//! 流程层（Workflow Layer）
//!
//! - `feedback_tracker` - 题目 / 反馈状态机
//! - `learning_session` - 一次页面处理的完整顺序
//! - `scheduler` - 去抖与处理闸门

pub mod feedback_tracker;
pub mod learning_session;
pub mod scheduler;

pub use feedback_tracker::{FeedbackTracker, TrackerState};
pub use learning_session::{LearningSession, PassOutcome};
pub use scheduler::{GateDecision, PassGate, TrailingDebounce};
