//! 页面树抽象层
//!
//! - `tree` - `PageTree` 能力接口（遍历、选择器查询、可见性）
//! - `snapshot` - 浏览器快照 / 测试夹具的统一实现
//! - `selector` - CSS 选择器子集（nom 解析）
//! - `patterns` - 各启发式使用的固定选择器列表

pub mod patterns;
pub mod selector;
pub mod snapshot;
pub mod tree;

pub use selector::Selector;
pub use snapshot::{Snapshot, SnapshotBuilder, SnapshotNode};
pub use tree::{Bounds, NodeId, PageTree};
