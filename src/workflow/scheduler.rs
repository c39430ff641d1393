//! 处理节奏控制
//!
//! 页面变化先经过尾随去抖，安静期结束后再经过闸门：
//! - 第一次处理总是放行
//! - 距上次处理太近 → 推迟到间隔满足
//! - 可见文本长度变化太小 → 丢弃
//!
//! 两者都是纯逻辑，时间由调用方传入，便于测试

use std::time::{Duration, Instant};

/// 尾随去抖：每次触发都把截止时间推后，安静期结束后只触发一次
#[derive(Debug, Clone)]
pub struct TrailingDebounce {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl TrailingDebounce {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// 记录一次变化，替换之前的截止时间
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// 指定截止时间（闸门推迟时使用）
    pub fn trigger_at(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// 截止时间已到则消费并返回 true
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// 闸门判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// 执行处理
    Run,
    /// 距上次处理太近，等待给定时长后再试
    Defer(Duration),
    /// 变化太小，丢弃
    Skip,
}

/// 处理闸门
#[derive(Debug, Clone)]
pub struct PassGate {
    min_interval: Duration,
    min_text_delta: usize,
    last_pass: Option<Instant>,
    last_text_len: usize,
}

impl PassGate {
    /// # 参数
    /// - `min_interval`: 两次处理之间的最小间隔
    /// - `min_text_delta`: 可见文本长度的最小变化量
    pub fn new(min_interval: Duration, min_text_delta: usize) -> Self {
        Self {
            min_interval,
            min_text_delta,
            last_pass: None,
            last_text_len: 0,
        }
    }

    /// 判定是否执行本次处理；只有 `Run` 会更新参照值
    pub fn check(&mut self, now: Instant, text_len: usize) -> GateDecision {
        let Some(last_pass) = self.last_pass else {
            self.admit(now, text_len);
            return GateDecision::Run;
        };

        let elapsed = now.saturating_duration_since(last_pass);
        if elapsed < self.min_interval {
            return GateDecision::Defer(self.min_interval - elapsed);
        }

        if text_len.abs_diff(self.last_text_len) < self.min_text_delta {
            return GateDecision::Skip;
        }

        self.admit(now, text_len);
        GateDecision::Run
    }

    /// 清空参照值，下一次处理必定放行
    pub fn reset(&mut self) {
        self.last_pass = None;
        self.last_text_len = 0;
    }

    fn admit(&mut self, now: Instant, text_len: usize) {
        self.last_pass = Some(now);
        self.last_text_len = text_len;
    }
}
