//! 页面观察器 - 编排层
//!
//! ## 职责
//!
//! 本模块是 `watch` 命令的入口，负责观察循环和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、加载词库、连接浏览器、创建 JsExecutor
//! 2. **变化检测**：轮询页面可见文本长度，变化时触发去抖
//! 3. **节奏控制**：去抖结束后经过闸门，决定执行 / 推迟 / 丢弃
//! 4. **单次处理**：抓取快照交给 `LearningSession`，执行返回的页面写操作
//! 5. **退出清理**：Ctrl+C 后保存词库并输出统计
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 Browser 的模块
//! - **向下委托**：业务判断全部在 workflow / services 中完成

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::infrastructure::JsExecutor;
use crate::services::TextScorer;
use crate::store::{JsonFileRepository, WordStore};
use crate::utils::logging::{log_startup, print_stats};
use crate::workflow::{GateDecision, LearningSession, PassGate, TrailingDebounce};

/// 页面观察器
pub struct PageWatcher {
    config: Config,
    _browser: Browser,
    executor: JsExecutor,
    session: LearningSession,
    /// 最近一次显示的提示，避免重复输出
    last_hint: Option<String>,
}

impl PageWatcher {
    /// 初始化观察器
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config.database_path, config.debounce_ms);

        // 加载词库
        let repository = Arc::new(JsonFileRepository::new(&config.database_path));
        let store = WordStore::load(repository).await;

        // 连接浏览器
        let (browser, page) = browser::connect_to_browser_and_page(
            config.browser_debug_port,
            config.target_url.as_deref(),
        )
        .await
        .context("连接浏览器失败")?;

        // 创建 JsExecutor（持有 page）
        let executor = JsExecutor::new(page);
        let session = LearningSession::new(store, TextScorer::new(config.question_selectors.as_slice()));

        Ok(Self {
            config,
            _browser: browser,
            executor,
            session,
            last_hint: None,
        })
    }

    /// 运行观察循环，直到收到 Ctrl+C
    pub async fn run(mut self) -> Result<()> {
        let mut debounce = TrailingDebounce::new(Duration::from_millis(self.config.debounce_ms));
        let mut gate = PassGate::new(
            Duration::from_millis(self.config.min_pass_interval_ms),
            self.config.min_text_delta,
        );
        let mut ticker =
            tokio::time::interval(Duration::from_millis(self.config.poll_interval_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut last_text_len: Option<usize> = None;
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        info!("👀 开始观察页面，按 Ctrl+C 退出");

        loop {
            let deadline = debounce.deadline();
            tokio::select! {
                _ = &mut shutdown => {
                    info!("🛑 收到退出信号");
                    break;
                }
                _ = ticker.tick() => {
                    match self.executor.visible_text_len().await {
                        Ok(len) if last_text_len != Some(len) => {
                            last_text_len = Some(len);
                            debounce.trigger(Instant::now());
                        }
                        Ok(_) => {}
                        Err(e) => warn!("⚠️ 读取页面状态失败: {}", e),
                    }
                }
                _ = wait_until(deadline), if deadline.is_some() => {
                    let now = Instant::now();
                    if !debounce.fire(now) {
                        continue;
                    }
                    match gate.check(now, last_text_len.unwrap_or(0)) {
                        GateDecision::Run => {
                            if let Err(e) = self.run_pass().await {
                                error!("❌ 处理页面失败: {:#}", e);
                            }
                        }
                        GateDecision::Defer(wait) => {
                            debug!("距上次处理过近，推迟 {:?}", wait);
                            debounce.trigger_at(now + wait);
                        }
                        GateDecision::Skip => debug!("页面变化过小，跳过本次处理"),
                    }
                }
            }
        }

        self.finish().await
    }

    /// 执行一次处理
    async fn run_pass(&mut self) -> Result<()> {
        let snapshot = self
            .executor
            .capture_snapshot()
            .await
            .context("抓取页面快照失败")?;
        let outcome = self.session.process(&snapshot);

        for action in &outcome.assistance.actions {
            match self.executor.apply(action).await {
                Ok(true) => debug!("已执行页面操作: {:?}", action),
                Ok(false) => debug!("页面操作的目标节点已不存在: {:?}", action),
                Err(e) => warn!("⚠️ 页面操作失败: {}", e),
            }
        }

        if let Some(hint) = outcome.assistance.hint {
            if self.last_hint.as_deref() != Some(hint.as_str()) {
                info!("💡 提示: {}", hint);
                if let Err(e) = self.executor.show_hint(&hint).await {
                    warn!("⚠️ 显示提示失败: {}", e);
                }
                self.last_hint = Some(hint);
            }
        }

        Ok(())
    }

    /// 保存词库并输出统计
    async fn finish(self) -> Result<()> {
        let store = self.session.store();
        store.flush().await.context("保存词库失败")?;
        print_stats(&store.stats());
        Ok(())
    }
}

/// 等待到截止时间；没有截止时间时永不完成
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
