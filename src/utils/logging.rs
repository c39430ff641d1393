/// 日志工具模块
///
/// 负责 tracing 订阅器初始化以及启动 / 结束横幅输出
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::StoreStats;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info。
/// 重复调用是安全的（测试中会多次初始化）
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `database_path`: 词库文件路径
/// - `debounce_ms`: 防抖间隔
pub fn log_startup(database_path: &str, debounce_ms: u64) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - 页面观察学习模式 ({})",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📁 词库文件: {}", database_path);
    info!("⏱️ 防抖间隔: {} ms", debounce_ms);
    info!("{}", "=".repeat(60));
}

/// 打印词库统计信息
pub fn print_stats(stats: &StoreStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 词库统计");
    info!("{}", "=".repeat(60));
    info!("📚 词条数: {}", stats.keys);
    info!("🔤 译文总数: {}", stats.translations);
    info!("✅ 本次会话新增: {}", stats.words_indexed);
    info!("💡 已提示次数: {}", stats.answers_helped);
    info!(
        "🕒 会话开始: {}",
        stats.session_start.format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}
