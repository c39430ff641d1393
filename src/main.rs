use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use word_learner::config::Config;
use word_learner::orchestrator::PageWatcher;
use word_learner::store::{JsonFileRepository, WordStore};
use word_learner::utils::logging;

/// 被动观察网页练习并积累词对
#[derive(Parser, Debug)]
#[command(name = "word-learner", version, about)]
struct Cli {
    /// TOML 配置文件
    #[arg(short, long, env = "WL_CONFIG", default_value = "word_learner.toml")]
    config: PathBuf,

    /// 词库 JSON 文件（覆盖配置）
    #[arg(long)]
    db: Option<String>,

    /// 显示详细日志
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 连接浏览器并观察练习页面（默认）
    Watch {
        /// 要附加的页面 URL 片段
        #[arg(long)]
        url: Option<String>,
        /// 浏览器调试端口
        #[arg(long)]
        port: Option<u16>,
    },
    /// 查询一个词
    Lookup { word: String },
    /// 显示词库统计
    Stats,
    /// 导出词库到 JSON 文件
    Export { path: PathBuf },
    /// 从 JSON 文件导入词库
    Import { path: PathBuf },
    /// 清空词库
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::load(Some(cli.config.as_path())).context("加载配置失败")?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logging::init(config.verbose_logging);

    match cli.command.unwrap_or(Command::Watch {
        url: None,
        port: None,
    }) {
        Command::Watch { url, port } => {
            if url.is_some() {
                config.target_url = url;
            }
            if let Some(port) = port {
                config.browser_debug_port = port;
            }
            PageWatcher::initialize(config).await?.run().await?;
        }
        Command::Lookup { word } => {
            let store = open_store(&config).await;
            match store.lookup(&word) {
                Some(found) => println!("{} → {}", word, found.join(", ")),
                None => println!("{}: 未找到", word),
            }
        }
        Command::Stats => {
            let store = open_store(&config).await;
            logging::print_stats(&store.stats());
        }
        Command::Export { path } => {
            let store = open_store(&config).await;
            std::fs::write(&path, store.export_all())
                .with_context(|| format!("写入 {} 失败", path.display()))?;
            info!("📤 已导出 {} 个词条到 {}", store.stats().keys, path.display());
        }
        Command::Import { path } => {
            let mut store = open_store(&config).await;
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("读取 {} 失败", path.display()))?;
            let added = store.import_all(&content);
            store.flush().await.context("保存词库失败")?;
            println!("新增 {} 个词对", added);
        }
        Command::Clear => {
            let mut store = open_store(&config).await;
            store.clear();
            store.flush().await.context("保存词库失败")?;
        }
    }

    Ok(())
}

async fn open_store(config: &Config) -> WordStore {
    WordStore::load(Arc::new(JsonFileRepository::new(&config.database_path))).await
}
