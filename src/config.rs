use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// 程序配置
///
/// 加载顺序：默认值 → TOML 配置文件（可选）→ `WL_*` 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 要附加的页面 URL（包含匹配）；找不到时打开该地址
    pub target_url: Option<String>,
    /// 词库 JSON 文件
    pub database_path: String,
    /// 页面变化后的安静期（毫秒）
    pub debounce_ms: u64,
    /// 两次处理之间的最小间隔（毫秒）
    pub min_pass_interval_ms: u64,
    /// 可见文本长度的最小变化量
    pub min_text_delta: usize,
    /// 页面变化轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 题目定位的兜底选择器
    pub question_selectors: Vec<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 2001,
            target_url: None,
            database_path: "word_learner.json".to_string(),
            debounce_ms: 400,
            min_pass_interval_ms: 1000,
            min_text_delta: 5,
            poll_interval_ms: 250,
            question_selectors: Vec::new(),
            verbose_logging: false,
        }
    }
}

/// 读取并解析一个环境变量；未设置时返回 None
fn env_var<T: FromStr>(name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match std::env::var(name) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| AppError::Config {
            var_name: name.to_string(),
            value,
            expected_type: expected_type.to_string(),
        }),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// 从 TOML 文件读取，缺省字段使用默认值
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    fn from_toml_str(content: &str, origin: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| AppError::toml_parse_failed(origin, e))
    }

    /// 默认值 + 环境变量
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env_overrides()
    }

    /// 完整加载：配置文件存在时先读文件，再叠加环境变量
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };
        base.with_env_overrides()
    }

    /// 用 `WL_*` 环境变量覆盖已有值
    pub fn with_env_overrides(mut self) -> AppResult<Self> {
        if let Some(port) = env_var("WL_BROWSER_DEBUG_PORT", "u16")? {
            self.browser_debug_port = port;
        }
        if let Ok(url) = std::env::var("WL_TARGET_URL") {
            self.target_url = Some(url).filter(|url| !url.trim().is_empty());
        }
        if let Ok(path) = std::env::var("WL_DATABASE_PATH") {
            self.database_path = path;
        }
        if let Some(ms) = env_var("WL_DEBOUNCE_MS", "u64")? {
            self.debounce_ms = ms;
        }
        if let Some(ms) = env_var("WL_MIN_PASS_INTERVAL_MS", "u64")? {
            self.min_pass_interval_ms = ms;
        }
        if let Some(delta) = env_var("WL_MIN_TEXT_DELTA", "usize")? {
            self.min_text_delta = delta;
        }
        if let Some(ms) = env_var("WL_POLL_INTERVAL_MS", "u64")? {
            self.poll_interval_ms = ms;
        }
        if let Ok(selectors) = std::env::var("WL_QUESTION_SELECTORS") {
            self.question_selectors = selectors
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(verbose) = env_var("WL_VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = verbose;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.browser_debug_port, 2001);
        assert_eq!(config.debounce_ms, 400);
        assert_eq!(config.min_pass_interval_ms, 1000);
        assert!(config.target_url.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r##"
                browser_debug_port = 9222
                question_selectors = [".prompt", "#word"]
            "##,
            "inline",
        )
        .unwrap();

        assert_eq!(config.browser_debug_port, 9222);
        assert_eq!(config.question_selectors, vec![".prompt", "#word"]);
        assert_eq!(config.debounce_ms, 400);
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let err = Config::from_toml_str("debounce_ms = \"soon\"", "broken.toml").unwrap_err();
        assert!(matches!(err, AppError::Toml { ref path, .. } if path == "broken.toml"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_path = \"words.json\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.database_path, "words.json");
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/word_learner.toml"))).unwrap();
        assert_eq!(config.poll_interval_ms, Config::default().poll_interval_ms);
    }
}
