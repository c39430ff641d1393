use thiserror::Error;

/// 应用程序错误类型
///
/// 只在边界层（浏览器、持久化、配置）出现；核心启发式流程从不返回错误
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {reason}")]
    BrowserConnection { port: u16, reason: String },

    /// 页面脚本返回了无法识别的数据
    #[error("页面脚本返回异常: {0}")]
    Script(String),

    /// JSON 解析失败
    #[error("JSON解析失败: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// 文件读写失败
    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),

    /// 无效选择器
    #[error("无效选择器 '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// 配置错误
    #[error("配置错误: 环境变量 {var_name} 的值 '{value}' 无法转换为 {expected_type}")]
    Config {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(port: u16, reason: impl std::fmt::Display) -> Self {
        AppError::BrowserConnection {
            port,
            reason: reason.to_string(),
        }
    }

    /// 创建 TOML 解析错误
    pub fn toml_parse_failed(path: impl Into<String>, source: toml::de::Error) -> Self {
        AppError::Toml {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
