//! 统一错误处理 for StreamFuse
//!
//! - 重写错误使用 `#[from]` 注解自动转换，保留完整错误信息
//! - 外部错误（IO、TOML、JSON、正则、日志）使用自定义 `From` 实现转换为字符串，降低模块耦合
//! - `FuseResult<T>` 提供统一的返回类型

use thiserror::Error;

use crate::planner::rewrite::RewriteError;

/// 统一的错误类型
#[derive(Error, Debug)]
pub enum FuseError {
    #[error("重写错误: {0}")]
    Rewrite(#[from] RewriteError),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO错误: {0}")]
    Io(String),

    #[error("日志错误: {0}")]
    Logging(String),
}

impl FuseError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// 统一的结果类型
pub type FuseResult<T> = Result<T, FuseError>;

impl From<std::io::Error> for FuseError {
    fn from(e: std::io::Error) -> Self {
        FuseError::Io(e.to_string())
    }
}

impl From<toml::de::Error> for FuseError {
    fn from(e: toml::de::Error) -> Self {
        FuseError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for FuseError {
    fn from(e: toml::ser::Error) -> Self {
        FuseError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for FuseError {
    fn from(e: serde_json::Error) -> Self {
        FuseError::Io(format!("JSON 序列化失败: {}", e))
    }
}

impl From<regex::Error> for FuseError {
    fn from(e: regex::Error) -> Self {
        FuseError::Config(format!("无效的效应模式: {}", e))
    }
}

impl From<flexi_logger::FlexiLoggerError> for FuseError {
    fn from(e: flexi_logger::FlexiLoggerError) -> Self {
        FuseError::Logging(e.to_string())
    }
}
