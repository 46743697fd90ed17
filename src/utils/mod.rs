pub mod logger;

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("配置错误: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML序列化错误: {0}")]
    TomlError(#[from] toml::ser::Error),

    #[error("转换失败: {0}")]
    ConversionError(String),

    #[error("转换超时: {0:?}")]
    Timeout(Duration),
}

pub type BenchResult<T> = Result<T, BenchError>;
