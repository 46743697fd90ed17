pub mod command;

pub use command::CommandConverter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::tools::ToolId;

/// 一次样例转换的结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionOutcome {
    pub success: bool,
    /// 耗时(秒)
    pub time: f64,
    /// 输出文件大小(字节)
    pub file_size: u64,
    pub file_path: String,
    pub error: String,
}

impl ConversionOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }
}

/// HTML转PDF转换器
///
/// 实现者不得向上抛出错误，所有失败都记录在 `ConversionOutcome` 中。
#[async_trait]
pub trait Converter: Send + Sync {
    fn tool(&self) -> ToolId;

    /// 转换单个样例，输出写入 `output_dir/{stem}_{suffix}.pdf`
    async fn convert(&self, input: &Path, output_dir: &Path) -> ConversionOutcome;
}
