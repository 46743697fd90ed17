pub mod samples;

use serde::{Deserialize, Serialize};
use crate::tools::ToolId;
use crate::utils::BenchResult;

pub use samples::{SampleCatalog, SampleKind};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub evaluation: EvaluationConfig,
    pub benchmarks: Benchmarks,
    pub tools: Vec<ToolCommand>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub samples_dir: String,
    pub outputs_dir: String,
    pub report_dir: String,
    /// 单个样例转换的超时时间
    pub timeout_secs: u64,
}

/// 客观评分使用的基准值
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Benchmarks {
    pub min_compression_ratio: f64,
    pub ideal_compression_ratio: f64,
    pub min_content_density: f64,
    pub ideal_content_density: f64,
    /// 未检测到图片但文件超过该大小时给一半分
    pub image_size_threshold_bytes: u64,
    /// 表单样例被转为文本时的最小文本长度
    pub substantial_text_chars: usize,
}

/// 外部转换工具命令
///
/// `args` 与 `emits` 中可使用 `{input}` `{output}` `{outdir}` `{stem}` 占位符。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolCommand {
    pub id: ToolId,
    pub program: String,
    pub args: Vec<String>,
    /// 工具自行决定输出文件名时，其实际写出的路径
    #[serde(default)]
    pub emits: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl AppConfig {
    /// 读取 `config/settings.toml`，再叠加 `PDFBENCH__*` 环境变量
    pub fn load() -> BenchResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/settings").required(false))
            .add_source(config::Environment::with_prefix("PDFBENCH").separator("__"))
            .build()?;

        let mut config: AppConfig = settings.try_deserialize()?;
        if config.tools.is_empty() {
            config.tools = default_tools();
        }
        Ok(config)
    }

    pub fn save(&self, path: &str) -> BenchResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn enabled_tools(&self) -> Vec<&ToolCommand> {
        self.tools.iter().filter(|t| t.enabled).collect()
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            samples_dir: "test_data/samples".to_string(),
            outputs_dir: "test_data/outputs".to_string(),
            report_dir: "output".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for Benchmarks {
    fn default() -> Self {
        Self {
            min_compression_ratio: 0.001,
            ideal_compression_ratio: 0.02,
            min_content_density: 0.0001,
            ideal_content_density: 0.01,
            image_size_threshold_bytes: 50_000,
            substantial_text_chars: 100,
        }
    }
}

pub fn default_tools() -> Vec<ToolCommand> {
    let args = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    vec![
        ToolCommand {
            id: ToolId::WeasyPrint,
            program: "weasyprint".to_string(),
            args: args(&["{input}", "{output}"]),
            emits: None,
            enabled: true,
        },
        ToolCommand {
            id: ToolId::Playwright,
            program: "chromium".to_string(),
            args: args(&[
                "--headless",
                "--disable-gpu",
                "--no-pdf-header-footer",
                "--print-to-pdf={output}",
                "file://{input}",
            ]),
            emits: None,
            enabled: true,
        },
        ToolCommand {
            id: ToolId::LibreOffice,
            program: "soffice".to_string(),
            args: args(&["--headless", "--convert-to", "pdf", "--outdir", "{outdir}", "{input}"]),
            emits: Some("{outdir}/{stem}.pdf".to_string()),
            enabled: true,
        },
    ]
}
