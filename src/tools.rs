use serde::{Deserialize, Serialize};
use std::fmt;

/// 参与评估的三个HTML转PDF工具
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolId {
    WeasyPrint,
    Playwright,
    LibreOffice,
}

/// 工具能力档案：替代按工具名字符串分支的写法
#[derive(Debug, Clone, PartialEq)]
pub struct ToolProfile {
    pub id: ToolId,
    pub display_name: &'static str,
    /// 输出文件名中可识别该工具的别名 (不区分大小写)
    pub aliases: &'static [&'static str],
    /// 输出文件名后缀: `{sample}_{suffix}.pdf`
    pub file_suffix: &'static str,
    pub functionality_multiplier: f64,
    pub customization_score: f64,
}

impl ToolId {
    pub const ALL: [ToolId; 3] = [ToolId::WeasyPrint, ToolId::Playwright, ToolId::LibreOffice];

    pub fn profile(self) -> ToolProfile {
        match self {
            ToolId::WeasyPrint => ToolProfile {
                id: self,
                display_name: "WeasyPrint",
                aliases: &["weasyprint"],
                file_suffix: "weasyprint",
                functionality_multiplier: 0.9,
                customization_score: 75.0,
            },
            ToolId::Playwright => ToolProfile {
                id: self,
                display_name: "Playwright",
                aliases: &["playwright"],
                file_suffix: "playwright",
                functionality_multiplier: 1.1,
                customization_score: 85.0,
            },
            ToolId::LibreOffice => ToolProfile {
                id: self,
                display_name: "LibreOffice",
                aliases: &["soffice", "libreoffice"],
                file_suffix: "soffice",
                functionality_multiplier: 0.8,
                customization_score: 60.0,
            },
        }
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().display_name)
    }
}

impl ToolProfile {
    /// 文件名是否属于该工具的输出
    pub fn matches_file(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        self.aliases.iter().any(|alias| lower.contains(&alias.to_lowercase()))
    }

    pub fn output_file_name(&self, sample_stem: &str) -> String {
        format!("{}_{}.pdf", sample_stem, self.file_suffix)
    }
}
