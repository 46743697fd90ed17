use serde::{Deserialize, Serialize};
use anyhow::Result;
use std::path::PathBuf;

/// 样例测试类别标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleKind {
    Chinese,
    SpecialChars,
    Form,
    /// SVG、图片等图形内容
    Graphics,
    LongDocument,
    PrintStyles,
}

impl SampleKind {
    /// 文件名中代表该类别的标记子串
    pub fn markers(self) -> &'static [&'static str] {
        match self {
            SampleKind::Chinese => &["chinese"],
            SampleKind::SpecialChars => &["special"],
            SampleKind::Form => &["forms"],
            SampleKind::Graphics => &["svg", "base", "complex"],
            SampleKind::LongDocument => &["long_document"],
            SampleKind::PrintStyles => &["print_styles"],
        }
    }

    const ALL: [SampleKind; 6] = [
        SampleKind::Chinese,
        SampleKind::SpecialChars,
        SampleKind::Form,
        SampleKind::Graphics,
        SampleKind::LongDocument,
        SampleKind::PrintStyles,
    ];

    /// 从文件名标记推导类别 (目录中未登记的文件使用)
    pub fn from_markers(filename: &str) -> Vec<SampleKind> {
        let lower = filename.to_lowercase();
        Self::ALL
            .into_iter()
            .filter(|kind| {
                kind.markers()
                    .iter()
                    .any(|marker| match kind {
                        // page-count markers are case-sensitive
                        SampleKind::LongDocument | SampleKind::PrintStyles => filename.contains(marker),
                        _ => lower.contains(marker),
                    })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Sample {
    /// 样例HTML文件名，如 `chinese.html`
    pub name: String,
    pub description: String,
    /// 重要性权重 (1.0 ~ 1.8)
    pub weight: f64,
    #[serde(default)]
    pub kinds: Vec<SampleKind>,
    #[serde(default)]
    pub reference_text: String,
}

impl Sample {
    pub fn stem(&self) -> &str {
        self.name.strip_suffix(".html").unwrap_or(&self.name)
    }
}

/// 一个输出文件对应的样例标签
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleTags {
    pub kinds: Vec<SampleKind>,
}

impl SampleTags {
    pub fn has(&self, kind: SampleKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn expected_pages(&self) -> u32 {
        if self.has(SampleKind::LongDocument) {
            3
        } else if self.has(SampleKind::PrintStyles) {
            2
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SampleCatalog {
    pub samples: Vec<Sample>,
}

impl SampleCatalog {
    pub fn load() -> Result<Self> {
        let config_path = PathBuf::from("config/samples.toml");

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        let catalog: SampleCatalog = toml::from_str(&content)?;
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&Sample> {
        self.samples.iter().find(|s| s.name == name || s.stem() == name)
    }

    /// 样例权重，未登记的样例为 1.0
    pub fn weight(&self, name: &str) -> f64 {
        self.get(name).map(|s| s.weight).unwrap_or(1.0)
    }

    /// 按 `{sample_base}_{tool_suffix}.pdf` 约定解析输出文件的样例标签
    pub fn classify(&self, filename: &str) -> SampleTags {
        let base = sample_base_name(filename);
        match self.get(base) {
            Some(sample) => SampleTags { kinds: sample.kinds.clone() },
            None => SampleTags { kinds: SampleKind::from_markers(filename) },
        }
    }
}

/// `chinese_weasyprint.pdf` -> `chinese`
pub fn sample_base_name(filename: &str) -> &str {
    let stem = filename.strip_suffix(".pdf").unwrap_or(filename);
    match stem.rsplit_once('_') {
        Some((base, _tool)) => base,
        None => stem,
    }
}

impl Default for SampleCatalog {
    fn default() -> Self {
        let sample = |name: &str, description: &str, weight: f64, kinds: Vec<SampleKind>, reference: &str| Sample {
            name: name.to_string(),
            description: description.to_string(),
            weight,
            kinds,
            reference_text: reference.to_string(),
        };

        Self {
            samples: vec![
                sample(
                    "base.html",
                    "基础元素测试 - 文本、图片、表格",
                    1.0,
                    vec![SampleKind::Graphics],
                    "基础HTML页面测试内容，包含标题、段落、列表等基本元素。",
                ),
                sample(
                    "complex.html",
                    "复杂布局测试 - Grid布局、分页、阴影",
                    1.5,
                    vec![SampleKind::Graphics],
                    "复杂布局测试页面，包含多列布局、浮动元素、定位元素等复杂CSS样式。",
                ),
                sample(
                    "chinese.html",
                    "中文字体测试 - 中文排版和字体渲染",
                    1.2,
                    vec![SampleKind::Chinese],
                    "中文内容测试页面，包含各种中文字符、标点符号和特殊格式。测试中文字体渲染效果。",
                ),
                sample(
                    "dynamic.html",
                    "动态内容测试 - JavaScript生成内容",
                    1.8,
                    vec![],
                    "动态内容测试页面，包含JavaScript生成的内容和动态样式。",
                ),
                sample(
                    "svg.html",
                    "SVG图形测试 - 矢量图形渲染",
                    1.3,
                    vec![SampleKind::Graphics],
                    "SVG图形测试页面，包含各种SVG图形、图标和矢量图形元素。",
                ),
                sample(
                    "print_styles.html",
                    "打印样式测试 - @media print和@page规则",
                    1.1,
                    vec![SampleKind::PrintStyles],
                    "打印样式测试页面，包含专门的打印CSS样式和媒体查询。",
                ),
                sample(
                    "forms.html",
                    "表单元素测试 - 各种表单控件",
                    1.0,
                    vec![SampleKind::Form],
                    "表单元素测试页面，包含各种输入框、按钮、选择器等表单控件。",
                ),
                sample(
                    "long_document.html",
                    "长文档测试 - 多页分页效果",
                    1.2,
                    vec![SampleKind::LongDocument],
                    "长文档测试页面，包含大量文本内容、多个章节、目录等长文档特性。",
                ),
                sample(
                    "special_chars.html",
                    "特殊字符测试 - Unicode字符和符号",
                    1.0,
                    vec![SampleKind::SpecialChars],
                    "特殊字符测试页面，包含各种特殊符号、数学公式、emoji等特殊字符。",
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_strips_tool_suffix() {
        assert_eq!(sample_base_name("long_document_soffice.pdf"), "long_document");
        assert_eq!(sample_base_name("chinese_weasyprint.pdf"), "chinese");
        assert_eq!(sample_base_name("orphan.pdf"), "orphan");
    }

    #[test]
    fn catalog_tags_match_marker_heuristics() {
        let catalog = SampleCatalog::default();
        for sample in &catalog.samples {
            let filename = format!("{}_playwright.pdf", sample.stem());
            let mut from_catalog = catalog.classify(&filename).kinds;
            let mut from_markers = SampleKind::from_markers(&filename);
            from_catalog.sort_by_key(|k| format!("{:?}", k));
            from_markers.sort_by_key(|k| format!("{:?}", k));
            assert_eq!(from_catalog, from_markers, "sample {}", sample.name);
        }
    }

    #[test]
    fn unknown_files_fall_back_to_markers() {
        let catalog = SampleCatalog::default();
        let tags = catalog.classify("my_chinese_report_weasyprint.pdf");
        assert!(tags.has(SampleKind::Chinese));
        assert_eq!(tags.expected_pages(), 1);
    }

    #[test]
    fn expected_pages_follow_tags() {
        let catalog = SampleCatalog::default();
        assert_eq!(catalog.classify("long_document_soffice.pdf").expected_pages(), 3);
        assert_eq!(catalog.classify("print_styles_soffice.pdf").expected_pages(), 2);
        assert_eq!(catalog.classify("base_soffice.pdf").expected_pages(), 1);
    }

    #[test]
    fn weights_default_to_one_for_unknown_samples() {
        let catalog = SampleCatalog::default();
        assert_eq!(catalog.weight("dynamic.html"), 1.8);
        assert_eq!(catalog.weight("missing.html"), 1.0);
    }

    #[test]
    fn catalog_round_trips_through_toml() {
        let catalog = SampleCatalog::default();
        let text = toml::to_string_pretty(&catalog).unwrap();
        let parsed: SampleCatalog = toml::from_str(&text).unwrap();
        assert_eq!(parsed.samples.len(), 9);
        assert!(parsed.get("forms.html").unwrap().kinds.contains(&SampleKind::Form));
    }
}
