pub mod chars;
pub mod fonts;
pub mod forms;
pub mod images;
pub mod text;

#[cfg(test)]
pub(crate) mod fixtures;

pub use chars::CharClassifier;
pub use text::TextExtractor;

use anyhow::Result;
use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("无法读取文件: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF解析失败: {0}")]
    Parse(#[from] lopdf::Error),
}

/// 检测结论的可信程度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detection {
    /// 结构上找到了直接证据
    Confirmed,
    /// 通过间接特征推断
    Heuristic,
    #[default]
    Unknown,
}

/// 单个PDF文件的结构分析结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfAnalysisResult {
    pub file_path: String,
    /// 文件大小(字节)
    pub file_size: u64,
    /// 页数，0 表示分析失败
    pub page_count: u32,
    pub text_content: String,
    /// 文本长度(Unicode字符数)
    pub text_length: usize,
    pub has_images: bool,
    pub has_fonts: bool,
    pub font_count: u32,
    pub chinese_char_count: usize,
    pub special_char_count: usize,
    pub form_field_count: u32,
    /// 文本长度 / 文件大小
    pub content_density: f64,
    /// (文本长度 × 2) / 文件大小。
    ///
    /// 只是粗略的启发式指标，并非真实压缩比，图片或表单为主的PDF上没有明确物理含义。
    pub compression_ratio: f64,
    pub image_detection: Detection,
    pub font_detection: Detection,
    pub error_message: String,
}

impl PdfAnalysisResult {
    /// 分析失败时的结果：除文件大小外全部归零
    pub fn failed(file_path: &str, file_size: u64, error: impl Into<String>) -> Self {
        Self {
            file_path: file_path.to_string(),
            file_size,
            error_message: error.into(),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_message.is_empty() && self.file_size > 0
    }
}

/// 按样例对比各工具输出时的一行数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleComparison {
    pub file_size: u64,
    pub page_count: u32,
    pub text_length: usize,
    pub content_density: f64,
    pub has_images: bool,
    pub font_count: u32,
    pub chinese_char_count: usize,
    pub special_char_count: usize,
    pub compression_ratio: f64,
    pub error: String,
}

/// PDF结构分析器
pub struct PdfAnalyzer {
    text_extractor: TextExtractor,
    classifier: CharClassifier,
}

impl PdfAnalyzer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            text_extractor: TextExtractor::new(),
            classifier: CharClassifier::new()?,
        })
    }

    /// 分析PDF文件，提取客观指标。任何内部错误都记录在 `error_message` 中，不会向上抛出
    pub fn analyze(&self, file_path: &Path) -> PdfAnalysisResult {
        let path_str = file_path.to_string_lossy().to_string();
        let file_size = std::fs::metadata(file_path).map(|m| m.len()).unwrap_or(0);

        match self.inspect(file_path, &path_str, file_size) {
            Ok(result) => {
                debug!(
                    "分析完成 {}: {} 页, {} 字符, {} 字体",
                    path_str, result.page_count, result.text_length, result.font_count
                );
                result
            }
            Err(e) => {
                warn!("PDF分析失败 {}: {}", path_str, e);
                PdfAnalysisResult::failed(&path_str, file_size, e.to_string())
            }
        }
    }

    fn inspect(&self, file_path: &Path, path_str: &str, file_size: u64) -> Result<PdfAnalysisResult, AnalysisError> {
        let bytes = std::fs::read(file_path)?;
        let doc = Document::load_mem(&bytes)?;
        let pages = doc.get_pages();

        let text_content = self.text_extractor.extract(&doc, &bytes);
        let text_length = text_content.chars().count();
        let counts = self.classifier.count(&text_content);

        let images = images::detect(&doc, &pages);
        let fonts = fonts::detect(&doc, &pages, &text_content);
        let form_field_count = forms::count_fields(&doc);

        let (content_density, compression_ratio) = if file_size > 0 {
            (
                text_length as f64 / file_size as f64,
                (text_length * 2) as f64 / file_size as f64,
            )
        } else {
            (0.0, 0.0)
        };

        Ok(PdfAnalysisResult {
            file_path: path_str.to_string(),
            file_size,
            page_count: pages.len() as u32,
            text_content,
            text_length,
            has_images: images.has_images,
            has_fonts: fonts.has_fonts,
            font_count: fonts.font_count,
            chinese_char_count: counts.chinese,
            special_char_count: counts.special,
            form_field_count,
            content_density,
            compression_ratio,
            image_detection: images.detection,
            font_detection: fonts.detection,
            error_message: String::new(),
        })
    }

    /// 分析目录中的所有PDF文件，返回 文件名 -> 分析结果
    pub fn analyze_directory(&self, dir: &Path) -> BTreeMap<String, PdfAnalysisResult> {
        let mut results = BTreeMap::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("无法读取目录 {}: {}", dir.display(), e);
                return results;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == "pdf").unwrap_or(false) {
                let filename = entry.file_name().to_string_lossy().to_string();
                results.insert(filename, self.analyze(&path));
            }
        }

        info!("目录分析完成: {} ({} 个PDF)", dir.display(), results.len());
        results
    }
}

/// 按样例分组对比不同工具的输出: 样例名 -> 工具后缀 -> 指标
pub fn compare_by_sample(
    results: &BTreeMap<String, PdfAnalysisResult>,
) -> BTreeMap<String, BTreeMap<String, SampleComparison>> {
    let mut comparisons: BTreeMap<String, BTreeMap<String, SampleComparison>> = BTreeMap::new();

    for (filename, result) in results {
        let stem = filename.strip_suffix(".pdf").unwrap_or(filename);
        let Some((sample, tool)) = stem.rsplit_once('_') else {
            continue;
        };

        comparisons.entry(sample.to_string()).or_default().insert(
            tool.to_string(),
            SampleComparison {
                file_size: result.file_size,
                page_count: result.page_count,
                text_length: result.text_length,
                content_density: result.content_density,
                has_images: result.has_images,
                font_count: result.font_count,
                chinese_char_count: result.chinese_char_count,
                special_char_count: result.special_char_count,
                compression_ratio: result.compression_ratio,
                error: result.error_message.clone(),
            },
        );
    }

    comparisons
}

// Pages may inherit Resources from any ancestor in the page tree
const MAX_INHERIT_DEPTH: usize = 32;

/// 获取页面(含继承)的资源字典
pub(crate) fn page_resources(doc: &Document, page_id: ObjectId) -> Result<Option<&Dictionary>, AnalysisError> {
    let mut current = doc.get_dictionary(page_id)?;

    for _ in 0..MAX_INHERIT_DEPTH {
        if let Ok(res) = current.get(b"Resources") {
            let (_, res_obj) = doc.dereference(res)?;
            return Ok(Some(res_obj.as_dict()?));
        }
        match current.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent_id) => current = doc.get_dictionary(parent_id)?,
            Err(_) => return Ok(None),
        }
    }

    Ok(None)
}

/// 从资源字典中取出某类子字典 (Font / XObject)
pub(crate) fn resource_entry<'a>(
    doc: &'a Document,
    resources: &'a Dictionary,
    key: &[u8],
) -> Result<Option<&'a Dictionary>, AnalysisError> {
    match resources.get(key) {
        Ok(obj) => {
            let (_, resolved) = doc.dereference(obj)?;
            Ok(Some(resolved.as_dict()?))
        }
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::fixtures::PdfBuilder;

    fn analyzer() -> PdfAnalyzer {
        PdfAnalyzer::new().unwrap()
    }

    #[test]
    fn missing_file_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let result = analyzer().analyze(&dir.path().join("nope.pdf"));
        assert_eq!(result.page_count, 0);
        assert_eq!(result.text_length, 0);
        assert_eq!(result.file_size, 0);
        assert!(!result.error_message.is_empty());
        assert!(!result.is_success());
    }

    #[test]
    fn garbage_bytes_keep_file_size_but_zero_everything_else() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken_weasyprint.pdf");
        std::fs::write(&path, b"this is not a pdf at all").unwrap();

        let result = analyzer().analyze(&path);
        assert_eq!(result.file_size, 24);
        assert_eq!(result.page_count, 0);
        assert!(!result.has_fonts);
        assert_eq!(result.content_density, 0.0);
        assert!(!result.error_message.is_empty());
    }

    #[test]
    fn single_page_text_pdf_derives_density_from_char_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = PdfBuilder::new().text_page("Hello World").write_to(dir.path(), "base_weasyprint.pdf");

        let result = analyzer().analyze(&path);
        assert!(result.error_message.is_empty(), "{}", result.error_message);
        assert_eq!(result.page_count, 1);
        assert_eq!(result.text_content, "Hello World");
        assert_eq!(result.text_length, "Hello World".chars().count());

        let size = std::fs::metadata(&path).unwrap().len();
        assert_eq!(result.file_size, size);
        assert_eq!(result.content_density, result.text_length as f64 / size as f64);
        assert_eq!(result.compression_ratio, (result.text_length * 2) as f64 / size as f64);
        assert!(result.has_fonts);
        assert_eq!(result.font_count, 1);
        assert!(!result.has_images);
        assert_eq!(result.form_field_count, 0);
    }

    #[test]
    fn multi_page_document_counts_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = PdfBuilder::new()
            .text_page("Chapter one")
            .text_page("Chapter two")
            .text_page("Chapter three")
            .write_to(dir.path(), "long_document_playwright.pdf");

        let result = analyzer().analyze(&path);
        assert_eq!(result.page_count, 3);
        let one = result.text_content.find("one").unwrap();
        let three = result.text_content.find("three").unwrap();
        assert!(one < three);
    }

    #[test]
    fn structural_signals_are_collected() {
        let dir = tempfile::tempdir().unwrap();
        let path = PdfBuilder::new()
            .text_page("Name Email Submit")
            .with_image()
            .with_form_fields(3)
            .write_to(dir.path(), "forms_soffice.pdf");

        let result = analyzer().analyze(&path);
        assert!(result.has_images);
        assert_eq!(result.image_detection, Detection::Confirmed);
        assert_eq!(result.form_field_count, 3);
        assert_eq!(result.font_detection, Detection::Confirmed);
    }

    #[test]
    fn directory_analysis_only_picks_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        PdfBuilder::new().text_page("a").write_to(dir.path(), "base_weasyprint.pdf");
        PdfBuilder::new().text_page("b").write_to(dir.path(), "base_playwright.pdf");
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let results = analyzer().analyze_directory(dir.path());
        assert_eq!(results.len(), 2);
        assert!(results.contains_key("base_weasyprint.pdf"));

        let missing = analyzer().analyze_directory(&dir.path().join("missing"));
        assert!(missing.is_empty());
    }

    #[test]
    fn comparison_groups_by_sample_then_tool() {
        let mut results = BTreeMap::new();
        results.insert(
            "long_document_soffice.pdf".to_string(),
            PdfAnalysisResult { page_count: 3, file_size: 10, ..Default::default() },
        );
        results.insert(
            "long_document_playwright.pdf".to_string(),
            PdfAnalysisResult { page_count: 2, file_size: 20, ..Default::default() },
        );
        results.insert("nounderscore.pdf".to_string(), PdfAnalysisResult::default());

        let grouped = compare_by_sample(&results);
        assert_eq!(grouped.len(), 1);
        let tools = &grouped["long_document"];
        assert_eq!(tools["soffice"].page_count, 3);
        assert_eq!(tools["playwright"].file_size, 20);
    }
}
