pub mod curves;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::analyzer::PdfAnalysisResult;
use crate::config::{Benchmarks, SampleCatalog, SampleKind};
use crate::tools::ToolProfile;
use curves::{clamp_score, mean, piecewise_score, population_std_dev};

/// 表单被转为纯文本时常见的关键词
const FORM_KEYWORDS: &[&str] = &["input", "button", "submit", "form", "field", "text", "email", "password"];

const BYTES_PER_KB: f64 = 1024.0;

/// 基于PDF内容分析的客观评估指标 (每个工具一份)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveMetrics {
    pub tool_name: String,

    // 文件效率
    /// 平均文件大小(KB)
    pub avg_file_size: f64,
    pub file_size_consistency: f64,
    pub compression_efficiency: f64,

    // 内容准确性
    pub text_preservation_rate: f64,
    pub content_density_score: f64,
    pub chinese_support_score: f64,
    pub special_char_support: f64,

    // 功能完整性
    pub image_support_rate: f64,
    pub font_preservation_rate: f64,
    pub form_support_rate: f64,
    pub page_structure_score: f64,

    // 稳定性
    pub success_rate: f64,
    pub error_rate: f64,

    pub overall_score: f64,
}

impl ObjectiveMetrics {
    /// 没有任何可评估文件时的结果
    pub fn empty(tool_name: &str) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            error_rate: 100.0,
            ..Self::default()
        }
    }
}

/// 参与综合评分的指标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreComponent {
    CompressionEfficiency,
    TextPreservation,
    ContentDensity,
    ChineseSupport,
    SpecialCharSupport,
    ImageSupport,
    FontPreservation,
    PageStructure,
    SuccessRate,
}

/// 综合评分权重，总和必须为 1.0
pub const OVERALL_WEIGHTS: [(ScoreComponent, f64); 9] = [
    (ScoreComponent::CompressionEfficiency, 0.15),
    (ScoreComponent::TextPreservation, 0.20),
    (ScoreComponent::ContentDensity, 0.10),
    (ScoreComponent::ChineseSupport, 0.15),
    (ScoreComponent::SpecialCharSupport, 0.10),
    (ScoreComponent::ImageSupport, 0.10),
    (ScoreComponent::FontPreservation, 0.10),
    (ScoreComponent::PageStructure, 0.05),
    (ScoreComponent::SuccessRate, 0.05),
];

impl ScoreComponent {
    fn value(self, metrics: &ObjectiveMetrics) -> f64 {
        match self {
            ScoreComponent::CompressionEfficiency => metrics.compression_efficiency,
            ScoreComponent::TextPreservation => metrics.text_preservation_rate,
            ScoreComponent::ContentDensity => metrics.content_density_score,
            ScoreComponent::ChineseSupport => metrics.chinese_support_score,
            ScoreComponent::SpecialCharSupport => metrics.special_char_support,
            ScoreComponent::ImageSupport => metrics.image_support_rate,
            ScoreComponent::FontPreservation => metrics.font_preservation_rate,
            ScoreComponent::PageStructure => metrics.page_structure_score,
            ScoreComponent::SuccessRate => metrics.success_rate,
        }
    }
}

pub fn overall_score(metrics: &ObjectiveMetrics) -> f64 {
    let weighted: f64 = OVERALL_WEIGHTS
        .iter()
        .map(|(component, weight)| component.value(metrics) * weight)
        .sum();
    clamp_score(weighted)
}

/// 客观评分引擎。纯函数：相同输入总是得到相同输出
pub struct ObjectiveEvaluator {
    benchmarks: Benchmarks,
    catalog: SampleCatalog,
}

impl ObjectiveEvaluator {
    pub fn new(benchmarks: Benchmarks, catalog: SampleCatalog) -> Self {
        Self { benchmarks, catalog }
    }

    /// 从全部分析结果中筛选该工具的文件并计算客观指标
    ///
    /// 样例参考文本由构造时传入的 `SampleCatalog` 提供 (`Sample::reference_text`)，
    /// 目前没有指标读取它们。
    pub fn evaluate(
        &self,
        tool: &ToolProfile,
        pdf_results: &BTreeMap<String, PdfAnalysisResult>,
    ) -> ObjectiveMetrics {
        let tool_results: Vec<(&str, &PdfAnalysisResult)> = pdf_results
            .iter()
            .filter(|(filename, _)| tool.matches_file(filename))
            .map(|(filename, result)| (filename.as_str(), result))
            .collect();

        if tool_results.is_empty() {
            info!("{} 没有可评估的PDF文件", tool.display_name);
            return ObjectiveMetrics::empty(tool.display_name);
        }
        debug!("{} 参与评估的文件: {}", tool.display_name, tool_results.len());

        let file_sizes_kb: Vec<f64> = tool_results
            .iter()
            .map(|(_, r)| r.file_size as f64 / BYTES_PER_KB)
            .collect();
        let avg_file_size = mean(&file_sizes_kb).unwrap_or(0.0);
        let file_size_consistency = clamp_score(100.0 - population_std_dev(&file_sizes_kb).min(100.0));

        let success_rate = self.success_rate(&tool_results);

        let mut metrics = ObjectiveMetrics {
            tool_name: tool.display_name.to_string(),
            avg_file_size,
            file_size_consistency,
            compression_efficiency: self.compression_score(&tool_results),
            text_preservation_rate: self.text_preservation(&tool_results),
            content_density_score: self.content_density_score(&tool_results),
            chinese_support_score: self.chinese_support_score(&tool_results),
            special_char_support: self.special_char_support(&tool_results),
            image_support_rate: self.image_support_rate(&tool_results),
            font_preservation_rate: self.font_preservation_rate(&tool_results),
            form_support_rate: self.form_support_rate(&tool_results),
            page_structure_score: self.page_structure_score(&tool_results),
            success_rate,
            error_rate: 100.0 - success_rate,
            overall_score: 0.0,
        };
        metrics.overall_score = overall_score(&metrics);
        metrics
    }

    fn has_kind(&self, filename: &str, kind: SampleKind) -> bool {
        self.catalog.classify(filename).has(kind)
    }

    /// 压缩效率：正值压缩比的均值套用分段曲线
    fn compression_score(&self, results: &[(&str, &PdfAnalysisResult)]) -> f64 {
        let ratios: Vec<f64> = results
            .iter()
            .map(|(_, r)| r.compression_ratio)
            .filter(|ratio| *ratio > 0.0)
            .collect();

        match mean(&ratios) {
            Some(avg) => clamp_score(piecewise_score(
                avg,
                self.benchmarks.min_compression_ratio,
                self.benchmarks.ideal_compression_ratio,
            )),
            None => 0.0,
        }
    }

    fn content_density_score(&self, results: &[(&str, &PdfAnalysisResult)]) -> f64 {
        let densities: Vec<f64> = results
            .iter()
            .map(|(_, r)| r.content_density)
            .filter(|density| *density > 0.0)
            .collect();

        match mean(&densities) {
            Some(avg) => clamp_score(piecewise_score(
                avg,
                self.benchmarks.min_content_density,
                self.benchmarks.ideal_content_density,
            )),
            None => 0.0,
        }
    }

    fn text_preservation(&self, results: &[(&str, &PdfAnalysisResult)]) -> f64 {
        let scores: Vec<f64> = results.iter().map(|(_, r)| text_preservation_score(r)).collect();
        mean(&scores).map(clamp_score).unwrap_or(0.0)
    }

    fn chinese_support_score(&self, results: &[(&str, &PdfAnalysisResult)]) -> f64 {
        let scores: Vec<f64> = results
            .iter()
            .map(|(filename, r)| {
                if !self.has_kind(filename, SampleKind::Chinese) || r.chinese_char_count > 0 {
                    100.0
                } else {
                    0.0
                }
            })
            .collect();
        mean(&scores).map(clamp_score).unwrap_or(50.0)
    }

    fn special_char_support(&self, results: &[(&str, &PdfAnalysisResult)]) -> f64 {
        let scores: Vec<f64> = results
            .iter()
            .map(|(filename, r)| {
                if !self.has_kind(filename, SampleKind::SpecialChars) || r.special_char_count > 0 {
                    100.0
                } else {
                    0.0
                }
            })
            .collect();
        mean(&scores).map(clamp_score).unwrap_or(100.0)
    }

    /// 只统计含图形内容的样例；大文件即使没检测到图片也给一半分
    fn image_support_rate(&self, results: &[(&str, &PdfAnalysisResult)]) -> f64 {
        let credits: Vec<f64> = results
            .iter()
            .filter(|(filename, _)| self.has_kind(filename, SampleKind::Graphics))
            .map(|(_, r)| {
                if r.has_images {
                    1.0
                } else if r.file_size > self.benchmarks.image_size_threshold_bytes {
                    0.5
                } else {
                    0.0
                }
            })
            .collect();

        match mean(&credits) {
            Some(rate) => clamp_score(rate * 100.0),
            None => 100.0,
        }
    }

    fn font_preservation_rate(&self, results: &[(&str, &PdfAnalysisResult)]) -> f64 {
        let scores: Vec<f64> = results
            .iter()
            .map(|(_, r)| {
                if r.has_fonts {
                    100.0
                } else if r.font_count > 0 {
                    50.0
                } else {
                    0.0
                }
            })
            .collect();
        mean(&scores).map(clamp_score).unwrap_or(0.0)
    }

    fn form_support_rate(&self, results: &[(&str, &PdfAnalysisResult)]) -> f64 {
        let credits: Vec<f64> = results
            .iter()
            .filter(|(filename, _)| self.has_kind(filename, SampleKind::Form))
            .map(|(_, r)| {
                if r.form_field_count > 0 {
                    1.0
                } else if r.text_length > self.benchmarks.substantial_text_chars {
                    // form flattened into text
                    let text = r.text_content.to_lowercase();
                    if FORM_KEYWORDS.iter().any(|k| text.contains(k)) {
                        0.6
                    } else {
                        0.3
                    }
                } else {
                    0.0
                }
            })
            .collect();

        match mean(&credits) {
            Some(rate) => clamp_score(rate * 100.0),
            None => 100.0,
        }
    }

    fn page_structure_score(&self, results: &[(&str, &PdfAnalysisResult)]) -> f64 {
        let scores: Vec<f64> = results
            .iter()
            .map(|(filename, r)| {
                let expected = self.catalog.classify(filename).expected_pages();
                page_structure_for(r.page_count, expected)
            })
            .collect();
        mean(&scores).map(clamp_score).unwrap_or(0.0)
    }

    fn success_rate(&self, results: &[(&str, &PdfAnalysisResult)]) -> f64 {
        if results.is_empty() {
            return 0.0;
        }
        let successful = results.iter().filter(|(_, r)| r.is_success()).count();
        clamp_score(successful as f64 / results.len() as f64 * 100.0)
    }
}

/// 单个文件的文本保留评分
fn text_preservation_score(result: &PdfAnalysisResult) -> f64 {
    if result.text_length == 0 {
        return 0.0;
    }

    let base_score = 60.0;
    let length_score = match result.text_length {
        n if n >= 200 => 40.0,
        n if n >= 100 => 30.0,
        n if n >= 50 => 20.0,
        _ => 10.0,
    };
    let chinese_bonus = (result.chinese_char_count as f64 / 10.0).min(10.0);
    let special_bonus = (result.special_char_count as f64 / 5.0).min(5.0);

    (base_score + length_score + chinese_bonus + special_bonus).min(100.0)
}

fn page_structure_for(actual: u32, expected: u32) -> f64 {
    if actual == expected {
        100.0
    } else if actual > 0 {
        let deviation = (actual as f64 - expected as f64).abs() / expected as f64;
        (100.0 - deviation * 50.0).max(0.0)
    } else {
        0.0
    }
}
