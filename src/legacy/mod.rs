//! 基于转换耗时和文件大小的传统评分
//!
//! 与客观评分相互独立，只依赖转换器返回的成功标志、耗时和文件大小。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::SampleCatalog;
use crate::converter::ConversionOutcome;
use crate::scoring::curves::{clamp_score, mean};
use crate::tools::ToolProfile;

/// 单个样例的转换结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleResult {
    /// 样例HTML文件名
    pub sample_name: String,
    pub file_path: String,
    pub conversion_success: bool,
    /// 转换耗时(秒)
    pub conversion_time: f64,
    /// 输出文件大小(字节)
    pub file_size: u64,
    #[serde(default)]
    pub error_message: String,
    /// 转换质量评分 (0-100)
    #[serde(default)]
    pub quality_score: f64,
    #[serde(default)]
    pub notes: String,
}

impl SampleResult {
    pub fn from_outcome(sample_name: &str, outcome: &ConversionOutcome) -> Self {
        let mut result = Self {
            sample_name: sample_name.to_string(),
            file_path: outcome.file_path.clone(),
            conversion_success: outcome.success,
            conversion_time: outcome.time,
            file_size: outcome.file_size,
            error_message: outcome.error.clone(),
            ..Self::default()
        };
        result.quality_score = quality_score(result.conversion_success, result.conversion_time, result.file_size);
        result
    }
}

/// 单个样例的质量评分：成功基础分50 + 耗时分(10~30) + 大小分(5~20)
pub fn quality_score(success: bool, conversion_time: f64, file_size: u64) -> f64 {
    if !success {
        return 0.0;
    }

    let time_score = if conversion_time <= 0.5 {
        30.0
    } else if conversion_time <= 1.0 {
        25.0
    } else if conversion_time <= 2.0 {
        20.0
    } else if conversion_time <= 5.0 {
        15.0
    } else {
        10.0
    };

    let size_score = match file_size {
        0..=50_000 => 20.0,
        50_001..=200_000 => 15.0,
        200_001..=500_000 => 10.0,
        _ => 5.0,
    };

    f64::min(100.0, 50.0 + time_score + size_score)
}

/// 五个传统评估维度 (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    /// 排版与视觉还原度
    pub layout_visual: f64,
    /// 功能支持
    pub functionality: f64,
    /// 性能与稳定性
    pub performance: f64,
    /// 部署可行性
    pub deployment: f64,
    /// 可定制性
    pub customization: f64,
}

/// 维度权重: 35% / 25% / 20% / 10% / 10%
pub const DIMENSION_WEIGHTS: [f64; 5] = [0.35, 0.25, 0.20, 0.10, 0.10];

impl DimensionScores {
    fn neutral() -> Self {
        Self {
            layout_visual: 50.0,
            functionality: 50.0,
            performance: 50.0,
            deployment: 50.0,
            customization: 50.0,
        }
    }

    fn values(&self) -> [f64; 5] {
        [
            self.layout_visual,
            self.functionality,
            self.performance,
            self.deployment,
            self.customization,
        ]
    }

    pub fn weighted_score(&self) -> f64 {
        self.values()
            .iter()
            .zip(DIMENSION_WEIGHTS.iter())
            .map(|(score, weight)| score * weight)
            .sum()
    }
}

/// 根据实际转换结果计算各维度评分，空结果时全部为 50
pub fn dimension_scores(profile: &ToolProfile, results: &[SampleResult]) -> DimensionScores {
    if results.is_empty() {
        return DimensionScores::neutral();
    }

    let success_count = results.iter().filter(|r| r.conversion_success).count();
    let success_rate = success_count as f64 / results.len() as f64;

    let qualities: Vec<f64> = results
        .iter()
        .map(|r| r.quality_score)
        .filter(|q| *q > 0.0)
        .collect();
    let avg_quality = mean(&qualities).unwrap_or(50.0);

    let times: Vec<f64> = results
        .iter()
        .filter(|r| r.conversion_success && r.conversion_time > 0.0)
        .map(|r| r.conversion_time)
        .collect();
    let avg_time = mean(&times).unwrap_or(1.0);

    let sizes: Vec<f64> = results
        .iter()
        .filter(|r| r.file_size > 0)
        .map(|r| r.file_size as f64)
        .collect();
    let size_consistency = size_consistency(&sizes);

    let layout_visual = avg_quality * (success_rate * 0.3 + 0.7);
    let functionality = f64::min(100.0, avg_quality * profile.functionality_multiplier);
    let time_score = f64::max(0.0, 100.0 - avg_time * 20.0);
    let performance = success_rate * 100.0 * 0.6 + time_score * 0.4;
    let deployment = success_rate * 100.0 * 0.7 + size_consistency * 0.3;

    DimensionScores {
        layout_visual: clamp_score(layout_visual),
        functionality: clamp_score(functionality),
        performance: clamp_score(performance),
        deployment: clamp_score(deployment),
        customization: clamp_score(profile.customization_score),
    }
}

/// 文件大小一致性: 100 - 方差/均值×100，样本不足两个时为 50
fn size_consistency(sizes: &[f64]) -> f64 {
    if sizes.len() < 2 {
        return 50.0;
    }
    match mean(sizes) {
        Some(avg) if avg > 0.0 => {
            let variance = sizes.iter().map(|s| (s - avg).powi(2)).sum::<f64>() / sizes.len() as f64;
            f64::max(0.0, 100.0 - variance / avg * 100.0)
        }
        _ => 50.0,
    }
}

/// 单个工具的传统评估指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub tool_name: String,
    #[serde(flatten)]
    pub dimensions: DimensionScores,
    /// 维度加权总分
    pub weighted_score: f64,
    /// 按样例权重加权的平均质量分
    pub sample_weighted_score: f64,
    pub conversion_times: Vec<f64>,
    /// 样例名 -> 文件大小(字节)
    pub file_sizes: BTreeMap<String, u64>,
    pub sample_results: Vec<SampleResult>,
}

/// 传统评分器，样例权重来自样例目录
pub struct LegacyScorer {
    catalog: SampleCatalog,
}

impl LegacyScorer {
    pub fn new(catalog: SampleCatalog) -> Self {
        Self { catalog }
    }

    /// 按样例权重计算工具总分，无结果时为 0
    pub fn tool_score(&self, results: &[SampleResult]) -> f64 {
        let mut total_weighted = 0.0;
        let mut total_weight = 0.0;

        for result in results {
            let weight = self.catalog.weight(&result.sample_name);
            let quality = quality_score(result.conversion_success, result.conversion_time, result.file_size);
            total_weighted += quality * weight;
            total_weight += weight;
        }

        if total_weight > 0.0 {
            total_weighted / total_weight
        } else {
            0.0
        }
    }

    pub fn metrics(&self, profile: &ToolProfile, results: Vec<SampleResult>) -> EvaluationMetrics {
        let dimensions = dimension_scores(profile, &results);

        let conversion_times = results
            .iter()
            .filter(|r| r.conversion_success && r.conversion_time > 0.0)
            .map(|r| r.conversion_time)
            .collect();
        let file_sizes = results
            .iter()
            .filter(|r| r.file_size > 0)
            .map(|r| (r.sample_name.clone(), r.file_size))
            .collect();

        EvaluationMetrics {
            tool_name: profile.display_name.to_string(),
            weighted_score: dimensions.weighted_score(),
            sample_weighted_score: self.tool_score(&results),
            dimensions,
            conversion_times,
            file_sizes,
            sample_results: results,
        }
    }
}
