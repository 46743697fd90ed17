//! 一次完整评估的流程控制
//!
//! `Init -> RunConverters -> ScoreLegacy -> ScoreObjective -> Persist -> Done`

use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::analyzer::{PdfAnalysisResult, PdfAnalyzer};
use crate::config::{AppConfig, Benchmarks, SampleCatalog};
use crate::converter::{CommandConverter, Converter};
use crate::legacy::{EvaluationMetrics, LegacyScorer, SampleResult};
use crate::scoring::{ObjectiveEvaluator, ObjectiveMetrics};
use crate::storage;
use crate::tools::ToolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    RunConverters,
    ScoreLegacy,
    ScoreObjective,
    Persist,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "初始化",
            Stage::RunConverters => "运行转换",
            Stage::ScoreLegacy => "传统评分",
            Stage::ScoreObjective => "客观评分",
            Stage::Persist => "保存结果",
            Stage::Done => "完成",
        };
        f.write_str(name)
    }
}

/// 评估输出，均以工具显示名为键
#[derive(Debug, Clone, Default)]
pub struct EvaluationOutcome {
    pub results: BTreeMap<String, Vec<SampleResult>>,
    pub metrics: BTreeMap<String, EvaluationMetrics>,
    pub objective_metrics: BTreeMap<String, ObjectiveMetrics>,
}

pub struct Orchestrator {
    samples_dir: PathBuf,
    outputs_dir: PathBuf,
    report_dir: PathBuf,
    catalog: SampleCatalog,
    converters: Vec<Box<dyn Converter>>,
    analyzer: PdfAnalyzer,
    legacy: LegacyScorer,
    evaluator: ObjectiveEvaluator,
    stage: Stage,
}

impl Orchestrator {
    pub fn new(
        config: &AppConfig,
        catalog: SampleCatalog,
        converters: Vec<Box<dyn Converter>>,
    ) -> Result<Self> {
        Ok(Self {
            samples_dir: PathBuf::from(&config.evaluation.samples_dir),
            outputs_dir: PathBuf::from(&config.evaluation.outputs_dir),
            report_dir: PathBuf::from(&config.evaluation.report_dir),
            legacy: LegacyScorer::new(catalog.clone()),
            evaluator: ObjectiveEvaluator::new(config.benchmarks.clone(), catalog.clone()),
            catalog,
            converters,
            analyzer: PdfAnalyzer::new()?,
            stage: Stage::Init,
        })
    }

    /// 按配置中启用的工具命令构造转换器
    pub fn from_config(config: &AppConfig, catalog: SampleCatalog) -> Result<Self> {
        let timeout = Duration::from_secs(config.evaluation.timeout_secs);
        let converters: Vec<Box<dyn Converter>> = config
            .enabled_tools()
            .into_iter()
            .map(|command| Box::new(CommandConverter::new(command.clone(), timeout)) as Box<dyn Converter>)
            .collect();
        Self::new(config, catalog, converters)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, next: Stage) {
        info!("评估阶段: {} -> {}", self.stage, next);
        self.stage = next;
    }

    pub async fn run(&mut self) -> Result<EvaluationOutcome> {
        info!(
            "开始HTML转PDF工具评估: {} 个工具, {} 个样例",
            self.converters.len(),
            self.catalog.samples.len()
        );
        let mut outcome = EvaluationOutcome::default();

        self.advance(Stage::RunConverters);
        outcome.results = self.run_converters().await;

        self.advance(Stage::ScoreLegacy);
        for converter in &self.converters {
            let profile = converter.tool().profile();
            let results = outcome.results.get(profile.display_name).cloned().unwrap_or_default();
            let metrics = self.legacy.metrics(&profile, results);
            info!("{} 传统加权总分: {:.1}", profile.display_name, metrics.weighted_score);
            outcome.metrics.insert(profile.display_name.to_string(), metrics);
        }

        self.advance(Stage::ScoreObjective);
        for converter in &self.converters {
            let profile = converter.tool().profile();
            let results = outcome.results.get(profile.display_name).map(Vec::as_slice).unwrap_or(&[]);
            let metrics = self.score_objective(&**converter, results);
            info!("{} 客观综合评分: {:.1}", profile.display_name, metrics.overall_score);
            outcome.objective_metrics.insert(profile.display_name.to_string(), metrics);
        }

        self.advance(Stage::Persist);
        storage::save_results(&self.report_dir, &outcome)?;

        self.advance(Stage::Done);
        Ok(outcome)
    }

    /// 顺序执行所有转换，单个样例失败不会中断评估
    async fn run_converters(&self) -> BTreeMap<String, Vec<SampleResult>> {
        let mut all_results = BTreeMap::new();

        for converter in &self.converters {
            let profile = converter.tool().profile();
            info!("运行 {} 转换...", profile.display_name);

            let mut results = Vec::with_capacity(self.catalog.samples.len());
            for sample in &self.catalog.samples {
                let input = self.samples_dir.join(&sample.name);
                let conversion = converter.convert(&input, &self.outputs_dir).await;
                results.push(SampleResult::from_outcome(&sample.name, &conversion));
            }

            let succeeded = results.iter().filter(|r| r.conversion_success).count();
            info!("{} 转换完成: {}/{} 成功", profile.display_name, succeeded, results.len());
            all_results.insert(profile.display_name.to_string(), results);
        }

        all_results
    }

    /// 失败的转换以归零的分析结果参与评分
    fn score_objective(&self, converter: &dyn Converter, results: &[SampleResult]) -> ObjectiveMetrics {
        let profile = converter.tool().profile();

        if !results.iter().any(|r| r.conversion_success && !r.file_path.is_empty()) {
            warn!("{} 工具没有成功的PDF文件可供评估", profile.display_name);
            return ObjectiveMetrics::empty(profile.display_name);
        }

        let mut pdf_results: BTreeMap<String, PdfAnalysisResult> = BTreeMap::new();
        for result in results {
            let stem = result.sample_name.strip_suffix(".html").unwrap_or(&result.sample_name);
            let expected_name = profile.output_file_name(stem);

            if result.conversion_success && !result.file_path.is_empty() {
                // converters may name their output freely; alias filtering needs `{stem}_{suffix}.pdf`
                pdf_results.insert(expected_name, self.analyzer.analyze(Path::new(&result.file_path)));
            } else {
                let error = if result.error_message.is_empty() {
                    "转换失败".to_string()
                } else {
                    result.error_message.clone()
                };
                pdf_results.insert(expected_name.clone(), PdfAnalysisResult::failed(&expected_name, 0, error));
            }
        }

        info!("评估 {} 工具 ({} 个PDF文件)...", profile.display_name, pdf_results.len());
        self.evaluator.evaluate(&profile, &pdf_results)
    }
}

/// 分析目录中已有的输出文件并为每个工具计算客观指标
pub fn score_directory(
    dir: &Path,
    benchmarks: Benchmarks,
    catalog: SampleCatalog,
) -> Result<BTreeMap<String, ObjectiveMetrics>> {
    let analyzer = PdfAnalyzer::new()?;
    let pdf_results = analyzer.analyze_directory(dir);
    let evaluator = ObjectiveEvaluator::new(benchmarks, catalog);

    Ok(ToolId::ALL
        .iter()
        .map(|id| {
            let profile = id.profile();
            (profile.display_name.to_string(), evaluator.evaluate(&profile, &pdf_results))
        })
        .collect())
}
