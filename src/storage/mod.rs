use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::legacy::{EvaluationMetrics, SampleResult};
use crate::orchestrator::EvaluationOutcome;
use crate::scoring::ObjectiveMetrics;
use crate::utils::BenchResult;

pub const RESULTS_FILE: &str = "evaluation_results.json";

/// 写入磁盘的评估结果
#[derive(Debug, Serialize)]
struct EvaluationReport<'a> {
    generated_at: DateTime<Utc>,
    results: &'a BTreeMap<String, Vec<SampleResult>>,
    metrics: &'a BTreeMap<String, EvaluationMetrics>,
    objective_metrics: &'a BTreeMap<String, ObjectiveMetrics>,
}

/// 保存评估结果为 `report_dir/evaluation_results.json`
pub fn save_results(report_dir: &Path, outcome: &EvaluationOutcome) -> BenchResult<PathBuf> {
    std::fs::create_dir_all(report_dir)?;

    let report = EvaluationReport {
        generated_at: Utc::now(),
        results: &outcome.results,
        metrics: &outcome.metrics,
        objective_metrics: &outcome.objective_metrics,
    };

    let path = report_dir.join(RESULTS_FILE);
    let content = serde_json::to_string_pretty(&report)?;
    std::fs::write(&path, content)?;

    info!("评估结果已保存: {}", path.display());
    Ok(path)
}
