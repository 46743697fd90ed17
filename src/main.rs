mod analyzer;
mod config;
mod converter;
mod legacy;
mod orchestrator;
mod scoring;
mod storage;
mod tools;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::analyzer::{compare_by_sample, PdfAnalyzer};
use crate::config::{default_tools, AppConfig, SampleCatalog};
use crate::orchestrator::{score_directory, Orchestrator};
use crate::utils::logger;

#[derive(Parser)]
#[command(name = "pdfbench")]
#[command(about = "HTML转PDF工具客观评估系统", long_about = None)]
struct Cli {
    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 初始化配置和目录
    Init,
    /// 运行完整评估 (转换 + 评分 + 保存)
    Run,
    /// 分析单个PDF文件并输出JSON
    Analyze {
        /// PDF文件路径
        pdf: PathBuf,
    },
    /// 对目录中已有的输出文件计算客观指标
    Score {
        /// 输出PDF所在目录
        dir: PathBuf,
        /// 同时输出按样例分组的对比
        #[arg(long)]
        by_sample: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logger::init_logger(cli.verbose);
    info!("pdfbench 启动");

    match cli.command {
        Commands::Init => {
            init_command().await?;
        }
        Commands::Run => {
            run_command().await?;
        }
        Commands::Analyze { pdf } => {
            analyze_command(pdf)?;
        }
        Commands::Score { dir, by_sample } => {
            score_command(dir, by_sample)?;
        }
    }

    Ok(())
}

async fn init_command() -> Result<()> {
    info!("初始化系统...");

    let app_config = AppConfig {
        tools: default_tools(),
        ..AppConfig::default()
    };

    tokio::fs::create_dir_all(&app_config.evaluation.samples_dir).await?;
    tokio::fs::create_dir_all(&app_config.evaluation.outputs_dir).await?;
    tokio::fs::create_dir_all(&app_config.evaluation.report_dir).await?;
    tokio::fs::create_dir_all("config").await?;

    app_config.save("config/settings.toml")?;
    info!("已生成配置文件: config/settings.toml");

    let catalog = SampleCatalog::default();
    let catalog_toml = toml::to_string_pretty(&catalog)?;
    tokio::fs::write("config/samples.toml", catalog_toml).await?;
    info!("已生成样例配置: config/samples.toml");

    info!("✅ 系统初始化完成！");
    info!("下一步:");
    info!("  1. 将样例HTML放入 {}", app_config.evaluation.samples_dir);
    info!("  2. 编辑 config/settings.toml 配置转换工具命令");
    info!("  3. 运行 'pdfbench run' 开始评估");

    Ok(())
}

async fn run_command() -> Result<()> {
    let app_config = AppConfig::load()?;
    let catalog = SampleCatalog::load()?;

    let mut orchestrator = Orchestrator::from_config(&app_config, catalog)?;
    let outcome = orchestrator.run().await?;

    info!("{}", "=".repeat(60));
    info!("📄 HTML转PDF工具评估报告");

    let mut ranked: Vec<_> = outcome.metrics.values().collect();
    ranked.sort_by(|a, b| b.weighted_score.total_cmp(&a.weighted_score));

    info!("🏆 工具评分 (加权总分):");
    for (i, metrics) in ranked.iter().enumerate() {
        let objective = outcome
            .objective_metrics
            .get(&metrics.tool_name)
            .map(|m| m.overall_score)
            .unwrap_or(0.0);
        info!(
            "  {}. {}: 传统 {:.1} 分, 样例加权 {:.1} 分, 客观 {:.1} 分",
            i + 1,
            metrics.tool_name,
            metrics.weighted_score,
            metrics.sample_weighted_score,
            objective
        );
    }

    if let Some(best) = ranked.first() {
        info!("💡 推荐使用: {} (综合评分: {:.1})", best.tool_name, best.weighted_score);
    }

    Ok(())
}

fn analyze_command(pdf: PathBuf) -> Result<()> {
    let analyzer = PdfAnalyzer::new()?;
    let result = analyzer.analyze(&pdf);

    if !result.error_message.is_empty() {
        info!("分析失败: {}", result.error_message);
    }
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn score_command(dir: PathBuf, by_sample: bool) -> Result<()> {
    let app_config = AppConfig::load()?;
    let catalog = SampleCatalog::load()?;

    if by_sample {
        let pdf_analyzer = PdfAnalyzer::new()?;
        let comparison = compare_by_sample(&pdf_analyzer.analyze_directory(&dir));
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    }

    let scores = score_directory(&dir, app_config.benchmarks, catalog)?;
    for (tool, metrics) in &scores {
        info!(
            "{}: 综合 {:.1}, 成功率 {:.1}%, 文本保留 {:.1}, 中文 {:.1}",
            tool,
            metrics.overall_score,
            metrics.success_rate,
            metrics.text_preservation_rate,
            metrics.chinese_support_score
        );
    }
    println!("{}", serde_json::to_string_pretty(&scores)?);
    Ok(())
}
