use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{ConversionOutcome, Converter};
use crate::config::ToolCommand;
use crate::tools::{ToolId, ToolProfile};
use crate::utils::{BenchError, BenchResult};

/// 通过外部命令行程序完成转换
pub struct CommandConverter {
    profile: ToolProfile,
    command: ToolCommand,
    timeout: Duration,
}

/// 命令参数中可替换的占位符
struct Placeholders {
    input: String,
    output: String,
    outdir: String,
    stem: String,
}

impl Placeholders {
    fn apply(&self, template: &str) -> String {
        template
            .replace("{input}", &self.input)
            .replace("{output}", &self.output)
            .replace("{outdir}", &self.outdir)
            .replace("{stem}", &self.stem)
    }
}

impl CommandConverter {
    pub fn new(command: ToolCommand, timeout: Duration) -> Self {
        Self {
            profile: command.id.profile(),
            command,
            timeout,
        }
    }

    async fn run(&self, input: &Path, output_dir: &Path) -> BenchResult<PathBuf> {
        if !input.exists() {
            return Err(BenchError::ConversionError(format!(
                "输入文件不存在: {}",
                input.display()
            )));
        }

        tokio::fs::create_dir_all(output_dir).await?;
        let input = tokio::fs::canonicalize(input).await?;
        let output_dir = tokio::fs::canonicalize(output_dir).await?;

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let output = output_dir.join(self.profile.output_file_name(&stem));

        let placeholders = Placeholders {
            input: input.to_string_lossy().to_string(),
            output: output.to_string_lossy().to_string(),
            outdir: output_dir.to_string_lossy().to_string(),
            stem,
        };
        let args: Vec<String> = self.command.args.iter().map(|a| placeholders.apply(a)).collect();
        debug!("{} 执行: {} {:?}", self.profile.display_name, self.command.program, args);

        let child = Command::new(&self.command.program)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // dropping the wait future on timeout kills the child
        let output_status = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => return Err(BenchError::Timeout(self.timeout)),
        };

        if !output_status.status.success() {
            let stderr = String::from_utf8_lossy(&output_status.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("转换命令执行失败 ({})", output_status.status)
            } else {
                stderr
            };
            return Err(BenchError::ConversionError(message));
        }

        if let Some(emits) = &self.command.emits {
            let emitted = PathBuf::from(placeholders.apply(emits));
            if emitted != output {
                if !emitted.exists() {
                    return Err(BenchError::ConversionError("输出文件未生成".to_string()));
                }
                tokio::fs::rename(&emitted, &output).await?;
            }
        }

        if !output.exists() {
            return Err(BenchError::ConversionError("输出文件未生成".to_string()));
        }

        Ok(output)
    }
}

#[async_trait]
impl Converter for CommandConverter {
    fn tool(&self) -> ToolId {
        self.profile.id
    }

    async fn convert(&self, input: &Path, output_dir: &Path) -> ConversionOutcome {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let start = Instant::now();

        match self.run(input, output_dir).await {
            Ok(output) => {
                let time = start.elapsed().as_secs_f64();
                let file_size = tokio::fs::metadata(&output).await.map(|m| m.len()).unwrap_or(0);
                info!(
                    "[{}] {} -> 完成, 耗时 {:.2}s, 大小 {} 字节",
                    self.profile.display_name, name, time, file_size
                );
                ConversionOutcome {
                    success: true,
                    time,
                    file_size,
                    file_path: output.to_string_lossy().to_string(),
                    error: String::new(),
                }
            }
            Err(e) => {
                warn!("[{}] {} -> 转换失败: {}", self.profile.display_name, name, e);
                // missing input never started a process
                let time = match &e {
                    BenchError::ConversionError(_) if !input.exists() => 0.0,
                    _ => start.elapsed().as_secs_f64(),
                };
                ConversionOutcome {
                    time,
                    ..ConversionOutcome::failed(e.to_string())
                }
            }
        }
    }
}
