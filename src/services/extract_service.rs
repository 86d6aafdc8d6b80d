//! 论文抽取服务
//!
//! 抽取本身由外部程序完成，这里只负责调度、限制并发和统计返回状态。

use crate::config::Config;
use crate::error::{AppResult, ExtractionError};
use crate::services::download_service::progress_bar;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// 抽取程序可以读取的工作目录环境变量
pub const ROOT_ENV_VAR: &str = "EXTRACT_SOTA_ROOT";

/// 单个文件的抽取状态
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExtractionStatus(String);

impl ExtractionStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 抽取能力
pub trait Extractor: Send + Sync + 'static {
    /// 处理一个源文件，返回状态
    fn extract(&self, file: &Path) -> impl Future<Output = ExtractionStatus> + Send;
}

/// 调用外部程序：`<program> <args...> <file>`
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
    root: PathBuf,
}

impl CommandExtractor {
    pub fn new(program: impl Into<String>, args: Vec<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            root: root.into(),
        }
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        let program = config
            .extractor_program
            .clone()
            .ok_or(ExtractionError::NoProgram)?;
        Ok(Self::new(
            program,
            config.extractor_args.clone(),
            config.axcell_root.clone(),
        ))
    }
}

impl Extractor for CommandExtractor {
    async fn extract(&self, file: &Path) -> ExtractionStatus {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(file)
            .env(ROOT_ENV_VAR, &self.root)
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let status = stdout
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .last()
                    .unwrap_or("success");
                ExtractionStatus::new(status)
            }
            Ok(output) => {
                let code = output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                debug!(
                    "抽取 {} 失败: {}",
                    file.display(),
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                ExtractionStatus::new(format!("failed({})", code))
            }
            Err(e) => {
                warn!("无法启动抽取程序 {}: {}", self.program, e);
                ExtractionStatus::new("spawn-error")
            }
        }
    }
}

/// 各状态出现的次数
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatusCounts {
    counts: BTreeMap<ExtractionStatus, usize>,
}

impl StatusCounts {
    pub fn add(&mut self, status: ExtractionStatus) {
        *self.counts.entry(status).or_insert(0) += 1;
    }

    pub fn get(&self, status: &str) -> usize {
        self.counts
            .get(&ExtractionStatus::new(status))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// 按次数从多到少排列，次数相同按状态名排列
    pub fn sorted(&self) -> Vec<(&ExtractionStatus, usize)> {
        let mut sorted: Vec<_> = self.counts.iter().map(|(s, &c)| (s, c)).collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        sorted
    }
}

impl FromIterator<ExtractionStatus> for StatusCounts {
    fn from_iter<T: IntoIterator<Item = ExtractionStatus>>(iter: T) -> Self {
        let mut counts = Self::default();
        for status in iter {
            counts.add(status);
        }
        counts
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .counts
            .keys()
            .map(|s| s.as_str().len())
            .max()
            .unwrap_or(0);
        for (status, count) in self.sorted() {
            writeln!(f, "{:<width$}  {}", status.as_str(), count, width = width)?;
        }
        Ok(())
    }
}

/// 递归列出目录下所有普通文件，排序后返回
pub fn list_source_files(sources: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(sources)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("跳过无法访问的路径: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// 论文抽取服务
pub struct ExtractService<E: Extractor> {
    extractor: Arc<E>,
    jobs: usize,
}

impl ExtractService<CommandExtractor> {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self::new(
            CommandExtractor::from_config(config)?,
            config.extract_jobs,
        ))
    }
}

impl<E: Extractor> ExtractService<E> {
    /// `jobs` 为同时运行的抽取任务数，至少为 1
    pub fn new(extractor: E, jobs: usize) -> Self {
        Self {
            extractor: Arc::new(extractor),
            jobs: jobs.max(1),
        }
    }

    /// 抽取给定文件，返回各状态的次数
    pub async fn extract_all(&self, mut files: Vec<PathBuf>) -> AppResult<StatusCounts> {
        files.sort();
        info!("Processing {} files", files.len());
        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let progress = progress_bar(files.len() as u64, "Processing files...");
        let mut handles = Vec::with_capacity(files.len());

        for file in files {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| ExtractionError::TaskFailed {
                    file: file.display().to_string(),
                    reason: e.to_string(),
                })?;
            let extractor = Arc::clone(&self.extractor);
            let progress = progress.clone();
            let name = file.display().to_string();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let status = extractor.extract(&file).await;
                debug!("{} -> {}", file.display(), status);
                progress.inc(1);
                status
            });
            handles.push((name, handle));
        }

        let (names, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        let results = futures::future::join_all(handles).await;
        progress.finish_and_clear();

        let mut counts = StatusCounts::default();
        for (name, result) in names.into_iter().zip(results) {
            match result {
                Ok(status) => counts.add(status),
                Err(e) => {
                    error!("[{}] 抽取任务执行失败: {}", name, e);
                    counts.add(ExtractionStatus::new("task-error"));
                }
            }
        }

        Ok(counts)
    }
}
