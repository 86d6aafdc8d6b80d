//! 命令行参数，覆盖配置文件与环境变量中的值

use crate::config::Config;
use crate::error::AppResult;
use clap::Parser;
use std::path::PathBuf;

/// 下载 SOTA 验证集论文的 arXiv 源文件，调用外部程序抽取，并整理榜单记录
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML 配置文件
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// SOTA 数据集根目录
    #[arg(long)]
    pub project_root: Option<PathBuf>,

    /// 抽取工作目录（包含 sources/ 与 papers/）
    #[arg(long)]
    pub axcell_root: Option<PathBuf>,

    /// 下载 e-print
    #[arg(long)]
    pub download: bool,

    /// 不运行抽取程序
    #[arg(long)]
    pub no_extract: bool,

    /// 已存在的源文件不再下载
    #[arg(long)]
    pub skip_existing: bool,

    /// 同时运行的抽取任务数
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// 外部抽取程序
    #[arg(long)]
    pub extractor: Option<String>,

    /// 传给抽取程序的参数，可重复
    #[arg(long = "extractor-arg", allow_hyphen_values = true)]
    pub extractor_args: Vec<String>,

    /// 金标准记录输出文件（JSON）
    #[arg(long)]
    pub gold_records: Option<PathBuf>,

    /// 分类体系文件（JSON）
    #[arg(long)]
    pub taxonomy: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// 读取基础配置（配置文件或环境变量），再叠加命令行参数
    pub fn load_config(&self) -> AppResult<Config> {
        let base = match &self.config {
            Some(path) => Config::from_toml_file(path)?,
            None => Config::from_env()?,
        };
        Ok(self.apply(base))
    }

    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(v) = &self.project_root {
            config.project_root = v.clone();
        }
        if let Some(v) = &self.axcell_root {
            config.axcell_root = v.clone();
        }
        if self.download {
            config.download_papers = true;
        }
        if self.no_extract {
            config.extract_papers = false;
        }
        if self.skip_existing {
            config.skip_existing = true;
        }
        if let Some(jobs) = self.jobs {
            config.extract_jobs = jobs;
        }
        if let Some(v) = &self.extractor {
            config.extractor_program = Some(v.clone());
        }
        if !self.extractor_args.is_empty() {
            config.extractor_args = self.extractor_args.clone();
        }
        if let Some(v) = &self.gold_records {
            config.gold_records_path = Some(v.clone());
        }
        if let Some(v) = &self.taxonomy {
            config.taxonomy_path = Some(v.clone());
        }
        if self.verbose {
            config.verbose_logging = true;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "extract_sota",
            "--download",
            "--no-extract",
            "--jobs",
            "4",
            "--extractor",
            "python3",
            "--extractor-arg",
            "-m",
            "--extractor-arg",
            "axcell_extract",
            "--project-root",
            "/srv/sota",
        ]);

        let config = cli.apply(Config::default());

        assert!(config.download_papers);
        assert!(!config.extract_papers);
        assert_eq!(config.extract_jobs, 4);
        assert_eq!(config.extractor_program.as_deref(), Some("python3"));
        assert_eq!(config.extractor_args, vec!["-m", "axcell_extract"]);
        assert_eq!(config.project_root, PathBuf::from("/srv/sota"));
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::parse_from(["extract_sota"]);
        let config = cli.apply(Config::default());
        assert_eq!(config, Config::default());
    }
}
