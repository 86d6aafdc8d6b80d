use crate::error::{AppError, AppResult, ConfigError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 程序配置
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// SOTA 数据集根目录
    pub project_root: PathBuf,
    /// 抽取工作目录（其下有 sources/ 与 papers/）
    pub axcell_root: PathBuf,
    /// 是否下载 e-print
    pub download_papers: bool,
    /// 是否运行抽取程序
    pub extract_papers: bool,
    /// 已存在的源文件是否跳过下载
    pub skip_existing: bool,
    // --- 下载配置 ---
    pub eprint_base_url: String,
    /// 每隔多少个请求暂停一次，0 表示不暂停
    pub throttle_every: usize,
    pub throttle_pause_ms: u64,
    pub http_timeout_secs: u64,
    // --- 抽取配置 ---
    pub extractor_program: Option<String>,
    /// 放在文件路径之前的参数。`EXTRACTOR_ARGS` 按空白切分，不支持引号；
    /// 含空格的参数请写在 TOML 的 `extractor_args` 数组里或用 `--extractor-arg`
    pub extractor_args: Vec<String>,
    /// 同时运行的抽取任务数
    pub extract_jobs: usize,
    // --- 输出配置 ---
    pub gold_records_path: Option<PathBuf>,
    pub taxonomy_path: Option<PathBuf>,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("/home/jakub.suran/netstore1/COS470/project/sota"),
            axcell_root: PathBuf::from("/home/jakub.suran/netstore1/COS470/axcell/data_sota"),
            download_papers: false,
            extract_papers: true,
            skip_existing: false,
            eprint_base_url: "http://export.arxiv.org/e-print".to_string(),
            throttle_every: 4,
            throttle_pause_ms: 1000,
            http_timeout_secs: 120,
            extractor_program: None,
            extractor_args: Vec::new(),
            extract_jobs: 1,
            gold_records_path: None,
            taxonomy_path: None,
            output_log_file: "extract_sota.log".to_string(),
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件结构，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    project_root: Option<PathBuf>,
    axcell_root: Option<PathBuf>,
    download_papers: Option<bool>,
    extract_papers: Option<bool>,
    skip_existing: Option<bool>,
    eprint_base_url: Option<String>,
    throttle_every: Option<usize>,
    throttle_pause_ms: Option<u64>,
    http_timeout_secs: Option<u64>,
    extractor_program: Option<String>,
    extractor_args: Option<Vec<String>>,
    extract_jobs: Option<usize>,
    gold_records_path: Option<PathBuf>,
    taxonomy_path: Option<PathBuf>,
    output_log_file: Option<String>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 默认值叠加环境变量
    pub fn from_env() -> AppResult<Self> {
        Self::default().apply_env()
    }

    /// 读取 TOML 配置文件，再叠加环境变量
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content, path)?.apply_env()
    }

    fn from_toml_str(content: &str, path: &Path) -> AppResult<Self> {
        let file: FileConfig = toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })?;

        let mut config = Self::default();
        macro_rules! take {
            ($($field:ident),*) => {
                $(if let Some(v) = file.$field { config.$field = v; })*
            };
        }
        take!(
            project_root,
            axcell_root,
            download_papers,
            extract_papers,
            skip_existing,
            eprint_base_url,
            throttle_every,
            throttle_pause_ms,
            http_timeout_secs,
            extractor_args,
            extract_jobs,
            output_log_file,
            verbose_logging
        );
        config.extractor_program = file.extractor_program.or(config.extractor_program);
        config.gold_records_path = file.gold_records_path.or(config.gold_records_path);
        config.taxonomy_path = file.taxonomy_path.or(config.taxonomy_path);
        Ok(config)
    }

    fn apply_env(mut self) -> AppResult<Self> {
        if let Some(v) = env_var("PROJECT_ROOT") {
            self.project_root = PathBuf::from(v);
        }
        if let Some(v) = env_var("AXCELL_SOTA_ROOT") {
            self.axcell_root = PathBuf::from(v);
        }
        self.download_papers = env_parse("DOWNLOAD_PAPERS", "bool")?.unwrap_or(self.download_papers);
        self.extract_papers = env_parse("EXTRACT_PAPERS", "bool")?.unwrap_or(self.extract_papers);
        self.skip_existing = env_parse("SKIP_EXISTING", "bool")?.unwrap_or(self.skip_existing);
        self.eprint_base_url = env_var("EPRINT_BASE_URL").unwrap_or(self.eprint_base_url);
        self.throttle_every = env_parse("THROTTLE_EVERY", "usize")?.unwrap_or(self.throttle_every);
        self.throttle_pause_ms =
            env_parse("THROTTLE_PAUSE_MS", "u64")?.unwrap_or(self.throttle_pause_ms);
        self.http_timeout_secs =
            env_parse("HTTP_TIMEOUT_SECS", "u64")?.unwrap_or(self.http_timeout_secs);
        self.extractor_program = env_var("EXTRACTOR_PROGRAM").or(self.extractor_program);
        if let Some(v) = env_var("EXTRACTOR_ARGS") {
            self.extractor_args = split_args(&v);
        }
        self.extract_jobs = env_parse("EXTRACT_JOBS", "usize")?.unwrap_or(self.extract_jobs);
        self.gold_records_path = env_var("GOLD_RECORDS_PATH")
            .map(PathBuf::from)
            .or(self.gold_records_path);
        self.taxonomy_path = env_var("TAXONOMY_PATH").map(PathBuf::from).or(self.taxonomy_path);
        self.output_log_file = env_var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file);
        self.verbose_logging = env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging);
        Ok(self)
    }

    /// 验证集目录: `<project_root>/dataset/validation`
    pub fn validation_root(&self) -> PathBuf {
        self.project_root.join("dataset").join("validation")
    }

    /// 源文件目录: `<axcell_root>/sources`
    pub fn sources_path(&self) -> PathBuf {
        self.axcell_root.join("sources")
    }

    /// 抽取结果目录: `<axcell_root>/papers`
    pub fn papers_path(&self) -> PathBuf {
        self.axcell_root.join("papers")
    }
}

/// 按空白切分，不处理引号和转义
fn split_args(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str, expected_type: &'static str) -> AppResult<Option<T>> {
    match env_var(name) {
        None => Ok(None),
        Some(value) => value.trim().parse().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: name.to_string(),
                value,
                expected_type,
            }
            .into()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_paths() {
        let config = Config {
            project_root: PathBuf::from("/data/sota"),
            axcell_root: PathBuf::from("/data/axcell"),
            ..Config::default()
        };

        assert_eq!(config.validation_root(), PathBuf::from("/data/sota/dataset/validation"));
        assert_eq!(config.sources_path(), PathBuf::from("/data/axcell/sources"));
        assert_eq!(config.papers_path(), PathBuf::from("/data/axcell/papers"));
    }

    #[test]
    fn test_defaults_match_fair_use_policy() {
        let config = Config::default();
        assert_eq!(config.throttle_every, 4);
        assert_eq!(config.throttle_pause_ms, 1000);
        assert!(!config.download_papers);
        assert!(config.extract_papers);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let content = r#"
            project_root = "/srv/sota"
            download_papers = true
            extract_jobs = 8
            extractor_program = "axcell-extract"
            extractor_args = ["--quiet"]
        "#;

        let config = Config::from_toml_str(content, Path::new("test.toml")).unwrap();
        assert_eq!(config.project_root, PathBuf::from("/srv/sota"));
        assert!(config.download_papers);
        assert_eq!(config.extract_jobs, 8);
        assert_eq!(config.extractor_program.as_deref(), Some("axcell-extract"));
        assert_eq!(config.extractor_args, vec!["--quiet".to_string()]);
        // 未出现的字段保持默认
        assert_eq!(config.throttle_every, 4);
    }

    #[test]
    fn test_toml_rejects_unknown_field() {
        let err = Config::from_toml_str("no_such_field = 1", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::TomlParseFailed { .. })));
    }

    #[test]
    fn test_env_extractor_args_split_on_whitespace() {
        assert_eq!(split_args("  --gpu 0\t--fast "), vec!["--gpu", "0", "--fast"]);
        // 引号不被识别
        assert_eq!(split_args("'a b'"), vec!["'a", "b'"]);
        assert!(split_args("   ").is_empty());
    }
}
