use std::fmt;
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// e-print 下载相关错误
    Api(ApiError),
    /// 文件操作错误
    File(FileError),
    /// 标注文件解析错误
    Annotation(AnnotationError),
    /// 外部抽取程序错误
    Extraction(ExtractionError),
    /// 抽取结果一致性错误
    Consistency(ConsistencyError),
    /// 配置错误
    Config(ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Api(e) => write!(f, "下载错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Annotation(e) => write!(f, "标注错误: {}", e),
            AppError::Extraction(e) => write!(f, "抽取错误: {}", e),
            AppError::Consistency(e) => write!(f, "一致性错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Api(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Annotation(e) => Some(e),
            AppError::Extraction(e) => Some(e),
            AppError::Consistency(e) => Some(e),
            AppError::Config(e) => Some(e),
        }
    }
}

/// e-print 下载错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("请求失败 ({url}): {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: BoxedSource,
    },
    /// 服务器返回非成功状态码
    #[error("服务器返回状态码 {status} ({url})")]
    BadStatus { url: String, status: u16 },
    /// 链接无法得到文件名
    #[error("无法从链接中得到文件名: {url}")]
    NoFileName { url: String },
    /// HTTP 客户端构建失败
    #[error("HTTP 客户端初始化失败: {source}")]
    ClientBuildFailed {
        #[source]
        source: BoxedSource,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: BoxedSource,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: BoxedSource,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 标注文件解析错误
#[derive(Debug, Error)]
pub enum AnnotationError {
    /// 不是合法的 JSON
    #[error("无法解析标注 ({path}): {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// 缺少 LEADERBOARD 中的某个字段
    #[error("标注第 {entry} 项缺少字段 {field} ({path})")]
    MissingField {
        path: String,
        entry: usize,
        field: &'static str,
    },
}

/// 外部抽取程序错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 未配置抽取程序
    #[error("未配置抽取程序 (EXTRACTOR_PROGRAM)")]
    NoProgram,
    /// 抽取任务异常退出
    #[error("抽取任务执行失败 ({file}): {reason}")]
    TaskFailed { file: String, reason: String },
}

/// 抽取结果一致性错误
#[derive(Debug, Error)]
pub enum ConsistencyError {
    /// 过滤后的论文数与抽取目录数不一致
    #[error("过滤后保留 {retained} 篇论文，但抽取目录中有 {extracted} 篇")]
    ExtractedCountMismatch { retained: usize, extracted: usize },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        AppError::Api(ApiError::RequestFailed {
            url,
            source: Box::new(err),
        })
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        AppError::Api(err)
    }
}

impl From<AnnotationError> for AppError {
    fn from(err: AnnotationError) -> Self {
        AppError::Annotation(err)
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError::Extraction(err)
    }
}

impl From<ConsistencyError> for AppError {
    fn from(err: ConsistencyError) -> Self {
        AppError::Consistency(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建目录不存在错误
    pub fn directory_not_found(path: impl Into<String>) -> Self {
        AppError::File(FileError::DirectoryNotFound { path: path.into() })
    }

    /// 创建请求失败错误
    pub fn request_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
