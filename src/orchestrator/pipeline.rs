//! 抽取流水线 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，按顺序驱动各个阶段：
//!
//! 1. **加载验证集**：读取论文 ID 和标注（`SotaLeaderboards`）
//! 2. **下载**：按节流规则逐个下载 e-print（可选）
//! 3. **抽取**：调用外部抽取程序处理源文件（可选）
//! 4. **过滤**：只保留已抽取的论文，并检查数量一致
//! 5. **导出**：写出金标准记录（可选）
//!
//! 本层只做调度和统计，具体能力在 `services` 与 `models` 中。

use crate::config::Config;
use crate::error::{AppError, ConsistencyError};
use crate::models::loaders::{list_subdir_names, load_leaderboards};
use crate::models::{GoldRecord, SotaLeaderboards, Taxonomy};
use crate::services::{
    list_source_files, CommandExtractor, DownloadReport, DownloadService, ExtractService,
    Extractor, StatusCounts,
};
use crate::utils::logging;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// 一次运行的结果
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    /// 验证集中的论文数
    pub validation: usize,
    pub download: Option<DownloadReport>,
    pub extraction: Option<StatusCounts>,
    /// 抽取目录中的论文数
    pub extracted: usize,
    /// 过滤后的论文表
    pub leaderboards: SotaLeaderboards,
    /// 导出的金标准记录数
    pub gold_records: Option<usize>,
}

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)
            .with_context(|| format!("无法写入日志文件: {}", config.output_log_file))?;

        logging::log_startup(
            config.download_papers,
            config.extract_papers,
            config.extract_jobs,
        );

        Ok(Self { config })
    }

    /// 不写日志文件，直接使用配置
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// 运行应用主逻辑，抽取使用配置中的外部程序
    pub async fn run(&self) -> Result<PipelineSummary> {
        if self.config.extract_papers {
            let service = ExtractService::from_config(&self.config)?;
            self.run_with(Some(&service)).await
        } else {
            self.run_with(None::<&ExtractService<CommandExtractor>>).await
        }
    }

    /// 运行应用主逻辑；`extract_service` 为 None 时跳过抽取
    pub async fn run_with<E: Extractor>(
        &self,
        extract_service: Option<&ExtractService<E>>,
    ) -> Result<PipelineSummary> {
        let sources = self.config.sources_path();
        tokio::fs::create_dir_all(&sources)
            .await
            .with_context(|| format!("无法创建源文件目录: {}", sources.display()))?;

        // ========== 加载验证集 ==========
        let mut leaderboards = load_leaderboards(&self.config.validation_root()).await?;
        let validation = leaderboards.len();

        if leaderboards.is_empty() {
            warn!("⚠️ 验证集中没有论文");
        }

        // ========== 下载 ==========
        let download = if self.config.download_papers {
            logging::log_stage_start("下载 e-print", validation);
            let ids: Vec<&str> = leaderboards.ids().collect();
            let service = DownloadService::new(&self.config)?;
            Some(service.download_all(&ids).await)
        } else {
            None
        };

        // ========== 抽取 ==========
        let extraction = match extract_service {
            Some(service) => {
                let files = list_source_files(&sources);
                logging::log_stage_start("抽取论文", files.len());
                let counts = service.extract_all(files).await?;
                info!("Results of paper extraction:");
                for line in counts.to_string().lines() {
                    info!("  {}", line);
                }
                Some(counts)
            }
            None => None,
        };

        // ========== 过滤 ==========
        let extracted: HashSet<String> = list_subdir_names(&self.config.papers_path())
            .await?
            .into_iter()
            .collect();
        info!("Successfully extracted {} papers", extracted.len());

        let dropped = leaderboards.retain_extracted(&extracted);
        if dropped > 0 {
            info!("移除了 {} 篇未抽取的论文", dropped);
        }
        check_consistency(&leaderboards, &extracted)?;

        // ========== 导出 ==========
        let gold_records = match &self.config.gold_records_path {
            Some(path) => Some(self.export_gold_records(&leaderboards, path).await?),
            None => None,
        };

        logging::print_final_stats(
            leaderboards.len(),
            validation,
            leaderboards.record_count(),
            &self.config.output_log_file,
        );

        Ok(PipelineSummary {
            validation,
            download,
            extraction,
            extracted: extracted.len(),
            leaderboards,
            gold_records,
        })
    }

    async fn export_gold_records(&self, leaderboards: &SotaLeaderboards, path: &Path) -> Result<usize> {
        let taxonomy = match &self.config.taxonomy_path {
            Some(taxonomy_path) => {
                let taxonomy = Taxonomy::load(taxonomy_path).await?;
                if taxonomy.is_empty() {
                    warn!("⚠️ 分类体系为空，不会导出任何金标准记录");
                } else {
                    info!("分类体系中共有 {} 个三元组", taxonomy.len());
                }
                Some(taxonomy)
            }
            None => None,
        };

        let records = leaderboards.gold_records(taxonomy.as_ref());
        write_gold_records(&records, path).await?;

        info!(
            "Gold records: {} 条，来自 {} 篇论文 -> {}",
            records.len(),
            SotaLeaderboards::gold_papers(&records).len(),
            path.display()
        );
        Ok(records.len())
    }
}

/// 过滤后的论文必须与抽取目录一一对应
fn check_consistency(
    leaderboards: &SotaLeaderboards,
    extracted: &HashSet<String>,
) -> Result<(), AppError> {
    if leaderboards.len() != extracted.len() {
        return Err(ConsistencyError::ExtractedCountMismatch {
            retained: leaderboards.len(),
            extracted: extracted.len(),
        }
        .into());
    }
    Ok(())
}

async fn write_gold_records(records: &[GoldRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(records)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ExtractionStatus;
    use tempfile::TempDir;

    /// 把源文件名当作 ID，在 papers/ 下建目录
    struct DirExtractor {
        papers: std::path::PathBuf,
    }

    impl Extractor for DirExtractor {
        async fn extract(&self, file: &Path) -> ExtractionStatus {
            let Some(name) = file.file_name() else {
                return ExtractionStatus::new("no-name");
            };
            match tokio::fs::create_dir_all(self.papers.join(name)).await {
                Ok(()) => ExtractionStatus::new("success"),
                Err(_) => ExtractionStatus::new("io-error"),
            }
        }
    }

    fn fixture(ids: &[(&str, &str)]) -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let project_root = dir.path().join("sota");
        let axcell_root = dir.path().join("axcell");
        let validation = project_root.join("dataset").join("validation");
        for (id, annotations) in ids {
            std::fs::create_dir_all(validation.join(id)).unwrap();
            std::fs::write(validation.join(id).join("annotations.json"), annotations).unwrap();
        }
        std::fs::create_dir_all(axcell_root.join("papers")).unwrap();

        let config = Config {
            project_root,
            axcell_root,
            download_papers: false,
            extract_papers: false,
            output_log_file: dir.path().join("run.log").display().to_string(),
            ..Config::default()
        };
        (dir, config)
    }

    const ONE_RECORD: &str = "[{'LEADERBOARD': {'Task': 'Image Classification', \
        'Dataset': 'ImageNet', 'Metric': 'Top 1 Accuracy', 'Score': '78.6'}}]";

    #[tokio::test]
    async fn test_filters_to_extracted_papers() {
        let (_dir, config) = fixture(&[
            ("1512.03385", ONE_RECORD),
            ("1706.03762", "unanswerable"),
            ("2001.00001", "unanswerable"),
        ]);
        let sources = config.sources_path();
        std::fs::create_dir_all(&sources).unwrap();
        std::fs::write(sources.join("1512.03385"), "tar").unwrap();
        std::fs::write(sources.join("1706.03762"), "tar").unwrap();

        let app = App::with_config(config.clone());
        let service = ExtractService::new(
            DirExtractor {
                papers: config.papers_path(),
            },
            2,
        );

        let summary = app.run_with(Some(&service)).await.unwrap();

        assert_eq!(summary.validation, 3);
        assert_eq!(summary.extracted, 2);
        // 只抽取 sources/ 中的两个文件，而不是验证集中的三篇
        let extraction = summary.extraction.as_ref().unwrap();
        assert_eq!(extraction.total(), 2);
        assert_eq!(extraction.get("success"), 2);
        assert_eq!(
            summary.leaderboards.ids().collect::<Vec<_>>(),
            vec!["1512.03385", "1706.03762"]
        );
        assert!(summary.download.is_none());
    }

    #[tokio::test]
    async fn test_mismatch_when_extracted_dir_has_unknown_id() {
        let (_dir, config) = fixture(&[("1512.03385", ONE_RECORD)]);
        std::fs::create_dir_all(config.papers_path().join("1512.03385")).unwrap();
        std::fs::create_dir_all(config.papers_path().join("9999.99999")).unwrap();

        let app = App::with_config(config);
        let err = app
            .run_with(None::<&ExtractService<CommandExtractor>>)
            .await
            .unwrap_err();

        let err = err.downcast::<AppError>().unwrap();
        assert!(matches!(
            err,
            AppError::Consistency(ConsistencyError::ExtractedCountMismatch {
                retained: 1,
                extracted: 2
            })
        ));
    }

    #[tokio::test]
    async fn test_exports_gold_records_with_taxonomy() {
        let two_records = "[{'LEADERBOARD': {'Task': 'Image Classification', 'Dataset': 'ImageNet', \
            'Metric': 'Top 1 Accuracy', 'Score': '78.6'}}, {'LEADERBOARD': {'Task': 'Image Classification', \
            'Dataset': 'ImageNet', 'Metric': 'Top 5 Accuracy', 'Score': '94.3'}}]";
        let (dir, mut config) = fixture(&[("1512.03385", two_records)]);
        std::fs::create_dir_all(config.papers_path().join("1512.03385")).unwrap();
        let taxonomy_path = dir.path().join("taxonomy.json");
        std::fs::write(
            &taxonomy_path,
            r#"[["Image Classification", "ImageNet", "Top 1 Accuracy"]]"#,
        )
        .unwrap();
        let gold_path = dir.path().join("out").join("gold.json");
        config.taxonomy_path = Some(taxonomy_path);
        config.gold_records_path = Some(gold_path.clone());

        let app = App::with_config(config);
        let summary = app.run().await.unwrap();

        assert_eq!(summary.gold_records, Some(1));
        let written: Vec<GoldRecord> =
            serde_json::from_str(&std::fs::read_to_string(&gold_path).unwrap()).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].arxiv_id, "1512.03385");
        assert_eq!(written[0].value, "78.6");
    }

    #[tokio::test]
    async fn test_empty_taxonomy_exports_no_records() {
        let (dir, mut config) = fixture(&[("1512.03385", ONE_RECORD)]);
        std::fs::create_dir_all(config.papers_path().join("1512.03385")).unwrap();
        let taxonomy_path = dir.path().join("taxonomy.json");
        std::fs::write(&taxonomy_path, "[]").unwrap();
        let gold_path = dir.path().join("gold.json");
        config.taxonomy_path = Some(taxonomy_path);
        config.gold_records_path = Some(gold_path.clone());

        let summary = App::with_config(config).run().await.unwrap();

        assert_eq!(summary.gold_records, Some(0));
        assert_eq!(std::fs::read_to_string(&gold_path).unwrap().trim(), "[]");
    }
}
