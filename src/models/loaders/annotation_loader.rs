use crate::error::{AnnotationError, AppError, AppResult};
use crate::models::arxiv_id;
use crate::models::leaderboard::{LeaderboardRecord, LeaderboardTable, PaperEntry, SotaLeaderboards};
use serde_json::Value;
use std::path::Path;
use tokio::fs;

/// 无法回答的论文使用的标注内容
pub const UNANSWERABLE: &str = "unanswerable";

/// 每个 ID 目录下的标注文件名
pub const ANNOTATIONS_FILE: &str = "annotations.json";

/// 解析一份标注内容
///
/// 内容为 `unanswerable` 时返回空列表；否则把单引号替换为双引号后按 JSON 数组解析，
/// 每个元素形如 `{"LEADERBOARD": {"Task", "Dataset", "Metric", "Score"}}`。
pub fn parse_annotations(content: &str, path: &str) -> AppResult<Vec<LeaderboardRecord>> {
    if content.trim() == UNANSWERABLE {
        return Ok(Vec::new());
    }

    let content = content.replace('\'', "\"");
    let entries: Vec<Value> =
        serde_json::from_str(&content).map_err(|source| AnnotationError::Malformed {
            path: path.to_string(),
            source,
        })?;

    entries
        .iter()
        .enumerate()
        .map(|(entry, value)| -> Result<LeaderboardRecord, AnnotationError> {
            let leaderboard = value.get("LEADERBOARD").ok_or(AnnotationError::MissingField {
                path: path.to_string(),
                entry,
                field: "LEADERBOARD",
            })?;
            let field = |name: &'static str| -> Result<String, AnnotationError> {
                leaderboard
                    .get(name)
                    .map(value_to_string)
                    .ok_or(AnnotationError::MissingField {
                        path: path.to_string(),
                        entry,
                        field: name,
                    })
            };

            Ok(LeaderboardRecord {
                task: field("Task")?,
                dataset: field("Dataset")?,
                metric: field("Metric")?,
                value: field("Score")?,
            })
        })
        .collect::<Result<Vec<_>, AnnotationError>>()
        .map_err(AppError::from)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 读取并解析单个标注文件
pub async fn load_annotation_file(path: &Path) -> AppResult<Vec<LeaderboardRecord>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
    parse_annotations(&content, &path.display().to_string())
}

/// 列出目录下所有子目录的名称，排序后返回
pub async fn list_subdir_names(root: &Path) -> AppResult<Vec<String>> {
    if !fs::try_exists(root).await.unwrap_or(false) {
        return Err(AppError::directory_not_found(root.display().to_string()));
    }

    let mut names = Vec::new();
    let mut entries = fs::read_dir(root)
        .await
        .map_err(|e| AppError::file_read_failed(root.display().to_string(), e))?;

    while let Some(entry) = entries.next_entry().await? {
        // 跟随符号链接
        let is_dir = fs::metadata(entry.path())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if is_dir {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    names.sort();
    Ok(names)
}

/// 从验证集目录读取所有论文 ID
pub async fn load_validation_ids(validation_root: &Path) -> AppResult<Vec<String>> {
    let ids = list_subdir_names(validation_root).await?;
    for id in ids.iter().filter(|id| !arxiv_id::is_well_formed(id)) {
        tracing::warn!("⚠️ 目录名不像 arXiv ID，仍按 ID 处理: {}", id);
    }
    tracing::info!("验证集中共有 {} 个论文 ID", ids.len());
    Ok(ids)
}

/// 加载验证集：每个 ID 一篇论文，附带由标注生成的一张表
pub async fn load_leaderboards(validation_root: &Path) -> AppResult<SotaLeaderboards> {
    let ids = load_validation_ids(validation_root).await?;
    let mut entries = Vec::with_capacity(ids.len());
    let mut unanswerable = 0;

    for arxiv_id in ids {
        let annotations_file = validation_root.join(&arxiv_id).join(ANNOTATIONS_FILE);
        let records = load_annotation_file(&annotations_file).await?;
        if records.is_empty() {
            unanswerable += 1;
        }
        tracing::debug!("{}: {} 条榜单记录", arxiv_id, records.len());

        entries.push(PaperEntry {
            arxiv_id,
            tables: vec![LeaderboardTable::from_annotations(records)],
        });
    }

    let boards = SotaLeaderboards::from_entries(entries);
    tracing::info!(
        "成功加载 {} 篇论文的标注，共 {} 条记录（{} 篇没有记录）",
        boards.len(),
        boards.record_count(),
        unanswerable
    );
    Ok(boards)
}
