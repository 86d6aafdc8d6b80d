use crate::models::taxonomy::Taxonomy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 一条榜单记录 (task, dataset, metric, value)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaderboardRecord {
    pub task: String,
    pub dataset: String,
    pub metric: String,
    pub value: String,
}

impl LeaderboardRecord {
    /// (task, dataset, metric) 三元组
    pub fn tdm(&self) -> (&str, &str, &str) {
        (&self.task, &self.dataset, &self.metric)
    }
}

/// 论文中的一张表及其榜单记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardTable {
    pub index: usize,
    pub records: Vec<LeaderboardRecord>,
}

impl LeaderboardTable {
    /// 由标注生成的表，index 固定为 0
    pub fn from_annotations(records: Vec<LeaderboardRecord>) -> Self {
        Self { index: 0, records }
    }
}

/// 一篇论文：arXiv ID 及其表格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperEntry {
    pub arxiv_id: String,
    pub tables: Vec<LeaderboardTable>,
}

impl PaperEntry {
    pub fn new(arxiv_id: impl Into<String>) -> Self {
        Self {
            arxiv_id: arxiv_id.into(),
            tables: Vec::new(),
        }
    }

    /// 所有表中的记录数
    pub fn record_count(&self) -> usize {
        self.tables.iter().map(|t| t.records.len()).sum()
    }
}

/// 展平后的金标准记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldRecord {
    pub arxiv_id: String,
    pub task: String,
    pub dataset: String,
    pub metric: String,
    pub value: String,
}

/// 验证集论文表，按 arXiv ID 保持加载顺序
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SotaLeaderboards {
    entries: Vec<PaperEntry>,
}

impl SotaLeaderboards {
    /// 只有 ID、没有表格的论文表
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: ids.into_iter().map(PaperEntry::new).collect(),
        }
    }

    pub fn from_entries(entries: Vec<PaperEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaperEntry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.arxiv_id.as_str())
    }

    pub fn get(&self, arxiv_id: &str) -> Option<&PaperEntry> {
        self.entries.iter().find(|e| e.arxiv_id == arxiv_id)
    }

    /// 所有论文的记录总数
    pub fn record_count(&self) -> usize {
        self.entries.iter().map(PaperEntry::record_count).sum()
    }

    /// 只保留已被抽取的论文，返回被移除的数量
    pub fn retain_extracted(&mut self, extracted: &HashSet<String>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| extracted.contains(&e.arxiv_id));
        before - self.entries.len()
    }

    /// 展平为金标准记录；给定分类体系时只保留其中的 (task, dataset, metric)
    pub fn gold_records(&self, taxonomy: Option<&Taxonomy>) -> Vec<GoldRecord> {
        let mut gold = Vec::new();
        for paper in &self.entries {
            for table in &paper.tables {
                for record in &table.records {
                    if let Some(taxonomy) = taxonomy {
                        if !taxonomy.contains(record.tdm()) {
                            continue;
                        }
                    }
                    gold.push(GoldRecord {
                        arxiv_id: paper.arxiv_id.clone(),
                        task: record.task.clone(),
                        dataset: record.dataset.clone(),
                        metric: record.metric.clone(),
                        value: record.value.clone(),
                    });
                }
            }
        }
        gold
    }

    /// 金标准记录涉及的论文，去重后排序
    pub fn gold_papers(records: &[GoldRecord]) -> Vec<String> {
        let mut papers: Vec<String> = records.iter().map(|r| r.arxiv_id.clone()).collect();
        papers.sort();
        papers.dedup();
        papers
    }
}

impl<'a> IntoIterator for &'a SotaLeaderboards {
    type Item = &'a PaperEntry;
    type IntoIter = std::slice::Iter<'a, PaperEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
