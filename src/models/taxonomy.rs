//! (task, dataset, metric) 分类体系

use crate::error::{AnnotationError, AppError, AppResult};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum TaxonomyEntry {
    Triple([String; 3]),
    Object {
        task: String,
        dataset: String,
        metric: String,
    },
}

/// 分类体系：评测程序能识别的三元组集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomy {
    triples: HashSet<(String, String, String)>,
}

impl Taxonomy {
    pub fn from_triples<I, S>(triples: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: Into<String>,
    {
        Self {
            triples: triples
                .into_iter()
                .map(|(t, d, m)| (t.into(), d.into(), m.into()))
                .collect(),
        }
    }

    /// 解析 JSON 数组，元素可以是 `[task, dataset, metric]` 或对象
    pub fn from_json(content: &str, path: &str) -> AppResult<Self> {
        let entries: Vec<TaxonomyEntry> =
            serde_json::from_str(content).map_err(|source| AnnotationError::Malformed {
                path: path.to_string(),
                source,
            })?;

        Ok(Self {
            triples: entries
                .into_iter()
                .map(|entry| match entry {
                    TaxonomyEntry::Triple([t, d, m]) => (t, d, m),
                    TaxonomyEntry::Object {
                        task,
                        dataset,
                        metric,
                    } => (task, dataset, metric),
                })
                .collect(),
        })
    }

    pub async fn load(path: &Path) -> AppResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_json(&content, &path.display().to_string())
    }

    pub fn contains(&self, (task, dataset, metric): (&str, &str, &str)) -> bool {
        self.triples
            .contains(&(task.to_string(), dataset.to_string(), metric.to_string()))
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_accepts_both_shapes() {
        let content = r#"[
            ["Image Classification", "ImageNet", "Top 1 Accuracy"],
            {"task": "Machine Translation", "dataset": "WMT2014 English-German", "metric": "BLEU score"}
        ]"#;

        let taxonomy = Taxonomy::from_json(content, "taxonomy.json").unwrap();

        assert_eq!(taxonomy.len(), 2);
        assert!(taxonomy.contains(("Image Classification", "ImageNet", "Top 1 Accuracy")));
        assert!(taxonomy.contains(("Machine Translation", "WMT2014 English-German", "BLEU score")));
        assert!(!taxonomy.contains(("Image Classification", "ImageNet", "Top 5 Accuracy")));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = Taxonomy::from_json("{\"task\": 1}", "taxonomy.json").unwrap_err();
        assert!(matches!(err, AppError::Annotation(AnnotationError::Malformed { .. })));
    }
}
