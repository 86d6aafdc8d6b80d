//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::pipeline (整个验证集)
//!     ↓
//! services (下载 / 抽取 / 节流)
//!     ↓
//! clients (arXiv e-print) + models (标注、论文表)
//! ```

pub mod pipeline;

// 重新导出主要类型
pub use pipeline::{App, PipelineSummary};
