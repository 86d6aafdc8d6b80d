//! # extract_sota
//!
//! 为 SOTA 榜单数据集的验证集准备论文源文件，并整理标注中的榜单记录
//!
//! ## 架构设计
//!
//! ### ① 数据层（Models）
//! - `models/` - 榜单记录、论文表、分类体系
//! - `loaders` - 读取验证集目录和 `annotations.json`
//!
//! ### ② 客户端（Clients）
//! - `EprintClient` - 构造 arXiv e-print 链接并下载源文件
//!
//! ### ③ 业务能力层（Services）
//! - `DownloadService` - 按节流规则顺序下载
//! - `ExtractService` - 调用外部抽取程序，限制并发，统计状态
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/pipeline` - 加载 → 下载 → 抽取 → 过滤 → 导出
//!
//! ## 模块结构

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{LeaderboardRecord, LeaderboardTable, PaperEntry, SotaLeaderboards};
pub use orchestrator::{App, PipelineSummary};
