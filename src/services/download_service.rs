//! e-print 下载服务
//!
//! 按顺序逐个下载，不做并发：节流本身就是目的。

use crate::clients::{link_filename, EprintClient};
use crate::config::Config;
use crate::error::AppResult;
use crate::services::throttle::Throttle;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{info, warn};

/// 下载统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub downloaded: usize,
    pub skipped: usize,
    /// (arxiv_id, 错误信息)
    pub failed: Vec<(String, String)>,
    pub bytes: u64,
}

impl DownloadReport {
    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.failed.len()
    }
}

/// e-print 下载服务
pub struct DownloadService {
    client: EprintClient,
    throttle: Throttle,
    sources_path: PathBuf,
    skip_existing: bool,
}

impl DownloadService {
    pub fn new(config: &Config) -> AppResult<Self> {
        Ok(Self {
            client: EprintClient::new(config)?,
            throttle: Throttle::from_config(config),
            sources_path: config.sources_path(),
            skip_existing: config.skip_existing,
        })
    }

    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    /// 依次下载所有论文的 e-print
    ///
    /// 单篇失败只记录，不中断整批下载。
    pub async fn download_all<S: AsRef<str>>(&self, arxiv_ids: &[S]) -> DownloadReport {
        let mut report = DownloadReport::default();
        let progress = progress_bar(arxiv_ids.len() as u64, "Downloading eprints...");
        let mut request_index = 0;

        for arxiv_id in arxiv_ids {
            let arxiv_id = arxiv_id.as_ref();
            let link = self.client.link(arxiv_id);

            if self.skip_existing && self.already_downloaded(&link) {
                report.skipped += 1;
                progress.inc(1);
                continue;
            }

            self.throttle.before_request(request_index).await;
            request_index += 1;

            match self.client.download(&link, &self.sources_path).await {
                Ok(downloaded) => {
                    report.downloaded += 1;
                    report.bytes += downloaded.bytes;
                }
                Err(e) => {
                    progress.suspend(|| warn!("❌ 下载 {} 失败: {}", arxiv_id, e));
                    report.failed.push((arxiv_id.to_string(), e.to_string()));
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();

        info!("Downloaded {} eprints", report.downloaded);
        if report.skipped > 0 {
            info!("跳过已存在的 {} 个源文件", report.skipped);
        }
        if !report.failed.is_empty() {
            warn!("⚠️ {} 个 e-print 下载失败", report.failed.len());
        }

        report
    }

    fn already_downloaded(&self, link: &str) -> bool {
        link_filename(link)
            .map(|name| self.sources_path.join(name).is_file())
            .unwrap_or(false)
    }
}

pub(crate) fn progress_bar(len: u64, message: &'static str) -> ProgressBar {
    let progress = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed_precise}, eta {eta})")
    {
        progress.set_style(style.progress_chars("=>-"));
    }
    progress.set_message(message);
    progress
}
