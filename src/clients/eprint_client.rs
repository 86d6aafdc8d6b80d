/// arXiv e-print 客户端
///
/// 负责构造下载链接并把源文件写入本地目录
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("extract_sota/", env!("CARGO_PKG_VERSION"));

/// 构造 e-print 下载链接
pub fn eprint_link(base_url: &str, arxiv_id: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), arxiv_id)
}

/// 链接最后一段作为保存的文件名
pub fn link_filename(link: &str) -> Option<&str> {
    link.rsplit('/').next().filter(|name| !name.is_empty())
}

/// 单次下载结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    pub path: PathBuf,
    pub bytes: u64,
}

/// arXiv e-print 客户端
pub struct EprintClient {
    client: reqwest::Client,
    base_url: String,
}

impl EprintClient {
    /// 创建新的 e-print 客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ApiError::ClientBuildFailed {
                source: Box::new(e),
            })?;

        Ok(Self {
            client,
            base_url: config.eprint_base_url.clone(),
        })
    }

    /// 某篇论文的下载链接
    pub fn link(&self, arxiv_id: &str) -> String {
        eprint_link(&self.base_url, arxiv_id)
    }

    /// 下载链接指向的文件，保存到 `dest_dir/<链接最后一段>`
    pub async fn download(&self, link: &str, dest_dir: &Path) -> AppResult<Downloaded> {
        let filename = link_filename(link).ok_or_else(|| ApiError::NoFileName {
            url: link.to_string(),
        })?;
        let path = dest_dir.join(filename);

        debug!("下载 {} -> {}", link, path.display());

        let response = self
            .client
            .get(link)
            .send()
            .await
            .map_err(|e| AppError::request_failed(link, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::BadStatus {
                url: link.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::request_failed(link, e))?;

        tokio::fs::write(&path, &body)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

        debug!("已保存 {} 字节: {}", body.len(), path.display());

        Ok(Downloaded {
            path,
            bytes: body.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_for(server_url: &str) -> Config {
        Config {
            eprint_base_url: format!("{}/e-print", server_url),
            ..Config::default()
        }
    }

    #[test]
    fn test_eprint_link_format() {
        assert_eq!(
            eprint_link("http://export.arxiv.org/e-print", "1706.03762"),
            "http://export.arxiv.org/e-print/1706.03762"
        );
        assert_eq!(
            eprint_link("http://export.arxiv.org/e-print/", "1706.03762"),
            "http://export.arxiv.org/e-print/1706.03762"
        );
    }

    #[test]
    fn test_link_filename_is_last_segment() {
        assert_eq!(
            link_filename("http://export.arxiv.org/e-print/1706.03762"),
            Some("1706.03762")
        );
        // 旧格式 ID 只保留最后一段
        assert_eq!(
            link_filename("http://export.arxiv.org/e-print/hep-th/9901001"),
            Some("9901001")
        );
        assert_eq!(link_filename("http://export.arxiv.org/e-print/"), None);
    }

    #[tokio::test]
    async fn test_download_writes_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/e-print/1706.03762")
            .with_status(200)
            .with_header("content-type", "application/x-eprint-tar")
            .with_body(b"tarball-bytes".to_vec())
            .expect(1)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let client = EprintClient::new(&config_for(&server.url())).unwrap();
        let link = client.link("1706.03762");

        let downloaded = client.download(&link, dir.path()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(downloaded.path, dir.path().join("1706.03762"));
        assert_eq!(downloaded.bytes, 13);
        assert_eq!(std::fs::read(&downloaded.path).unwrap(), b"tarball-bytes");
    }

    #[tokio::test]
    async fn test_download_rejects_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/e-print/0000.00000")
            .with_status(404)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let client = EprintClient::new(&config_for(&server.url())).unwrap();
        let link = client.link("0000.00000");

        let err = client.download(&link, dir.path()).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Api(ApiError::BadStatus { status: 404, .. })
        ));
        assert!(!dir.path().join("0000.00000").exists());
    }
}
