use anyhow::Result;
use clap::Parser;
use extract_sota::cli::Cli;
use extract_sota::utils::logging;
use extract_sota::App;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = cli.load_config()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let summary = App::initialize(config)?.run().await?;

    if let Some(report) = &summary.download {
        if !report.failed.is_empty() {
            tracing::warn!("以下 e-print 下载失败:");
            for (arxiv_id, reason) in &report.failed {
                tracing::warn!("  {}: {}", arxiv_id, reason);
            }
        }
    }

    Ok(())
}
