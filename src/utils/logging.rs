/// 日志工具模块
///
/// 初始化 tracing 订阅者，并提供各阶段的日志输出辅助函数
use anyhow::Result;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志订阅者
///
/// 优先使用 `RUST_LOG`，否则 verbose 时为 debug，默认为 info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件，写入运行头
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\nSOTA e-print 抽取日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(download: bool, extract: bool, jobs: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - SOTA e-print 抽取");
    info!(
        "📥 下载: {} | 🧩 抽取: {} | 并发数: {}",
        on_off(download),
        on_off(extract),
        jobs
    );
    info!("{}", "=".repeat(60));
}

/// 记录阶段开始
///
/// # 参数
/// - `stage`: 阶段名称
/// - `total`: 待处理数量
pub fn log_stage_start(stage: &str, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("📦 {}: 共 {} 个", stage, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `retained`: 保留的论文数
/// - `validation`: 验证集论文数
/// - `records`: 保留论文的记录数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(retained: usize, validation: usize, records: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 保留论文: {}/{}", retained, validation);
    info!("📋 榜单记录: {}", records);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "开"
    } else {
        "关"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_log_file_writes_header() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("run.log");

        init_log_file(path.to_str().unwrap()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(&"=".repeat(60)));
        assert!(content.contains("SOTA e-print 抽取日志"));
    }
}
