//! 请求节流
//!
//! arXiv 的批量下载规范要求客户端主动放慢速度：每隔固定数量的请求暂停一次。
//! 参见 <https://info.arxiv.org/help/bulk_data.html#harvest>

use crate::config::Config;
use std::time::Duration;
use tracing::debug;

/// 每 `every` 个请求暂停 `pause`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    every: usize,
    pause: Duration,
}

impl Throttle {
    pub fn new(every: usize, pause: Duration) -> Self {
        Self { every, pause }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.throttle_every,
            Duration::from_millis(config.throttle_pause_ms),
        )
    }

    /// 不暂停
    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// 第 `request_index` 个请求（从 0 开始）之前是否需要暂停
    pub fn should_pause(&self, request_index: usize) -> bool {
        self.every != 0 && request_index % self.every == 0
    }

    /// 需要时在发出请求前等待
    pub async fn before_request(&self, request_index: usize) {
        if self.should_pause(request_index) && !self.pause.is_zero() {
            debug!("第 {} 个请求前暂停 {:?}", request_index, self.pause);
            tokio::time::sleep(self.pause).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pauses_every_fourth_request() {
        let throttle = Throttle::new(4, Duration::from_secs(1));
        let pauses: Vec<usize> = (0..10).filter(|&i| throttle.should_pause(i)).collect();
        assert_eq!(pauses, vec![0, 4, 8]);
    }

    #[test]
    fn test_disabled_never_pauses() {
        let throttle = Throttle::disabled();
        assert!((0..100).all(|i| !throttle.should_pause(i)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_before_request_sleeps_only_on_pause_index() {
        let throttle = Throttle::new(4, Duration::from_secs(1));
        let start = tokio::time::Instant::now();

        for i in 0..5 {
            throttle.before_request(i).await;
        }

        // 第 0 和第 4 个请求前各暂停一次
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }
}
