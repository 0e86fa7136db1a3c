//! 计时服务 - 业务能力层
//!
//! 只负责"按秒计时"能力，不关心流程
//!
//! ## 约定
//! - 每秒递增一次，运行中重复 start 不会产生双倍计数
//! - stop 幂等；reset 先停止再清零
//! - Drop 时自动停止，保证定时任务不会泄漏

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// 测验计时器
///
/// 职责：
/// - 维护一个每秒递增的计数
/// - 提供原始秒数和 MM:SS 两种读取方式
pub struct QuizTimer {
    elapsed: Arc<AtomicU64>,
    ticker: Option<JoinHandle<()>>,
}

impl QuizTimer {
    /// 创建新的计时器，初始为 0 且未运行
    pub fn new() -> Self {
        Self {
            elapsed: Arc::new(AtomicU64::new(0)),
            ticker: None,
        }
    }

    /// 开始计时
    ///
    /// 已在运行时调用是空操作，不会注册第二个定时任务
    pub fn start(&mut self) {
        if self.ticker.is_some() {
            return;
        }

        let elapsed = Arc::clone(&self.elapsed);
        self.ticker = Some(tokio::spawn(async move {
            let mut tick = interval(Duration::from_secs(1));
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval 的第一个 tick 立即完成，先消费掉
            tick.tick().await;
            loop {
                tick.tick().await;
                elapsed.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    /// 停止计时，幂等
    pub fn stop(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    /// 停止计时并清零
    pub fn reset(&mut self) {
        self.stop();
        self.elapsed.store(0, Ordering::Relaxed);
    }

    /// 是否正在计时
    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// 已经过的整秒数
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.load(Ordering::Relaxed)
    }

    /// MM:SS 格式的已用时间
    pub fn formatted(&self) -> String {
        format_elapsed(self.elapsed_secs())
    }
}

impl Default for QuizTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for QuizTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 将秒数格式化为补零的 MM:SS
///
/// 超过 99 分钟时分钟字段自然超过两位
pub fn format_elapsed(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
