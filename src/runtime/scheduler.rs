//! 周期作业生成调度
//!
//! 按固定间隔调用 [`RecurringOrchestrator::generate_due`]，首次在启动时立即执行。

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::services::RecurringOrchestrator;

/// 启动后台生成任务，返回的句柄可用于停止
pub fn spawn_generation_scheduler(
    orchestrator: Arc<RecurringOrchestrator>,
    every: Duration,
) -> JoinHandle<()> {
    let every = every.max(Duration::from_millis(10));
    info!("Recurring generation scheduler started, interval {:?}", every);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            // 扫描之间串行执行，不会重叠
            if let Err(e) = orchestrator.generate_due().await {
                error!("Recurring generation sweep failed: {}", e);
            }
        }
    })
}
