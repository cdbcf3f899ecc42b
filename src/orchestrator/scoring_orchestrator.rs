//! 后台采点编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **提交样本**：调用采点接口拿到任务ID
//! 2. **后台轮询**：每个任务一个 tokio 任务，按固定间隔查询状态
//! 3. **结果投递**：终态结果通过 mpsc 通道送回会话控制器
//! 4. **生命周期**：持有所有轮询句柄，可以统一取消或等待
//!
//! 提交失败时在本地合成一个失败任务，同样通过通道投递，
//! 会话控制器无需区分两种失败。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::ScoringApi;
use crate::config::Config;
use crate::models::{
    HandwritingSample, HandwritingSubmission, QuestionId, RemoteStatus, ScoringTask, TaskId,
};
use crate::workflow::QuestionCtx;

/// 投递给会话控制器的终态事件
#[derive(Debug, Clone)]
pub struct ScoringEvent {
    /// 提交时的会话代数
    pub generation: u64,
    pub task: ScoringTask,
}

/// 提交后立即返回的非终态回执
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringAck {
    pub task_id: TaskId,
    pub question_id: QuestionId,
    /// 提交本身是否被采点服务受理
    pub accepted: bool,
}

/// 后台采点编排器
pub struct ScoringOrchestrator {
    api: Arc<dyn ScoringApi>,
    interval: Duration,
    max_attempts: u32,
    tx: UnboundedSender<ScoringEvent>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    local_seq: AtomicU64,
}

impl ScoringOrchestrator {
    /// 按配置创建编排器，同时返回事件接收端
    pub fn new(
        api: Arc<dyn ScoringApi>,
        config: &Config,
    ) -> (Self, UnboundedReceiver<ScoringEvent>) {
        Self::with_settings(api, config.poll_interval(), config.max_poll_attempts)
    }

    pub fn with_settings(
        api: Arc<dyn ScoringApi>,
        interval: Duration,
        max_attempts: u32,
    ) -> (Self, UnboundedReceiver<ScoringEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let orchestrator = Self {
            api,
            interval,
            max_attempts: max_attempts.max(1),
            tx,
            handles: Mutex::new(Vec::new()),
            local_seq: AtomicU64::new(0),
        };
        (orchestrator, rx)
    }

    /// 提交手写样本
    ///
    /// 不等待采点结果；无论提交是否成功都返回非终态回执
    pub async fn submit(
        &self,
        ctx: &QuestionCtx,
        expected_answer: &str,
        sample: HandwritingSample,
    ) -> ScoringAck {
        let submission = HandwritingSubmission {
            image_data: sample.image_data,
            question_id: ctx.question_id.to_string(),
            expected_answer: expected_answer.to_string(),
        };

        match self.api.submit_handwriting(&submission).await {
            Ok(task_id) => {
                info!("{} 📤 已提交手写采点, 任务 {}", ctx, task_id);

                let mut task = ScoringTask::new(task_id.clone(), ctx.question_id.clone());
                task.begin_polling();
                self.spawn_poll(ctx.generation, task);

                ScoringAck {
                    task_id,
                    question_id: ctx.question_id.clone(),
                    accepted: true,
                }
            }
            Err(e) => {
                warn!("{} ⚠️ 手写采点提交失败, 按不正确处理: {}", ctx, e);

                let seq = self.local_seq.fetch_add(1, Ordering::Relaxed);
                let task_id = TaskId(format!("local-failed-{}-{}", ctx.question_id, seq));
                let mut task = ScoringTask::new(task_id.clone(), ctx.question_id.clone());
                task.fail();
                self.deliver(ScoringEvent {
                    generation: ctx.generation,
                    task,
                });

                ScoringAck {
                    task_id,
                    question_id: ctx.question_id.clone(),
                    accepted: false,
                }
            }
        }
    }

    /// 取消所有还在轮询的任务
    pub fn cancel_all(&self) {
        let handles: Vec<_> = self.handles().drain(..).collect();
        let running = handles.iter().filter(|h| !h.is_finished()).count();
        for handle in handles {
            handle.abort();
        }
        if running > 0 {
            info!("🛑 已取消 {} 个采点轮询任务", running);
        }
    }

    /// 还在轮询的任务数
    pub fn in_flight(&self) -> usize {
        self.handles().iter().filter(|h| !h.is_finished()).count()
    }

    /// 等待所有已启动的轮询结束
    pub async fn wait_idle(&self) {
        let handles: Vec<_> = self.handles().drain(..).collect();
        join_all(handles).await;
    }

    fn spawn_poll(&self, generation: u64, task: ScoringTask) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let interval = self.interval;
        let max_attempts = self.max_attempts;

        let handle = tokio::spawn(async move {
            let task = poll_until_terminal(api.as_ref(), task, interval, max_attempts).await;
            if tx.send(ScoringEvent { generation, task }).is_err() {
                debug!("会话已释放, 丢弃采点结果");
            }
        });

        let mut handles = self.handles();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    fn deliver(&self, event: ScoringEvent) {
        if self.tx.send(event).is_err() {
            debug!("会话已释放, 丢弃采点结果");
        }
    }

    fn handles(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ScoringOrchestrator {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// 轮询直到终态
///
/// 每次先等待一个间隔再查询；最多查询 `max_attempts` 次。
/// 网络错误计入次数但不中断轮询。
pub async fn poll_until_terminal(
    api: &dyn ScoringApi,
    mut task: ScoringTask,
    interval: Duration,
    max_attempts: u32,
) -> ScoringTask {
    while task.attempts < max_attempts {
        tokio::time::sleep(interval).await;
        task.attempts += 1;

        match api.fetch_status(&task.id).await {
            Ok(RemoteStatus::Completed(payload)) => {
                info!(
                    "✅ 采点完成 {} ({}): {}",
                    task.id,
                    task.question_id,
                    if payload.correct { "正确" } else { "不正确" }
                );
                task.complete(payload);
                return task;
            }
            Ok(RemoteStatus::Error(message)) => {
                warn!(
                    "❌ 采点服务报告错误 {}: {}",
                    task.id,
                    message.as_deref().unwrap_or("未知错误")
                );
                task.fail();
                return task;
            }
            Ok(status) => {
                debug!(
                    "⏳ 采点中 {} ({}/{}): {:?}",
                    task.id, task.attempts, max_attempts, status
                );
            }
            Err(e) => {
                warn!(
                    "⚠️ 查询采点结果失败 {} ({}/{}): {}",
                    task.id, task.attempts, max_attempts, e
                );
            }
        }
    }

    warn!(
        "⌛ 采点超时 {}: 已查询 {} 次, 约 {} 秒",
        task.id,
        task.attempts,
        task.elapsed_secs()
    );
    task.fail();
    task
}
