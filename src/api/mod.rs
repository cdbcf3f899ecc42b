//! API 模块
//!
//! 定义与外部系统交互的契约：取课程数据、提交手写采点、查询采点结果。
//! 具体传输方式由 `clients`（HTTP）或 `models::loaders`（本地 TOML）实现。

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{
    GrammarRecord, HandwritingSubmission, RemoteStatus, TaskId, WordRecord,
};

/// 课程数据来源
#[async_trait]
pub trait LessonApi: Send + Sync {
    /// 当前账号下有数据的课号（升序）
    async fn list_lessons(&self) -> AppResult<Vec<u32>>;

    /// 单词数据；空列表表示"没有数据"，不是错误
    async fn fetch_words(&self, lesson: u32) -> AppResult<Vec<WordRecord>>;

    /// 语法数据；空列表表示"没有数据"，不是错误
    async fn fetch_grammar(&self, lesson: u32) -> AppResult<Vec<GrammarRecord>>;
}

/// 手写采点服务
#[async_trait]
pub trait ScoringApi: Send + Sync {
    /// 提交样本，返回任务ID；每次调用都会创建新任务
    async fn submit_handwriting(&self, submission: &HandwritingSubmission) -> AppResult<TaskId>;

    /// 查询任务状态
    async fn fetch_status(&self, task_id: &TaskId) -> AppResult<RemoteStatus>;
}
