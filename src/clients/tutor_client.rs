//! 学习后端 API 客户端
//!
//! 封装课程数据与手写采点相关的 REST 调用
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::api::{LessonApi, ScoringApi};
use crate::config::Config;
use crate::error::{AppResult, ScoringError};
use crate::infrastructure::HttpExecutor;
use crate::models::{
    GrammarRecord, HandwritingSubmission, RemoteStatus, ScorePayload, TaskId, WordRecord,
};

/// 提交手写后的响应
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    task_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// 查询采点结果的响应
#[derive(Debug, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub is_correct: bool,
    pub recognized_text: Option<String>,
    pub feedback: Option<String>,
    pub error: Option<String>,
}

impl From<StatusResponse> for RemoteStatus {
    fn from(resp: StatusResponse) -> Self {
        match resp.status.as_str() {
            "completed" => RemoteStatus::Completed(ScorePayload {
                correct: resp.is_correct,
                recognized: resp.recognized_text,
                feedback: resp.feedback,
            }),
            "error" => RemoteStatus::Error(resp.error),
            "not_found" => RemoteStatus::NotFound,
            _ => RemoteStatus::Processing,
        }
    }
}

/// 学习后端客户端
pub struct TutorClient {
    executor: HttpExecutor,
}

impl TutorClient {
    /// 创建新的后端客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        Ok(Self {
            executor: HttpExecutor::new(config)?,
        })
    }
}

#[async_trait]
impl LessonApi for TutorClient {
    async fn list_lessons(&self) -> AppResult<Vec<u32>> {
        let mut lessons: Vec<u32> = self.executor.get_json("/api/lessons", &[]).await?;
        lessons.sort_unstable();
        lessons.dedup();
        debug!("📚 取得课号: {:?}", lessons);
        Ok(lessons)
    }

    async fn fetch_words(&self, lesson: u32) -> AppResult<Vec<WordRecord>> {
        self.executor
            .get_json("/api/words", &[("lesson", lesson.to_string())])
            .await
    }

    async fn fetch_grammar(&self, lesson: u32) -> AppResult<Vec<GrammarRecord>> {
        self.executor
            .get_json("/api/grammar", &[("lesson", lesson.to_string())])
            .await
    }
}

#[async_trait]
impl ScoringApi for TutorClient {
    async fn submit_handwriting(&self, submission: &HandwritingSubmission) -> AppResult<TaskId> {
        let resp: SubmitResponse = self
            .executor
            .post_json("/api/score/handwriting", submission)
            .await?;

        match resp.task_id {
            Some(id) if !id.is_empty() => Ok(TaskId(id)),
            _ => Err(ScoringError::TaskRejected {
                message: format!("响应缺少 task_id (status: {:?})", resp.status),
            }
            .into()),
        }
    }

    async fn fetch_status(&self, task_id: &TaskId) -> AppResult<RemoteStatus> {
        let path = format!("/api/score/result/{}", task_id);
        let resp: StatusResponse = self.executor.get_json(&path, &[]).await?;
        Ok(resp.into())
    }
}
