use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::models::lesson::QuestionId;

/// 采点任务ID（由采点服务分配，对客户端不透明）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 手写样本（PNG data URL）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandwritingSample {
    pub image_data: String,
}

impl HandwritingSample {
    pub fn from_png_bytes(bytes: &[u8]) -> Self {
        Self {
            image_data: format!("data:image/png;base64,{}", STANDARD.encode(bytes)),
        }
    }

    pub fn from_data_url(data_url: impl Into<String>) -> Self {
        Self {
            image_data: data_url.into(),
        }
    }
}

/// 提交给采点服务的请求体
#[derive(Debug, Clone, Serialize)]
pub struct HandwritingSubmission {
    pub image_data: String,
    pub question_id: String,
    pub expected_answer: String,
}

/// 采点结果
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScorePayload {
    pub correct: bool,
    pub recognized: Option<String>,
    pub feedback: Option<String>,
}

impl ScorePayload {
    /// 提交失败或轮询超时时使用的通用失败结果
    pub fn failure() -> Self {
        Self {
            correct: false,
            recognized: None,
            feedback: Some("採点に失敗しました".to_string()),
        }
    }
}

/// 采点服务返回的任务状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    Processing,
    Completed(ScorePayload),
    Error(Option<String>),
    NotFound,
}

/// 本地跟踪的任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Submitted,
    Polling,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// 一次手写采点请求的生命周期
#[derive(Debug, Clone)]
pub struct ScoringTask {
    pub id: TaskId,
    pub question_id: QuestionId,
    pub status: TaskStatus,
    pub attempts: u32,
    pub result: Option<ScorePayload>,
    pub submitted_at: DateTime<Local>,
}

impl ScoringTask {
    pub fn new(id: TaskId, question_id: QuestionId) -> Self {
        Self {
            id,
            question_id,
            status: TaskStatus::Submitted,
            attempts: 0,
            result: None,
            submitted_at: Local::now(),
        }
    }

    pub fn begin_polling(&mut self) {
        self.status = TaskStatus::Polling;
    }

    pub fn complete(&mut self, payload: ScorePayload) {
        self.status = TaskStatus::Completed;
        self.result = Some(payload);
    }

    /// 标记失败；失败任务同样携带结果（判为不正确）
    pub fn fail(&mut self) {
        self.status = TaskStatus::Failed;
        self.result = Some(ScorePayload::failure());
    }

    /// 终态时的结果，未结束时为 None
    pub fn outcome(&self) -> Option<&ScorePayload> {
        if self.status.is_terminal() {
            self.result.as_ref()
        } else {
            None
        }
    }

    pub fn elapsed_secs(&self) -> i64 {
        (Local::now() - self.submitted_at).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_sample_is_data_url() {
        let sample = HandwritingSample::from_png_bytes(&[0x89, b'P', b'N', b'G']);
        assert_eq!(sample.image_data, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn failed_task_carries_incorrect_payload() {
        let mut task = ScoringTask::new(TaskId("t-1".into()), QuestionId("word-1".into()));
        assert!(task.outcome().is_none());
        task.begin_polling();
        assert_eq!(task.status, TaskStatus::Polling);
        task.fail();
        let payload = task.outcome().cloned().unwrap_or_default();
        assert!(!payload.correct);
        assert!(payload.feedback.is_some());
    }
}
