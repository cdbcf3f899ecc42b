use crate::models::lesson::QuestionId;
use crate::models::scoring::ScoringTask;

/// 一道题的最终结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub question_id: QuestionId,
    pub correct: bool,
    /// 识别出的文字或用户提交的内容
    pub content: Option<String>,
    pub feedback: Option<String>,
}

impl ResultRecord {
    pub fn new(question_id: QuestionId, correct: bool) -> Self {
        Self {
            question_id,
            correct,
            content: None,
            feedback: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// 从已结束的采点任务生成结果；任务未结束时返回 None
    pub fn from_task(task: &ScoringTask) -> Option<Self> {
        let payload = task.outcome()?;
        Some(Self {
            question_id: task.question_id.clone(),
            correct: payload.correct,
            content: payload.recognized.clone(),
            feedback: payload.feedback.clone(),
        })
    }
}

/// 结果汇总（结果画面的只读视图）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultBatch {
    pub correct: usize,
    pub total: usize,
    /// 正确率（四舍五入到整数，total 为 0 时为 0）
    pub percentage: u32,
    /// 按到达顺序排列的明细
    pub details: Vec<ResultRecord>,
}

impl ResultBatch {
    pub fn score_label(&self) -> String {
        format!("{} / {}", self.correct, self.total)
    }
}
