//! 会话数据
//!
//! 一轮测验的可变聚合，只由会话控制器持有和修改

use std::collections::HashSet;

use crate::models::{Mode, Question, TaskId};
use crate::services::ResultAggregator;

/// 会话控制器的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Active,
    ShowingResults,
}

/// 结果画面是怎么被打开的
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsOrigin {
    /// 作答后记录数达到批次
    AfterResolve,
    /// 手写模式走到最后一题
    EndOfList,
    /// 后台采点结果到达时记录数达到批次（当前题还没作答）
    Background,
}

/// 一轮测验
pub struct Session {
    pub lesson: u32,
    pub mode: Mode,
    pub questions: Vec<Question>,
    /// 当前题目索引（进行中只增不减）
    pub index: usize,
    pub results: ResultAggregator,
    /// 已提交、结果尚未送达的采点任务
    pub pending: HashSet<TaskId>,
    pub generation: u64,
    pub results_origin: Option<ResultsOrigin>,
}

impl Session {
    pub fn new(
        lesson: u32,
        mode: Mode,
        questions: Vec<Question>,
        batch_size: usize,
        generation: u64,
    ) -> Self {
        Self {
            lesson,
            mode,
            questions,
            index: 0,
            results: ResultAggregator::new(batch_size),
            pending: HashSet::new(),
            generation,
            results_origin: None,
        }
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.questions.len()
    }

    pub fn progress_label(&self) -> String {
        format!("問 {} / {}", self.index + 1, self.questions.len())
    }
}
