//! 作答结果 - 流程层
//!
//! 一道题被"解决"的两种方式：已经得到结果，或者手写样本已提交、结果稍后到达

use crate::models::{ResultRecord, TaskId};

/// 一道题的作答结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 手写样本已提交，结果由后台采点送达（只在手写模式有效）
    Submitted { task_id: TaskId },
    /// 已经得到最终结果
    Resolved(ResultRecord),
}

impl From<ResultRecord> for Outcome {
    fn from(record: ResultRecord) -> Self {
        Outcome::Resolved(record)
    }
}
