//! 结果汇总服务 - 业务能力层

use crate::models::{ResultBatch, ResultRecord};

/// 结果汇总器
///
/// 按到达顺序累积结果；每满 `batch_size` 条触发一次结果画面
pub struct ResultAggregator {
    records: Vec<ResultRecord>,
    batch_size: usize,
    /// 已经显示过结果画面的条数（同一倍数只触发一次）
    shown_at: usize,
}

impl ResultAggregator {
    pub fn new(batch_size: usize) -> Self {
        Self {
            records: Vec::new(),
            batch_size: batch_size.max(1),
            shown_at: 0,
        }
    }

    pub fn record(&mut self, record: ResultRecord) {
        self.records.push(record);
    }

    pub fn should_show_batch(&self) -> bool {
        let count = self.records.len();
        count > 0 && count % self.batch_size == 0 && self.shown_at != count
    }

    pub fn mark_shown(&mut self) {
        self.shown_at = self.records.len();
    }

    pub fn summarize(&self) -> ResultBatch {
        let total = self.records.len();
        let correct = self.records.iter().filter(|r| r.correct).count();
        let percentage = if total == 0 {
            0
        } else {
            (correct as f64 * 100.0 / total as f64).round() as u32
        };

        ResultBatch {
            correct,
            total,
            percentage,
            details: self.records.clone(),
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.shown_at = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
