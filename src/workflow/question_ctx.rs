//! 题目上下文
//!
//! 封装"这是哪一轮会话、哪一课的第几题"这一信息

use std::fmt::Display;

use crate::models::QuestionId;

/// 题目上下文
///
/// 采点任务带着它走完整个轮询过程，结果回来时用它判断是否已过期
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionCtx {
    /// 会话代数（每次开始/结束会话时递增）
    pub generation: u64,

    /// 课号
    pub lesson: u32,

    /// 题目在本轮中的索引（从0开始）
    pub index: usize,

    pub question_id: QuestionId,
}

impl QuestionCtx {
    pub fn new(generation: u64, lesson: u32, index: usize, question_id: QuestionId) -> Self {
        Self {
            generation,
            lesson,
            index,
            question_id,
        }
    }
}

impl Display for QuestionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[课 {} 题 {} {} 代#{}]",
            self.lesson,
            self.index + 1,
            self.question_id,
            self.generation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_one_based_index() {
        let ctx = QuestionCtx::new(3, 5, 0, QuestionId("word-12".into()));
        assert_eq!(ctx.to_string(), "[课 5 题 1 word-12 代#3]");
    }
}
