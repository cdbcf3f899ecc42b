//! 流程层（Workflow Layer）
//!
//! 描述"一道题"在会话中的上下文，以及它被解决的方式

pub mod outcome;
pub mod question_ctx;

pub use outcome::Outcome;
pub use question_ctx::QuestionCtx;
