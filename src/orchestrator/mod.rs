//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责会话调度和后台任务管理，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `session_controller` - 测验会话控制器
//! - 管理会话生命周期（开始、推进、结果画面、结束）
//! - 持有题目列表、当前索引、结果汇总
//! - 从通道接收后台采点结果
//!
//! ### `scoring_orchestrator` - 后台采点编排器
//! - 提交手写样本，取得任务ID
//! - 每个任务一个 tokio 任务轮询状态
//! - 终态结果通过 mpsc 通道投递
//!
//! ### `session` - 会话数据
//!
//! ## 层次关系
//!
//! ```text
//! session_controller (处理一轮 Vec<Question>)
//!     ↓                     ↑ ScoringEvent (mpsc)
//! scoring_orchestrator (处理单个手写样本)
//!     ↓
//! services (能力层：loader / puzzle / aggregator)
//!     ↓
//! api / clients / infrastructure (HttpExecutor)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一所有者**：会话数据只由控制器修改
//! 2. **消息传递**：后台任务不直接触碰会话，只发送事件
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure

pub mod scoring_orchestrator;
pub mod session;
pub mod session_controller;

// 重新导出主要类型
pub use scoring_orchestrator::{poll_until_terminal, ScoringAck, ScoringEvent, ScoringOrchestrator};
pub use session::{ResultsOrigin, Session, SessionState};
pub use session_controller::{QuizController, StartStatus};
