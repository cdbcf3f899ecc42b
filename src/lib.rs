//! # Tutor Quiz
//!
//! 中文学习应用的测验会话核心：出题、后台手写采点、结果汇总
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有 HTTP 客户端资源，只暴露能力
//! - `HttpExecutor` - 唯一的 reqwest Client 持有者，提供 get_json() / post_json()
//!
//! ### ② 接口与客户端（Api / Clients）
//! - `api/` - `LessonApi` / `ScoringApi` 契约
//! - `clients/` - `TutorClient`，基于 HTTP 的实现
//! - `models::loaders` - `TomlLessonSource`，基于本地 TOML 的课程来源
//!
//! ### ③ 业务能力层（Services）
//! - `LessonLoader` - 取题、展开语法例句、洗牌截断
//! - `ReorderPuzzle` - 例句重排题引擎
//! - `ResultAggregator` - 结果累积与批次触发
//! - `Shuffler` - 可设种子的随机排列
//!
//! ### ④ 流程层（Workflow）
//! - `QuestionCtx` - 上下文封装（会话代数 + 课号 + 题目索引）
//! - `Outcome` - 一道题的作答结果
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/session_controller` - 测验会话状态机
//! - `orchestrator/scoring_orchestrator` - 后台采点提交与轮询
//!
//! ## 模块结构

pub mod api;
pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Mode, Question, QuestionId, ResultRecord};
pub use orchestrator::{QuizController, ScoringOrchestrator, SessionState, StartStatus};
pub use workflow::{Outcome, QuestionCtx};
