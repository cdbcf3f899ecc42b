//! 业务能力层（Services Layer）
//!
//! 每个服务只提供一种能力，不持有会话状态：
//!
//! - `shuffle` - 可设种子的随机排列
//! - `lesson_loader` - 取题、展开语法例句、洗牌截断
//! - `reorder_puzzle` - 例句重排题引擎
//! - `result_aggregator` - 结果累积与批次触发

pub mod lesson_loader;
pub mod reorder_puzzle;
pub mod result_aggregator;
pub mod shuffle;

pub use lesson_loader::{GrammarExpander, LessonLoader};
pub use reorder_puzzle::{PuzzleFeedback, PuzzleVerdict, ReorderPuzzle};
pub use result_aggregator::ResultAggregator;
pub use shuffle::Shuffler;
