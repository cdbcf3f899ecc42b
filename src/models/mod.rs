pub mod lesson;
pub mod loaders;
pub mod mode;
pub mod result;
pub mod scoring;

pub use lesson::{GrammarRecord, GrammarReorder, Question, QuestionId, VocabularyCard, WordRecord};
pub use loaders::TomlLessonSource;
pub use mode::{Mode, QuestionKind};
pub use result::{ResultBatch, ResultRecord};
pub use scoring::{
    HandwritingSample, HandwritingSubmission, RemoteStatus, ScorePayload, ScoringTask, TaskId,
    TaskStatus,
};
