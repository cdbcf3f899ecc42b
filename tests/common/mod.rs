#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tutor_quiz::api::{LessonApi, ScoringApi};
use tutor_quiz::error::{AppError, AppResult};
use tutor_quiz::models::{
    GrammarRecord, HandwritingSubmission, RemoteStatus, ScorePayload, TaskId, WordRecord,
};
use tutor_quiz::services::Shuffler;
use tutor_quiz::{Config, QuizController};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn words(lesson: u32, count: usize) -> Vec<WordRecord> {
    (1..=count)
        .map(|i| WordRecord {
            id: i as i64,
            lesson,
            word: format!("词{}", i),
            pinyin: format!("ci{}", i),
            meaning: format!("単語{}", i),
        })
        .collect()
}

pub fn grammar(lesson: u32, id: i64, cn: &str, jp: &str) -> GrammarRecord {
    GrammarRecord {
        id,
        lesson,
        title: "動詞フレーズの目的語".to_string(),
        description: "喜欢の後ろに動詞フレーズを置ける".to_string(),
        example_cn: cn.to_string(),
        example_jp: jp.to_string(),
    }
}

/// 内存课程来源
#[derive(Default)]
pub struct FakeLessons {
    pub words: HashMap<u32, Vec<WordRecord>>,
    pub grammar: HashMap<u32, Vec<GrammarRecord>>,
    pub fail_with: Option<String>,
}

impl FakeLessons {
    pub fn with_words(lesson: u32, count: usize) -> Self {
        let mut fake = Self::default();
        fake.words.insert(lesson, words(lesson, count));
        fake
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn check(&self, endpoint: &str) -> AppResult<()> {
        match &self.fail_with {
            Some(message) => Err(AppError::bad_response(endpoint, 500, message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LessonApi for FakeLessons {
    async fn list_lessons(&self) -> AppResult<Vec<u32>> {
        self.check("/api/lessons")?;
        let mut lessons: Vec<u32> = self
            .words
            .keys()
            .chain(self.grammar.keys())
            .copied()
            .collect();
        lessons.sort_unstable();
        lessons.dedup();
        Ok(lessons)
    }

    async fn fetch_words(&self, lesson: u32) -> AppResult<Vec<WordRecord>> {
        self.check("/api/words")?;
        Ok(self.words.get(&lesson).cloned().unwrap_or_default())
    }

    async fn fetch_grammar(&self, lesson: u32) -> AppResult<Vec<GrammarRecord>> {
        self.check("/api/grammar")?;
        Ok(self.grammar.get(&lesson).cloned().unwrap_or_default())
    }
}

/// 采点服务的行为脚本
#[derive(Debug, Clone, Copy)]
pub enum Script {
    /// 第 n 次查询时完成
    CompleteAfter { polls: u32, correct: bool },
    /// 第 n 次查询时报告错误
    ErrorAfter { polls: u32 },
    /// 永远处理中
    NeverFinish,
    /// 每次查询都是网络错误
    TransportError,
}

/// 按脚本响应的采点服务
pub struct ScriptedScorer {
    pub script: Script,
    pub reject_submissions: bool,
    /// 所有提交都返回同一个任务ID
    pub fixed_task_id: Option<String>,
    pub submits: AtomicUsize,
    pub polls: AtomicUsize,
    per_task: Mutex<HashMap<TaskId, u32>>,
}

impl ScriptedScorer {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            reject_submissions: false,
            fixed_task_id: None,
            submits: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            per_task: Mutex::new(HashMap::new()),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            reject_submissions: true,
            ..Self::new(Script::NeverFinish)
        }
    }

    pub fn with_fixed_task_id(mut self, id: &str) -> Self {
        self.fixed_task_id = Some(id.to_string());
        self
    }

    pub fn submit_count(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoringApi for ScriptedScorer {
    async fn submit_handwriting(&self, submission: &HandwritingSubmission) -> AppResult<TaskId> {
        let n = self.submits.fetch_add(1, Ordering::SeqCst);
        if self.reject_submissions {
            return Err(AppError::bad_response(
                "/api/score/handwriting",
                503,
                "採点サーバーが混雑しています",
            ));
        }
        let id = self
            .fixed_task_id
            .clone()
            .unwrap_or_else(|| format!("handwriting_{}_{}", submission.question_id, n));
        Ok(TaskId(id))
    }

    async fn fetch_status(&self, task_id: &TaskId) -> AppResult<RemoteStatus> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let n = {
            let mut per_task = self.per_task.lock().unwrap();
            let count = per_task.entry(task_id.clone()).or_insert(0);
            *count += 1;
            *count
        };

        match self.script {
            Script::CompleteAfter { polls, correct } if n >= polls => {
                Ok(RemoteStatus::Completed(ScorePayload {
                    correct,
                    recognized: Some("你好".to_string()),
                    feedback: None,
                }))
            }
            Script::ErrorAfter { polls } if n >= polls => {
                Ok(RemoteStatus::Error(Some("model unavailable".to_string())))
            }
            Script::TransportError => Err(AppError::bad_response(
                "/api/score/result",
                502,
                "Bad Gateway",
            )),
            _ if n % 2 == 0 => Ok(RemoteStatus::NotFound),
            _ => Ok(RemoteStatus::Processing),
        }
    }
}

pub fn test_config() -> Config {
    Config {
        questions_per_set: 10,
        results_batch_size: 10,
        poll_interval_ms: 1000,
        max_poll_attempts: 30,
        ..Config::default()
    }
}

pub fn controller(lessons: FakeLessons, scorer: Arc<ScriptedScorer>) -> QuizController {
    controller_with(&test_config(), lessons, scorer)
}

pub fn controller_with(
    config: &Config,
    lessons: FakeLessons,
    scorer: Arc<ScriptedScorer>,
) -> QuizController {
    init_tracing();
    QuizController::new(Arc::new(lessons), scorer, config)
        .unwrap()
        .with_shuffler(Shuffler::seeded(2024))
}
