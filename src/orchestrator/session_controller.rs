//! 测验会话控制器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个测验的状态机，负责"现在该显示什么"。
//!
//! ## 核心功能
//!
//! 1. **开始会话**：校验课号、委托 LessonLoader 取题
//! 2. **推进题目**：按作答结果决定下一题、结果画面或结束
//! 3. **后台结果**：从通道取出采点结果，去重、过期检查后记入汇总
//! 4. **结果画面**：每满一批显示一次，可继续或结束
//!
//! ## 设计特点
//!
//! - **单一所有者**：只通过 `&mut self` 修改，不需要锁
//! - **代数保护**：每次结束/开始会话都递增代数，过期的采点结果直接丢弃
//! - **不阻塞**：手写模式提交后立即进入下一题

use std::sync::Arc;

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};

use crate::api::{LessonApi, ScoringApi};
use crate::config::Config;
use crate::error::{AppResult, ScoringError, SessionError};
use crate::models::{
    HandwritingSample, Mode, Question, QuestionKind, ResultBatch, ResultRecord,
};
use crate::orchestrator::scoring_orchestrator::{ScoringAck, ScoringEvent, ScoringOrchestrator};
use crate::orchestrator::session::{ResultsOrigin, Session, SessionState};
use crate::services::{LessonLoader, PuzzleVerdict, ReorderPuzzle, Shuffler};
use crate::utils::{logging, truncate_text};
use crate::workflow::{Outcome, QuestionCtx};

const COMPLETION_NOTICE: &str = "学習完了！お疲れ！オサーショ！";

/// `start()` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartStatus {
    Started { total: usize },
    /// 该课没有该模式可用的数据（已设置提示，状态保持 Idle）
    NoData,
}

/// 测验会话控制器
pub struct QuizController {
    loader: LessonLoader,
    scoring: ScoringOrchestrator,
    events: UnboundedReceiver<ScoringEvent>,
    shuffler: Shuffler,
    puzzle: ReorderPuzzle,
    batch_size: usize,
    state: SessionState,
    session: Option<Session>,
    generation: u64,
    last_error: Option<String>,
    notice: Option<String>,
}

impl QuizController {
    pub fn new(
        lessons: Arc<dyn LessonApi>,
        scorer: Arc<dyn ScoringApi>,
        config: &Config,
    ) -> AppResult<Self> {
        let loader = LessonLoader::new(lessons, config.questions_per_set)?;
        let (scoring, events) = ScoringOrchestrator::new(scorer, config);
        let mut shuffler = Shuffler::new();
        let puzzle = ReorderPuzzle::new(shuffler.fork());

        Ok(Self {
            loader,
            scoring,
            events,
            shuffler,
            puzzle,
            batch_size: config.results_batch_size,
            state: SessionState::Idle,
            session: None,
            generation: 0,
            last_error: None,
            notice: None,
        })
    }

    /// 使用指定的洗牌器（可复现的出题顺序）
    pub fn with_shuffler(mut self, mut shuffler: Shuffler) -> Self {
        self.puzzle = ReorderPuzzle::new(shuffler.fork());
        self.shuffler = shuffler;
        self
    }

    // ========== 会话生命周期 ==========

    /// 有数据的课号
    pub async fn list_lessons(&mut self) -> AppResult<Vec<u32>> {
        match self.loader.list_lessons().await {
            Ok(lessons) => Ok(lessons),
            Err(e) => {
                error!("❌ 取得课号失败: {}", e);
                self.last_error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// 开始一轮测验
    pub async fn start(&mut self, lesson: i64, mode: Mode) -> AppResult<StartStatus> {
        let lesson_no = match u32::try_from(lesson) {
            Ok(n) if n >= 1 => n,
            _ => return Err(SessionError::InvalidLesson(lesson).into()),
        };

        self.teardown();
        self.state = SessionState::Loading;
        self.last_error = None;
        self.notice = None;

        let questions = match self.loader.load(lesson_no, mode, &mut self.shuffler).await {
            Ok(questions) => questions,
            Err(e) => {
                error!("[课 {}] ❌ 取题失败: {}", lesson_no, e);
                self.last_error = Some(e.user_message());
                self.state = SessionState::Idle;
                return Err(e);
            }
        };

        if questions.is_empty() {
            let kind = match mode.kind() {
                QuestionKind::Grammar => "文法",
                QuestionKind::Vocabulary => "単語",
            };
            warn!("[课 {}] ⚠️ 没有 {} 模式可用的数据", lesson_no, mode);
            self.notice = Some(format!(
                "{}データが見つからんかったわ... アップロードした？",
                kind
            ));
            self.state = SessionState::Idle;
            return Ok(StartStatus::NoData);
        }

        let total = questions.len();
        self.session = Some(Session::new(
            lesson_no,
            mode,
            questions,
            self.batch_size,
            self.generation,
        ));
        self.state = SessionState::Active;
        self.refresh_puzzle();

        logging::log_session_start(lesson_no, mode, total);
        Ok(StartStatus::Started { total })
    }

    /// 解决当前题目并推进
    pub fn resolve_current(&mut self, outcome: Outcome) -> AppResult<()> {
        let session = self.active_session_mut()?;

        match outcome {
            Outcome::Submitted { task_id } => {
                if session.mode != Mode::Handwriting {
                    return Err(SessionError::UnexpectedSubmitted { mode: session.mode }.into());
                }
                debug!("[课 {}] 题 {} 等待采点 {}", session.lesson, session.index + 1, task_id);
                session.pending.insert(task_id);
            }
            Outcome::Resolved(record) => {
                debug!(
                    "[课 {}] 题 {} 结果: {}",
                    session.lesson,
                    session.index + 1,
                    if record.correct { "○" } else { "×" }
                );
                session.results.record(record);
            }
        }

        self.advance();
        Ok(())
    }

    /// 结果画面 → 继续
    pub fn continue_from_results(&mut self) -> AppResult<()> {
        let session = self.showing_session_mut()?;
        session.results.clear();
        let origin = session.results_origin.take();

        if origin == Some(ResultsOrigin::Background) {
            // 当前题还没作答，回到同一题
            self.state = SessionState::Active;
            return Ok(());
        }

        if session.has_next() {
            session.index += 1;
            self.state = SessionState::Active;
            self.refresh_puzzle();
        } else {
            self.complete();
        }
        Ok(())
    }

    /// 结果画面 → 结束
    pub fn finish_from_results(&mut self) -> AppResult<()> {
        self.showing_session_mut()?;
        info!("🏁 从结果画面结束会话");
        self.teardown();
        self.state = SessionState::Idle;
        Ok(())
    }

    /// 任意状态下中止
    pub fn abort(&mut self) {
        if let Some(session) = &self.session {
            info!(
                "[课 {}] 🛑 中止会话 (未送达的采点结果 {} 个将被丢弃)",
                session.lesson,
                session.pending.len()
            );
        }
        self.teardown();
        self.state = SessionState::Idle;
    }

    // ========== 各模式的作答 ==========

    /// 手写模式：提交当前题的手写样本，立即进入下一题
    pub async fn handwriting_complete(
        &mut self,
        sample: HandwritingSample,
    ) -> AppResult<ScoringAck> {
        let session = self.mode_session(Mode::Handwriting)?;
        if !sample.image_data.starts_with("data:image/") {
            return Err(ScoringError::InvalidSample {
                reason: format!("不是图片 data URL: {}", truncate_text(&sample.image_data, 24)),
            }
            .into());
        }
        let question = session.current().ok_or(SessionError::NotActive)?;
        let ctx = QuestionCtx::new(
            session.generation,
            session.lesson,
            session.index,
            question.id(),
        );
        let expected = question.answer().to_string();

        let ack = self.scoring.submit(&ctx, &expected, sample).await;
        self.resolve_current(Outcome::Submitted {
            task_id: ack.task_id.clone(),
        })?;
        Ok(ack)
    }

    /// 重排模式：提交拼好的句子
    ///
    /// 答错时留在本题（拼图已重置），答对时记录并推进
    pub fn submit_reorder(&mut self) -> AppResult<PuzzleVerdict> {
        let question_id = self
            .mode_session(Mode::Reorder)?
            .current()
            .map(Question::id)
            .ok_or(SessionError::NotActive)?;

        let verdict = self.puzzle.submit();
        match &verdict {
            PuzzleVerdict::Correct => {
                let record =
                    ResultRecord::new(question_id, true).with_content(self.puzzle.attempt());
                self.resolve_current(Outcome::Resolved(record))?;
            }
            PuzzleVerdict::Incorrect(feedback) => {
                debug!(
                    "🧩 重排不正确: {} ≠ {}",
                    truncate_text(&feedback.attempt, 20),
                    truncate_text(&feedback.expected, 20)
                );
            }
        }
        Ok(verdict)
    }

    /// 中译模式：自评"覚えた / まだ"
    pub fn mark_translation(&mut self, remembered: bool) -> AppResult<()> {
        let question = self
            .mode_session(Mode::Translation)?
            .current()
            .ok_or(SessionError::NotActive)?;
        let record = ResultRecord::new(question.id(), remembered).with_content(question.answer());
        self.resolve_current(record.into())
    }

    // ========== 后台采点结果 ==========

    /// 取出已经送达的采点结果（不等待），返回记入的条数
    pub fn pump_scoring_events(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    if self.apply_event(event) {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// 等待下一条采点结果，返回是否记入
    ///
    /// 没有待处理任务时不等待
    pub async fn wait_scoring_event(&mut self) -> bool {
        if self.pending_count() == 0 {
            return self.pump_scoring_events() > 0;
        }
        match self.events.recv().await {
            Some(event) => self.apply_event(event),
            None => false,
        }
    }

    fn apply_event(&mut self, event: ScoringEvent) -> bool {
        if event.generation != self.generation {
            debug!(
                "丢弃过期的采点结果 {} (代#{} ≠ 代#{})",
                event.task.id, event.generation, self.generation
            );
            return false;
        }

        let Some(session) = self.session.as_mut() else {
            return false;
        };

        if !session.pending.remove(&event.task.id) {
            debug!("丢弃重复或未知的采点结果 {}", event.task.id);
            return false;
        }

        let Some(record) = ResultRecord::from_task(&event.task) else {
            warn!("采点任务 {} 未到终态, 忽略", event.task.id);
            return false;
        };

        info!(
            "[课 {}] 📥 采点结果送达 {}: {} (待处理 {})",
            session.lesson,
            record.question_id,
            if record.correct { "○" } else { "×" },
            session.pending.len()
        );
        session.results.record(record);

        if self.state == SessionState::Active && session.results.should_show_batch() {
            session.results.mark_shown();
            session.results_origin = Some(ResultsOrigin::Background);
            self.state = SessionState::ShowingResults;
            logging::log_batch_summary(session.lesson, &session.results.summarize());
        }
        true
    }

    // ========== 内部 ==========

    /// 推进规则
    fn advance(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if session.results.should_show_batch() {
            session.results.mark_shown();
            session.results_origin = Some(ResultsOrigin::AfterResolve);
            self.state = SessionState::ShowingResults;
            logging::log_batch_summary(session.lesson, &session.results.summarize());
            return;
        }

        if session.has_next() {
            session.index += 1;
            self.refresh_puzzle();
            return;
        }

        if session.mode == Mode::Handwriting
            && (!session.results.is_empty() || !session.pending.is_empty())
        {
            session.results_origin = Some(ResultsOrigin::EndOfList);
            self.state = SessionState::ShowingResults;
            logging::log_batch_summary(session.lesson, &session.results.summarize());
            return;
        }

        self.complete();
    }

    fn complete(&mut self) {
        if let Some(session) = &self.session {
            info!("[课 {}] 🎉 本轮测验完成 ({} 题)", session.lesson, session.total());
        }
        self.notice = Some(COMPLETION_NOTICE.to_string());
        self.teardown();
        self.state = SessionState::Idle;
    }

    /// 释放会话：递增代数、取消轮询、清空拼图
    fn teardown(&mut self) {
        self.generation += 1;
        self.scoring.cancel_all();
        self.session = None;
        self.puzzle.clear();
    }

    fn refresh_puzzle(&mut self) {
        if let Some(item) = self
            .session
            .as_ref()
            .and_then(Session::current)
            .and_then(Question::as_grammar)
        {
            self.puzzle.sync(item);
        }
    }

    fn active_session_mut(&mut self) -> AppResult<&mut Session> {
        match (self.state, self.session.as_mut()) {
            (SessionState::Active, Some(session)) => Ok(session),
            _ => Err(SessionError::NotActive.into()),
        }
    }

    fn showing_session_mut(&mut self) -> AppResult<&mut Session> {
        match (self.state, self.session.as_mut()) {
            (SessionState::ShowingResults, Some(session)) => Ok(session),
            _ => Err(SessionError::NotShowingResults.into()),
        }
    }

    fn mode_session(&self, expected: Mode) -> AppResult<&Session> {
        let session = match (self.state, self.session.as_ref()) {
            (SessionState::Active, Some(session)) => session,
            _ => return Err(SessionError::NotActive.into()),
        };
        if session.mode != expected {
            return Err(SessionError::WrongMode {
                expected,
                actual: session.mode,
            }
            .into());
        }
        Ok(session)
    }

    // ========== 可观察状态 ==========

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Loading
    }

    pub fn is_showing_results(&self) -> bool {
        self.state == SessionState::ShowingResults
    }

    pub fn mode(&self) -> Option<Mode> {
        self.session.as_ref().map(|s| s.mode)
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session.as_ref().and_then(Session::current)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.index)
    }

    pub fn total(&self) -> usize {
        self.session.as_ref().map_or(0, Session::total)
    }

    /// `問 {i+1} / {n}`
    pub fn progress_label(&self) -> Option<String> {
        self.session.as_ref().map(Session::progress_label)
    }

    /// 结果画面显示的汇总（只在结果画面时有值）
    pub fn batch_summary(&self) -> Option<ResultBatch> {
        match (self.state, &self.session) {
            (SessionState::ShowingResults, Some(session)) => Some(session.results.summarize()),
            _ => None,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.pending.len())
    }

    pub fn in_flight(&self) -> usize {
        self.scoring.in_flight()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// 当前重排题（只在重排模式进行中有值）
    pub fn puzzle(&self) -> Option<&ReorderPuzzle> {
        self.mode_session(Mode::Reorder).ok()?;
        Some(&self.puzzle)
    }

    pub fn puzzle_mut(&mut self) -> Option<&mut ReorderPuzzle> {
        self.mode_session(Mode::Reorder).ok()?;
        Some(&mut self.puzzle)
    }

    /// 等待所有后台轮询结束（测试和退出时使用）
    pub async fn wait_scoring_idle(&self) {
        self.scoring.wait_idle().await;
    }
}
