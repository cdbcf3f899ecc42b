//! 终端驱动 - 应用入口
//!
//! 用逐行的标准输入/输出驱动测验会话控制器。
//! 只负责读输入、显示状态，所有判断都交给 `QuizController`。

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use crate::api::{LessonApi, ScoringApi};
use crate::clients::TutorClient;
use crate::config::Config;
use crate::models::{HandwritingSample, Mode, Question, TomlLessonSource};
use crate::orchestrator::{QuizController, SessionState, StartStatus};
use crate::services::PuzzleVerdict;
use crate::utils::logging::log_startup;

type InputLines = Lines<BufReader<Stdin>>;

/// 中止当前会话的命令
const ABORT_COMMAND: &str = ":q";

/// 应用主结构
pub struct App {
    controller: QuizController,
    input: InputLines,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate().context("配置校验失败")?;
        log_startup(&config);

        let client = Arc::new(TutorClient::new(&config).context("创建 HTTP 客户端失败")?);
        let scorer: Arc<dyn ScoringApi> = client.clone();
        let lessons: Arc<dyn LessonApi> = match &config.lesson_folder {
            Some(folder) => Arc::new(TomlLessonSource::new(folder)),
            None => client,
        };

        let controller = QuizController::new(lessons, scorer, &config)?;
        let input = BufReader::new(tokio::io::stdin()).lines();

        Ok(Self { controller, input })
    }

    /// 运行应用主循环
    pub async fn run(mut self) -> Result<()> {
        loop {
            self.controller.pump_scoring_events();

            let keep_going = match self.controller.state() {
                SessionState::Idle => self.menu_turn().await?,
                SessionState::Active => self.question_turn().await?,
                SessionState::ShowingResults => self.results_turn().await?,
                SessionState::Loading => true,
            };

            if !keep_going {
                break;
            }
        }

        self.controller.abort();
        info!("👋 程序结束");
        Ok(())
    }

    // ========== 菜单 ==========

    async fn menu_turn(&mut self) -> Result<bool> {
        if let Some(notice) = self.controller.take_notice() {
            println!("\n📣 {}", notice);
        }

        match self.controller.list_lessons().await {
            Ok(lessons) if !lessons.is_empty() => {
                let labels: Vec<String> = lessons.iter().map(u32::to_string).collect();
                println!("\n📚 レッスン: {}", labels.join(", "));
            }
            Ok(_) => println!("\n📚 データがまだありません"),
            Err(_) => {
                if let Some(message) = self.controller.last_error() {
                    println!("\n⚠️ {}", message);
                }
            }
        }

        let Some(line) = self.prompt("レッスン番号 (q で終了): ").await? else {
            return Ok(false);
        };
        if line == "q" {
            return Ok(false);
        }
        let Ok(lesson) = line.parse::<i64>() else {
            println!("有効なレッスン番号を入れてな！");
            return Ok(true);
        };

        for (i, mode) in Mode::ALL.iter().enumerate() {
            println!("  [{}] {}", i + 1, mode.label());
        }
        let Some(line) = self.prompt("モード: ").await? else {
            return Ok(false);
        };
        let Some(mode) = Mode::parse(&line) else {
            println!("モードを選んでな！");
            return Ok(true);
        };

        println!("⏳ 読み込み中...");
        match self.controller.start(lesson, mode).await {
            Ok(StartStatus::Started { total }) => {
                println!("\n{} / レッスン {} / {} 問", mode.label(), lesson, total);
            }
            Ok(StartStatus::NoData) => {
                if let Some(notice) = self.controller.take_notice() {
                    println!("⚠️ {}", notice);
                }
            }
            Err(e) => {
                warn!("开始会话失败: {}", e);
                let message = self
                    .controller
                    .last_error()
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string());
                println!("エラー: {}", message);
            }
        }
        Ok(true)
    }

    // ========== 出题 ==========

    async fn question_turn(&mut self) -> Result<bool> {
        let (Some(question), Some(label), Some(mode)) = (
            self.controller.current_question().cloned(),
            self.controller.progress_label(),
            self.controller.mode(),
        ) else {
            return Ok(true);
        };

        let pending = self.controller.pending_count();
        if pending > 0 {
            println!("\n{}  (採点中: {})", label, pending);
        } else {
            println!("\n{}", label);
        }

        match mode {
            Mode::Handwriting => self.handwriting_turn(&question).await,
            Mode::Reorder => self.reorder_turn(&question).await,
            Mode::Translation => self.translation_turn(&question).await,
        }
    }

    async fn handwriting_turn(&mut self, question: &Question) -> Result<bool> {
        if let Question::Vocabulary(card) = question {
            println!("✍️ {}  ({})", card.meaning, card.pinyin);
        }

        let Some(line) = self.prompt("手書き画像 (PNG パス): ").await? else {
            return Ok(false);
        };
        if line == ABORT_COMMAND {
            self.controller.abort();
            return Ok(true);
        }

        let bytes = match tokio::fs::read(Path::new(&line)).await {
            Ok(bytes) => bytes,
            Err(e) => {
                println!("画像を読み込めません: {}", e);
                return Ok(true);
            }
        };

        let ack = self
            .controller
            .handwriting_complete(HandwritingSample::from_png_bytes(&bytes))
            .await?;
        if ack.accepted {
            println!("📤 採点に送りました");
        } else {
            println!("⚠️ 送信に失敗しました (不正解として記録)");
        }
        Ok(true)
    }

    async fn reorder_turn(&mut self, question: &Question) -> Result<bool> {
        println!("🧩 {}", question.prompt());

        if let Some(puzzle) = self.controller.puzzle() {
            let pool: Vec<String> = puzzle
                .pool()
                .iter()
                .enumerate()
                .map(|(i, t)| format!("{}:{}", i, t))
                .collect();
            println!("  答え: {}", puzzle.attempt());
            println!("  候補: {}", pool.join("  "));
        }

        let Some(line) = self
            .prompt("番号で選択 / u 番号 で戻す / r リセット / s 答え合わせ: ")
            .await?
        else {
            return Ok(false);
        };

        match line.as_str() {
            ABORT_COMMAND => self.controller.abort(),
            "r" => {
                if let Some(puzzle) = self.controller.puzzle_mut() {
                    puzzle.reset();
                }
            }
            "s" => match self.controller.submit_reorder()? {
                PuzzleVerdict::Correct => println!("蛆アツ！正解や！🎉"),
                PuzzleVerdict::Incorrect(feedback) => println!("\n{}", feedback.message()),
            },
            other => {
                let (unselect, index) = match other.strip_prefix('u') {
                    Some(rest) => (true, rest.trim()),
                    None => (false, other),
                };
                let moved = match (index.parse::<usize>(), self.controller.puzzle_mut()) {
                    (Ok(i), Some(puzzle)) if unselect => puzzle.unselect(i),
                    (Ok(i), Some(puzzle)) => puzzle.select(i),
                    _ => false,
                };
                if !moved {
                    println!("その番号はありません");
                }
            }
        }
        Ok(true)
    }

    async fn translation_turn(&mut self, question: &Question) -> Result<bool> {
        println!("🇨🇳 {}", question.prompt());

        let Some(line) = self.prompt("(Enter で答えを表示) ").await? else {
            return Ok(false);
        };
        if line == ABORT_COMMAND {
            self.controller.abort();
            return Ok(true);
        }

        match question {
            Question::Vocabulary(card) => println!("  → {}  ({})", card.word, card.pinyin),
            Question::GrammarReorder(item) => println!("  → {}", item.sentence),
        }

        loop {
            let Some(line) = self.prompt("覚えた？ (y/n): ").await? else {
                return Ok(false);
            };
            match line.as_str() {
                "y" | "n" => {
                    self.controller.mark_translation(line == "y")?;
                    return Ok(true);
                }
                ABORT_COMMAND => {
                    self.controller.abort();
                    return Ok(true);
                }
                _ => continue,
            }
        }
    }

    // ========== 结果画面 ==========

    async fn results_turn(&mut self) -> Result<bool> {
        if let Some(batch) = self.controller.batch_summary() {
            println!("\n{}", "=".repeat(40));
            println!("📊 結果: {} ({}%)", batch.score_label(), batch.percentage);
            for record in &batch.details {
                println!(
                    "  {} {} {}",
                    if record.correct { "○" } else { "×" },
                    record.question_id,
                    record.content.as_deref().unwrap_or("")
                );
            }
            println!("{}", "=".repeat(40));
        }

        let pending = self.controller.pending_count();
        let hint = if pending > 0 {
            format!("採点中 {} 件 / w 待つ / c 続ける / q 終了: ", pending)
        } else {
            "c 続ける / q 終了: ".to_string()
        };

        let Some(line) = self.prompt(&hint).await? else {
            return Ok(false);
        };
        match line.as_str() {
            "w" => {
                self.controller.wait_scoring_event().await;
            }
            "c" => self.controller.continue_from_results()?,
            "q" => self.controller.finish_from_results()?,
            ABORT_COMMAND => self.controller.abort(),
            _ => {}
        }
        Ok(true)
    }

    // ========== 输入 ==========

    /// 显示提示并读一行；输入结束时返回 None
    async fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        print!("{}", text);
        std::io::stdout().flush().context("刷新标准输出失败")?;
        let line = self.input.next_line().await.context("读取标准输入失败")?;
        Ok(line.map(|l| l.trim().to_string()))
    }
}
