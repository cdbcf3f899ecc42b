//! 课程加载服务 - 业务能力层
//!
//! 只负责"取一课的题目"能力：取数据、展开语法例句、洗牌、截断

use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info};

use crate::api::LessonApi;
use crate::error::AppResult;
use crate::models::{GrammarRecord, GrammarReorder, Mode, Question, QuestionKind};
use crate::services::shuffle::Shuffler;

/// 语法例句展开器
///
/// 一条语法记录的 example_cn / example_jp 里有多行带编号的例句，
/// 每一对例句展开成一道独立的重排题
pub struct GrammarExpander {
    numbered: Regex,
    category: Regex,
    numbering_prefix: Regex,
}

impl GrammarExpander {
    pub fn new() -> AppResult<Self> {
        Ok(Self {
            numbered: Regex::new(r"^\d+\.")?,
            category: Regex::new(r"^[A-Z]\s")?,
            numbering_prefix: Regex::new(r"^\d+\.\s*")?,
        })
    }

    /// 展开一组语法记录
    ///
    /// 第 i 个例句的 ID 为 `record.id * 1000 + i`
    pub fn expand(&self, records: &[GrammarRecord]) -> Vec<GrammarReorder> {
        let mut expanded = Vec::new();

        for record in records {
            let cn_examples = self.example_lines(&record.example_cn);
            let jp_examples = self.example_lines(&record.example_jp);
            let max_examples = cn_examples.len().max(jp_examples.len());

            for i in 0..max_examples {
                let cn = cn_examples.get(i).map(|l| self.clean(l)).unwrap_or_default();
                let jp = jp_examples.get(i).map(|l| self.clean(l)).unwrap_or_default();

                // 过滤掉残缺的行，只保留真正的例句
                if cn.is_empty() || jp.is_empty() {
                    continue;
                }
                if !cn.contains('。') && cn.chars().count() <= 2 {
                    continue;
                }

                expanded.push(GrammarReorder {
                    id: record.id * 1000 + i as i64,
                    sentence: cn,
                    reference: jp,
                    title: record.title.clone(),
                    description: record.description.clone(),
                });
            }
        }

        expanded
    }

    /// 取出带编号的例句行（跳过空行和 "A 単純方向補語" 这样的分类行）
    fn example_lines<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| self.numbered.is_match(line) && !self.category.is_match(line))
            .collect()
    }

    fn clean(&self, line: &str) -> String {
        self.numbering_prefix.replace(line, "").trim().to_string()
    }
}

/// 课程加载服务
///
/// 职责：
/// - 按模式调用单词或语法接口
/// - 把语法记录展开成例句题
/// - 先对全部候选洗牌，再截断到每轮题数
/// - 不持有会话状态
pub struct LessonLoader {
    api: Arc<dyn LessonApi>,
    expander: GrammarExpander,
    batch_size: usize,
}

impl LessonLoader {
    pub fn new(api: Arc<dyn LessonApi>, batch_size: usize) -> AppResult<Self> {
        Ok(Self {
            api,
            expander: GrammarExpander::new()?,
            batch_size,
        })
    }

    /// 有数据的课号
    pub async fn list_lessons(&self) -> AppResult<Vec<u32>> {
        self.api.list_lessons().await
    }

    /// 取出该课全部候选题（未洗牌、未截断）
    pub async fn fetch_candidates(&self, lesson: u32, mode: Mode) -> AppResult<Vec<Question>> {
        let candidates: Vec<Question> = match mode.kind() {
            QuestionKind::Vocabulary => {
                let words = self.api.fetch_words(lesson).await?;
                debug!("[课 {}] 取得单词 {} 个", lesson, words.len());
                words.into_iter().map(Question::from).collect()
            }
            QuestionKind::Grammar => {
                let grammar = self.api.fetch_grammar(lesson).await?;
                let expanded = self.expander.expand(&grammar);
                debug!(
                    "[课 {}] 取得语法 {} 条, 展开为例句 {} 个",
                    lesson,
                    grammar.len(),
                    expanded.len()
                );
                expanded.into_iter().map(Question::GrammarReorder).collect()
            }
        };
        Ok(candidates)
    }

    /// 取题并洗牌、截断
    ///
    /// 返回空列表表示该课没有该模式可用的数据
    pub async fn load(
        &self,
        lesson: u32,
        mode: Mode,
        shuffler: &mut Shuffler,
    ) -> AppResult<Vec<Question>> {
        let candidates = self.fetch_candidates(lesson, mode).await?;
        let total = candidates.len();
        let questions = prepare(candidates, self.batch_size, shuffler);
        info!(
            "[课 {}] 📖 候选 {} 题, 本轮出题 {} 题",
            lesson,
            total,
            questions.len()
        );
        Ok(questions)
    }
}

/// 洗牌后截断
///
/// 必须先洗全部候选再截断，否则题目会偏向数据开头
pub fn prepare<T>(candidates: Vec<T>, batch_size: usize, shuffler: &mut Shuffler) -> Vec<T> {
    let mut shuffled = shuffler.shuffle(candidates);
    shuffled.truncate(batch_size);
    shuffled
}
