//! 例句重排引擎 - 业务能力层
//!
//! 把答案拆成单字，在"候选池"和"已组成答案"之间移动，最后整句比对

use tracing::debug;

use crate::models::GrammarReorder;
use crate::services::shuffle::Shuffler;

/// 答错时给出的解说
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleFeedback {
    pub expected: String,
    pub attempt: String,
    pub title: String,
    pub description: String,
}

impl PuzzleFeedback {
    /// 界面显示用的提示文本
    pub fn message(&self) -> String {
        format!(
            "正解は: {}\n君の答え: {}\n\n📚 解説:\n【{}】\n{}",
            self.expected, self.attempt, self.title, self.description
        )
    }
}

/// 提交结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleVerdict {
    Correct,
    Incorrect(PuzzleFeedback),
}

impl PuzzleVerdict {
    pub fn is_correct(&self) -> bool {
        matches!(self, PuzzleVerdict::Correct)
    }
}

/// 例句重排题
///
/// 不变量：`pool` 与 `composed` 的并集（多重集）始终等于 `tokens`
pub struct ReorderPuzzle {
    /// 当前题目的 ID（未初始化时为空）
    item_id: Option<i64>,
    answer: String,
    title: String,
    description: String,
    tokens: Vec<String>,
    pool: Vec<String>,
    composed: Vec<String>,
    shuffler: Shuffler,
}

impl ReorderPuzzle {
    pub fn new(shuffler: Shuffler) -> Self {
        Self {
            item_id: None,
            answer: String::new(),
            title: String::new(),
            description: String::new(),
            tokens: Vec::new(),
            pool: Vec::new(),
            composed: Vec::new(),
            shuffler,
        }
    }

    /// 按题目同步；还是同一道题时什么都不做
    ///
    /// 返回是否重新初始化
    pub fn sync(&mut self, item: &GrammarReorder) -> bool {
        if self.item_id == Some(item.id) {
            return false;
        }

        self.item_id = Some(item.id);
        self.answer = item.sentence.clone();
        self.title = item.title.clone();
        self.description = item.description.clone();
        self.tokens = tokenize(&item.sentence);
        self.reset();

        debug!("🧩 重排题初始化: {} 个字", self.tokens.len());
        true
    }

    /// 从候选池选一个字，追加到答案末尾
    pub fn select(&mut self, pool_index: usize) -> bool {
        if pool_index >= self.pool.len() {
            return false;
        }
        let token = self.pool.remove(pool_index);
        self.composed.push(token);
        true
    }

    /// 从答案里取回一个字，放回候选池末尾
    pub fn unselect(&mut self, composed_index: usize) -> bool {
        if composed_index >= self.composed.len() {
            return false;
        }
        let token = self.composed.remove(composed_index);
        self.pool.push(token);
        true
    }

    /// 清空答案并重新打乱全部字
    pub fn reset(&mut self) {
        self.composed.clear();
        self.pool = self.shuffler.shuffle(self.tokens.clone());
    }

    /// 回到未初始化状态，下一次 `sync` 必定重新出题
    pub fn clear(&mut self) {
        self.item_id = None;
        self.answer.clear();
        self.title.clear();
        self.description.clear();
        self.tokens.clear();
        self.pool.clear();
        self.composed.clear();
    }

    /// 整句比对；答错时附带解说并重置
    pub fn submit(&mut self) -> PuzzleVerdict {
        let attempt = self.attempt();
        if !self.composed.is_empty() && attempt == self.answer {
            return PuzzleVerdict::Correct;
        }

        let feedback = PuzzleFeedback {
            expected: self.answer.clone(),
            attempt,
            title: self.title.clone(),
            description: self.description.clone(),
        };
        self.reset();
        PuzzleVerdict::Incorrect(feedback)
    }

    pub fn attempt(&self) -> String {
        self.composed.concat()
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    pub fn composed(&self) -> &[String] {
        &self.composed
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

/// 按字拆分，丢弃空白
fn tokenize(sentence: &str) -> Vec<String> {
    sentence
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(sentence: &str) -> GrammarReorder {
        item_with_id(1000, sentence)
    }

    fn item_with_id(id: i64, sentence: &str) -> GrammarReorder {
        GrammarReorder {
            id,
            sentence: sentence.to_string(),
            reference: "私は中国語を勉強するのが好きです。".to_string(),
            title: "動詞フレーズの目的語".to_string(),
            description: "喜欢の後ろに動詞フレーズを置ける".to_string(),
        }
    }

    fn puzzle(sentence: &str) -> ReorderPuzzle {
        let mut puzzle = ReorderPuzzle::new(Shuffler::seeded(5));
        puzzle.sync(&item(sentence));
        puzzle
    }

    fn sorted(tokens: &[String]) -> Vec<String> {
        let mut tokens = tokens.to_vec();
        tokens.sort();
        tokens
    }

    /// 按答案顺序依次从池中选字
    fn compose_in_order(puzzle: &mut ReorderPuzzle, answer: &str) {
        for ch in answer.chars().filter(|c| !c.is_whitespace()) {
            let target = ch.to_string();
            let idx = puzzle.pool().iter().position(|t| *t == target).unwrap();
            assert!(puzzle.select(idx));
        }
    }

    #[test]
    fn initial_pool_holds_every_char() {
        let puzzle = puzzle("我 喜欢 学习中文");
        assert_eq!(puzzle.token_count(), 7);
        assert!(puzzle.composed().is_empty());
        let expected: Vec<String> = "我喜欢学习中文".chars().map(String::from).collect();
        assert_eq!(sorted(puzzle.pool()), sorted(&expected));
    }

    #[test]
    fn correct_order_is_accepted() {
        let mut puzzle = puzzle("我喜欢学习中文");
        compose_in_order(&mut puzzle, "我喜欢学习中文");
        assert_eq!(puzzle.submit(), PuzzleVerdict::Correct);
    }

    #[test]
    fn wrong_order_gives_feedback_and_resets() {
        let mut puzzle = puzzle("我喜欢学习中文");
        compose_in_order(&mut puzzle, "我学习喜欢中文");

        match puzzle.submit() {
            PuzzleVerdict::Incorrect(feedback) => {
                assert_eq!(feedback.expected, "我喜欢学习中文");
                assert_eq!(feedback.attempt, "我学习喜欢中文");
                assert_eq!(feedback.title, "動詞フレーズの目的語");
                assert!(feedback.message().starts_with("正解は: 我喜欢学习中文\n君の答え: 我学习喜欢中文"));
            }
            PuzzleVerdict::Correct => panic!("wrong order must not be accepted"),
        }
        assert!(puzzle.composed().is_empty());
        assert_eq!(puzzle.pool().len(), 7);
    }

    #[test]
    fn empty_submission_is_a_mismatch() {
        let mut puzzle = puzzle("你好");
        assert!(!puzzle.submit().is_correct());
        assert_eq!(puzzle.pool().len(), 2);
    }

    #[test]
    fn partial_answer_is_a_mismatch() {
        let mut puzzle = puzzle("我喜欢学习中文");
        compose_in_order(&mut puzzle, "我喜欢学习中");
        assert!(!puzzle.submit().is_correct());
    }

    #[test]
    fn tokens_are_conserved() {
        let mut puzzle = puzzle("他把书拿出来了。");
        let all = sorted(puzzle.pool());

        assert!(puzzle.select(2));
        assert!(puzzle.select(0));
        assert!(puzzle.select(3));
        assert!(puzzle.unselect(1));
        assert!(!puzzle.select(99));
        assert!(!puzzle.unselect(99));

        let mut union = puzzle.pool().to_vec();
        union.extend_from_slice(puzzle.composed());
        assert_eq!(sorted(&union), all);

        puzzle.reset();
        assert!(puzzle.composed().is_empty());
        assert_eq!(sorted(puzzle.pool()), all);
    }

    #[test]
    fn unselect_returns_token_to_pool_end() {
        let mut puzzle = puzzle("中文");
        let first = puzzle.pool()[0].clone();
        assert!(puzzle.select(0));
        assert!(puzzle.unselect(0));
        assert_eq!(puzzle.pool().last(), Some(&first));
    }

    #[test]
    fn sync_is_a_noop_for_the_same_item() {
        let mut puzzle = puzzle("我喜欢学习中文");
        assert!(puzzle.select(0));
        assert!(!puzzle.sync(&item("我喜欢学习中文")));
        assert_eq!(puzzle.composed().len(), 1);

        assert!(puzzle.sync(&item_with_id(2000, "你好")));
        assert!(puzzle.composed().is_empty());
        assert_eq!(puzzle.token_count(), 2);
    }

    #[test]
    fn same_sentence_under_another_item_starts_empty() {
        let mut puzzle = puzzle("我喜欢学习中文");
        compose_in_order(&mut puzzle, "我喜欢");

        assert!(puzzle.sync(&item_with_id(1001, "我喜欢学习中文")));
        assert!(puzzle.composed().is_empty());
        assert_eq!(puzzle.pool().len(), 7);
    }

    #[test]
    fn clear_forces_the_next_sync() {
        let mut puzzle = puzzle("你好");
        compose_in_order(&mut puzzle, "你好");

        puzzle.clear();
        assert!(puzzle.composed().is_empty());
        assert_eq!(puzzle.token_count(), 0);

        assert!(puzzle.sync(&item("你好")));
        assert!(puzzle.composed().is_empty());
        assert_eq!(puzzle.pool().len(), 2);
    }
}
