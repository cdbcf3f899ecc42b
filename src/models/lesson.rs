use serde::{Deserialize, Serialize};

/// 单词记录（`/api/words` 的原始数据）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordRecord {
    pub id: i64,
    #[serde(default)]
    pub lesson: u32,
    pub word: String,
    #[serde(default)]
    pub pinyin: String,
    #[serde(default)]
    pub meaning: String,
}

/// 语法记录（`/api/grammar` 的原始数据）
///
/// `example_cn` / `example_jp` 是多行文本，每行一个带编号的例句
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarRecord {
    pub id: i64,
    #[serde(default)]
    pub lesson: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub example_cn: String,
    #[serde(default)]
    pub example_jp: String,
}

/// 题目在本轮会话中的唯一标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 单词卡
#[derive(Debug, Clone, PartialEq)]
pub struct VocabularyCard {
    pub id: i64,
    pub word: String,
    pub pinyin: String,
    pub meaning: String,
}

/// 例句重排题（一条语法记录展开后的一个例句）
#[derive(Debug, Clone, PartialEq)]
pub struct GrammarReorder {
    pub id: i64,
    /// 中文例句（答案）
    pub sentence: String,
    /// 日文译文（题面）
    pub reference: String,
    pub title: String,
    pub description: String,
}

/// 题目
#[derive(Debug, Clone, PartialEq)]
pub enum Question {
    Vocabulary(VocabularyCard),
    GrammarReorder(GrammarReorder),
}

impl Question {
    pub fn id(&self) -> QuestionId {
        match self {
            Question::Vocabulary(card) => QuestionId(format!("word-{}", card.id)),
            Question::GrammarReorder(item) => QuestionId(format!("grammar-{}", item.id)),
        }
    }

    /// 标准答案（中文）
    pub fn answer(&self) -> &str {
        match self {
            Question::Vocabulary(card) => &card.word,
            Question::GrammarReorder(item) => &item.sentence,
        }
    }

    /// 题面提示（日文）
    pub fn prompt(&self) -> &str {
        match self {
            Question::Vocabulary(card) => &card.meaning,
            Question::GrammarReorder(item) => &item.reference,
        }
    }

    pub fn as_grammar(&self) -> Option<&GrammarReorder> {
        match self {
            Question::GrammarReorder(item) => Some(item),
            Question::Vocabulary(_) => None,
        }
    }
}

impl From<WordRecord> for Question {
    fn from(record: WordRecord) -> Self {
        Question::Vocabulary(VocabularyCard {
            id: record.id,
            word: record.word,
            pinyin: record.pinyin,
            meaning: record.meaning,
        })
    }
}
