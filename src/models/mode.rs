/// 出题模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// 手写特训（后台 AI 采点）
    Handwriting,
    /// 例句重排
    Reorder,
    /// 日译中闪卡
    Translation,
}

/// 取题时的数据种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Vocabulary,
    Grammar,
}

impl Mode {
    /// 全部模式（选择画面的显示顺序）
    pub const ALL: [Mode; 3] = [Mode::Handwriting, Mode::Reorder, Mode::Translation];

    /// 该模式需要的题目种类
    pub fn kind(self) -> QuestionKind {
        match self {
            Mode::Reorder => QuestionKind::Grammar,
            Mode::Handwriting | Mode::Translation => QuestionKind::Vocabulary,
        }
    }

    /// 界面显示名称
    pub fn label(self) -> &'static str {
        match self {
            Mode::Handwriting => "✍️ 手書き特訓",
            Mode::Reorder => "🧩 並べ替え",
            Mode::Translation => "🇨🇳 和文中訳",
        }
    }

    /// 从用户输入解析模式（英文名、日文名或简写）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "handwriting" | "手書き" | "hw" | "h" | "1" => Some(Mode::Handwriting),
            "reorder" | "並べ替え" | "sorting" | "r" | "2" => Some(Mode::Reorder),
            "translation" | "和文中訳" | "card" | "t" | "3" => Some(Mode::Translation),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mode::Handwriting => "handwriting",
            Mode::Reorder => "reorder",
            Mode::Translation => "translation",
        };
        write!(f, "{}", name)
    }
}
