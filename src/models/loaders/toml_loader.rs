use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;

use crate::api::LessonApi;
use crate::error::{AppError, AppResult, FileError};
use crate::models::lesson::{GrammarRecord, WordRecord};

/// 单个 TOML 课程文件
#[derive(Debug, Clone, Deserialize)]
pub struct LessonFile {
    pub lesson: u32,
    #[serde(default)]
    pub words: Vec<WordRecord>,
    #[serde(default)]
    pub grammar: Vec<GrammarRecord>,
}

/// 从 TOML 文件加载课程数据
pub async fn load_lesson_file(toml_file_path: &Path) -> AppResult<LessonFile> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(toml_file_path.display().to_string(), e))?;

    let mut file: LessonFile = toml::from_str(&content).map_err(|e| {
        AppError::File(FileError::TomlParseFailed {
            path: toml_file_path.display().to_string(),
            source: Box::new(e),
        })
    })?;

    // 文件里的记录可以省略 lesson 字段，统一以文件头为准
    let lesson = file.lesson;
    file.words.iter_mut().for_each(|w| w.lesson = lesson);
    file.grammar.iter_mut().for_each(|g| g.lesson = lesson);

    Ok(file)
}

/// 从文件夹中加载所有 TOML 课程文件
///
/// 无法解析的文件会被跳过并记录警告
pub async fn load_all_lesson_files(folder_path: &Path) -> AppResult<Vec<LessonFile>> {
    if !folder_path.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.display().to_string(),
        }
        .into());
    }

    let mut lessons = Vec::new();
    let mut entries = fs::read_dir(folder_path)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path.display().to_string(), e))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("toml") {
            continue;
        }

        tracing::debug!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_lesson_file(&path).await {
            Ok(file) => {
                tracing::debug!(
                    "第 {} 课: 单词 {} 个, 语法 {} 条",
                    file.lesson,
                    file.words.len(),
                    file.grammar.len()
                );
                lessons.push(file);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(lessons)
}

/// 本地 TOML 课程源
///
/// 每次调用都重新扫描目录，文件的增删可以立即生效
pub struct TomlLessonSource {
    folder: PathBuf,
}

impl TomlLessonSource {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }
}

#[async_trait]
impl LessonApi for TomlLessonSource {
    async fn list_lessons(&self) -> AppResult<Vec<u32>> {
        let mut lessons: Vec<u32> = load_all_lesson_files(&self.folder)
            .await?
            .into_iter()
            .filter(|f| !f.words.is_empty() || !f.grammar.is_empty())
            .map(|f| f.lesson)
            .collect();
        lessons.sort_unstable();
        lessons.dedup();
        Ok(lessons)
    }

    async fn fetch_words(&self, lesson: u32) -> AppResult<Vec<WordRecord>> {
        Ok(load_all_lesson_files(&self.folder)
            .await?
            .into_iter()
            .filter(|f| f.lesson == lesson)
            .flat_map(|f| f.words)
            .collect())
    }

    async fn fetch_grammar(&self, lesson: u32) -> AppResult<Vec<GrammarRecord>> {
        Ok(load_all_lesson_files(&self.folder)
            .await?
            .into_iter()
            .filter(|f| f.lesson == lesson)
            .flat_map(|f| f.grammar)
            .collect())
    }
}
