pub mod toml_loader;

pub use toml_loader::{load_all_lesson_files, load_lesson_file, LessonFile, TomlLessonSource};
