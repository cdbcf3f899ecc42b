//! 日志工具模块
//!
//! 提供日志初始化和格式化输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{Mode, ResultBatch};

/// 初始化 tracing 订阅器
///
/// 优先使用 `RUST_LOG`；未设置时默认 info，`verbose` 为真时默认 debug
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    match &config.lesson_folder {
        Some(folder) => info!("📁 课程来源: 本地 TOML ({})", folder),
        None => info!("🌐 课程来源: {}", config.api_base_url),
    }
    info!(
        "📊 每轮 {} 题, 每 {} 条汇总, 采点轮询 {}ms × {} 次",
        config.questions_per_set,
        config.results_batch_size,
        config.poll_interval_ms,
        config.max_poll_attempts
    );
    info!("{}", "=".repeat(60));
}

/// 记录会话开始信息
pub fn log_session_start(lesson: u32, mode: Mode, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("[课 {}] 📝 开始测验: {} 模式, 共 {} 题", lesson, mode, total);
    info!("{}", "─".repeat(60));
}

/// 记录结果汇总
pub fn log_batch_summary(lesson: u32, batch: &ResultBatch) {
    info!("\n{}", "=".repeat(60));
    info!("[课 {}] 📊 结果汇总", lesson);
    info!(
        "✅ 正确: {} ({}%)",
        batch.score_label(),
        batch.percentage
    );
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_text("我喜欢学习中文", 3), "我喜欢...");
        assert_eq!(truncate_text("你好", 5), "你好");
    }
}
