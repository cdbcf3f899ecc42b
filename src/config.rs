use std::time::Duration;

use crate::error::{AppResult, ConfigError};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 后端 API 地址
    pub api_base_url: String,
    /// 认证令牌（Bearer）
    pub auth_token: Option<String>,
    /// 本地 TOML 课程目录（设置后不走 HTTP 取题）
    pub lesson_folder: Option<String>,
    /// 每轮出题数量
    pub questions_per_set: usize,
    /// 每记满多少条结果显示一次结果画面
    pub results_batch_size: usize,
    /// 采点结果轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 采点结果最大轮询次数
    pub max_poll_attempts: u32,
    /// 单次 HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            auth_token: None,
            lesson_folder: None,
            questions_per_set: 10,
            results_batch_size: 10,
            poll_interval_ms: 1000,
            max_poll_attempts: 30,
            request_timeout_secs: 30,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("TUTOR_API_URL").unwrap_or(default.api_base_url),
            auth_token: std::env::var("TUTOR_AUTH_TOKEN").ok().filter(|v| !v.is_empty()).or(default.auth_token),
            lesson_folder: std::env::var("LESSON_FOLDER").ok().filter(|v| !v.is_empty()).or(default.lesson_folder),
            questions_per_set: std::env::var("QUESTIONS_PER_SET").ok().and_then(|v| v.parse().ok()).unwrap_or(default.questions_per_set),
            results_batch_size: std::env::var("RESULTS_BATCH_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.results_batch_size),
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_interval_ms),
            max_poll_attempts: std::env::var("MAX_POLL_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_poll_attempts),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 校验配置
    pub fn validate(&self) -> AppResult<()> {
        if self.questions_per_set == 0 {
            return Err(invalid("QUESTIONS_PER_SET", 0, "必须大于 0").into());
        }
        if self.results_batch_size == 0 {
            return Err(invalid("RESULTS_BATCH_SIZE", 0, "必须大于 0").into());
        }
        if self.max_poll_attempts == 0 {
            return Err(invalid("MAX_POLL_ATTEMPTS", 0, "必须大于 0").into());
        }
        if self.poll_interval_ms == 0 {
            return Err(invalid("POLL_INTERVAL_MS", 0, "必须大于 0").into());
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn invalid(name: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
