//! HTTP 执行器 - 基础设施层
//!
//! 持有唯一的 HTTP 客户端资源，只暴露"发请求、取 JSON"的能力

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// HTTP 执行器
///
/// 职责：
/// - 持有 reqwest Client、API 地址和认证令牌
/// - 暴露 get_json() / post_json() 能力
/// - 把非 2xx 响应转换为带可读信息的错误
/// - 不认识课程 / 采点任务
#[derive(Clone)]
pub struct HttpExecutor {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpExecutor {
    /// 创建新的 HTTP 执行器
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::api_request_failed("client", e))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    /// 发送 GET 请求并反序列化响应
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let request = self.client.get(self.url(path)).query(query);
        self.send(path, request).await
    }

    /// 发送 POST(JSON) 请求并反序列化响应
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let request = self.client.post(self.url(path)).json(body);
        self.send(path, request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, path: &str, request: RequestBuilder) -> AppResult<T> {
        let request = match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        debug!("请求 {}", path);

        let response = request
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(path, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(path, e))?;

        if !status.is_success() {
            return Err(AppError::bad_response(
                path,
                status.as_u16(),
                error_message(&text),
            ));
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// 从错误响应体中提取可读信息
///
/// 优先 `detail`，其次 `message`，都没有时返回原始文本
pub fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<JsonValue>(body) {
        for key in ["detail", "message"] {
            if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    body.trim().to_string()
}
