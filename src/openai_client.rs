// src/openai_client.rs
//
// OpenAI 兼容 chat completions 客户端
//
// 只发送一条 system + 一条 user 消息，返回首个 choice 的文本

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::normalize_chat_completions_endpoint;

/// 单轮请求
#[derive(Debug, Clone, Copy)]
pub struct ChatPrompt<'a> {
    pub system: &'a str,
    pub user: &'a str,
    /// f64：f32 的 0.7 序列化后会带出精度尾巴
    pub temperature: f64,
    pub max_tokens: u32,
}

/// 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiClientConfig {
    /// 完整的 /chat/completions 地址（构造时由基础 URL 补全）
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
}

impl OpenAiClientConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: normalize_chat_completions_endpoint(&endpoint.into()),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

pub struct OpenAiClient {
    config: OpenAiClientConfig,
    client: Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiClientConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    fn build_request_body(&self, prompt: &ChatPrompt<'_>) -> Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user}
            ],
            "max_tokens": prompt.max_tokens,
            "temperature": prompt.temperature
        })
    }

    pub async fn chat(&self, prompt: &ChatPrompt<'_>) -> Result<String> {
        let request_body = self.build_request_body(prompt);

        tracing::debug!(
            "LLM 请求: endpoint={}, model={}, api_key_len={}, user_len={}",
            self.config.endpoint,
            self.config.model,
            self.config.api_key.len(),
            prompt.user.chars().count()
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("LLM 请求失败 ({}): {}", status, text);
        }

        let payload: Value = response.json().await?;
        parse_chat_response(&payload)
    }
}

fn parse_chat_response(payload: &Value) -> Result<String> {
    payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| anyhow::anyhow!("LLM 响应缺少 choices[0].message.content: {}", payload))
}
