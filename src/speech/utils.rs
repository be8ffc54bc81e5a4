use reqwest::Client;
use std::time::Duration;

/// 创建标准配置的 HTTP 客户端（30s 超时）
pub fn create_http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// 截断文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_len {
        text.to_string()
    } else {
        let truncated: String = chars.iter().take(max_len).collect();
        format!("{}...", truncated)
    }
}
