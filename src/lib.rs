//! 法语发音练习引擎
//!
//! 核心是两部分：
//! - `matcher`：转写文本与目标短语的归一化比较（相似度 + 是否通过 + 分档反馈）
//! - `practice`：复述计数状态机与练习会话
//!
//! 语音转写、语音合成、短语生成是外部服务，在 `speech` 与 `phrases` 中以接口和
//! HTTP 客户端的形式提供。

pub mod config;
pub mod matcher;
mod openai_client;
pub mod phrases;
pub mod practice;
pub mod speech;

pub use config::{AppConfig, LlmConfig, PracticeConfig, SpeechConfig};
pub use matcher::{feedback, is_acceptable, normalize, similarity, MatchResult, TextMatcher};
pub use openai_client::OpenAiClientConfig;
pub use phrases::{Difficulty, Phrase, PhraseFilter, PhraseGenerator, PhraseStore};
pub use practice::{AttemptOutcome, PracticeSession, RepetitionProgress, RepetitionTracker};

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则 verbose 时为 debug，默认 info
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
