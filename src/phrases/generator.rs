// LLM 短语生成器
//
// 功能：按主题调用 LLM 生成练习短语
// 输出：JSON 数组，逐条校验后转换为 Phrase

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::time::{timeout, Duration};

use crate::openai_client::{ChatPrompt, OpenAiClient, OpenAiClientConfig};
use crate::phrases::types::{Difficulty, Phrase};

/// 单次最多生成条数
pub const MAX_PHRASES_PER_REQUEST: usize = 20;

/// 原文/译文最大字符数
const MAX_TEXT_LEN: usize = 160;

/// 分类最大字符数
const MAX_CATEGORY_LEN: usize = 32;

/// LLM 返回的单条短语（字段均宽松）
#[derive(Debug, Clone, Deserialize)]
struct GeneratedPhrase {
    #[serde(default)]
    text: String,
    #[serde(default)]
    translation: String,
    #[serde(default)]
    difficulty: String,
    #[serde(default)]
    category: String,
}

/// 短语生成器
pub struct PhraseGenerator {
    client: OpenAiClient,
}

impl PhraseGenerator {
    pub fn new(config: OpenAiClientConfig) -> Self {
        Self {
            client: OpenAiClient::new(config),
        }
    }

    /// 按主题生成短语
    ///
    /// # Arguments
    /// * `topic` - 主题（同时作为生成短语的 phrase_set）
    /// * `count` - 期望条数（1..=20）
    /// * `difficulty` - 目标难度；LLM 未给出有效难度时使用该值
    pub async fn generate(
        &self,
        topic: &str,
        count: usize,
        difficulty: Difficulty,
    ) -> Result<Vec<Phrase>> {
        let topic = topic.trim();
        if topic.is_empty() {
            anyhow::bail!("主题不能为空");
        }
        let count = count.clamp(1, MAX_PHRASES_PER_REQUEST);

        let system_prompt = r#"You are a French teacher who writes short phrases for pronunciation drills.

Rules:
1. Every phrase is natural, everyday French that a learner would actually say.
2. Keep each phrase under 12 words.
3. Provide an English translation.
4. Use one lowercase word as the category (e.g. "greetings", "restaurant", "travel").
5. difficulty is one of "beginner", "intermediate", "advanced".

Return ONLY a JSON array (no markdown), for example:
[{"text": "Je voudrais un café, s'il vous plaît", "translation": "I would like a coffee, please", "difficulty": "intermediate", "category": "restaurant"}]"#;

        let user_prompt = format!(
            "Topic: \"{}\"\nNumber of phrases: {}\nDifficulty: {}",
            topic, count, difficulty
        );

        let prompt = ChatPrompt {
            system: system_prompt,
            user: &user_prompt,
            // 稍高温度，避免每次生成相同短语
            temperature: 0.7,
            max_tokens: 2048,
        };

        tracing::info!(
            "请求 LLM 生成短语: topic=\"{}\", count={}, difficulty={}",
            topic,
            count,
            difficulty
        );

        let response = timeout(
            Duration::from_secs(10),
            self.client.chat(&prompt),
        )
        .await
        .map_err(|_| anyhow!("LLM 生成短语超时（10s）"))??;

        let phrases = parse_generated_phrases(&response, topic, difficulty)?;
        tracing::info!("LLM 生成 {} 条有效短语", phrases.len());

        Ok(phrases.into_iter().take(count).collect())
    }
}

/// 解析 LLM 响应中的短语数组
fn parse_generated_phrases(text: &str, topic: &str, fallback: Difficulty) -> Result<Vec<Phrase>> {
    let raw = extract_json_array(text)?;

    let phrases: Vec<Phrase> = raw
        .into_iter()
        .filter_map(|item| sanitize_phrase(item, topic, fallback))
        .collect();

    if phrases.is_empty() {
        anyhow::bail!("LLM 未返回任何有效短语");
    }
    Ok(phrases)
}

/// 提取 JSON 数组
///
/// 先整体解析；失败时从第一个 '[' 开始，逐个尝试到每个 ']' 为止的片段
fn extract_json_array(text: &str) -> Result<Vec<GeneratedPhrase>> {
    if let Ok(parsed) = serde_json::from_str::<Vec<GeneratedPhrase>>(text.trim()) {
        return Ok(parsed);
    }

    let start = text.find('[').ok_or_else(|| anyhow!("LLM 响应缺少 JSON 数组"))?;

    let mut last_error = None;
    for (idx, _) in text[start..].match_indices(']') {
        let end_pos = start + idx;
        let json = &text[start..=end_pos];

        match serde_json::from_str::<Vec<GeneratedPhrase>>(json) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "LLM 响应解析失败: {}",
        last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "未找到有效 JSON".to_string())
    ))
}

/// 校验并清理单条短语
///
/// - 原文为空则丢弃
/// - 原文/译文/分类超长则截断
/// - 难度无法识别时使用 fallback
fn sanitize_phrase(item: GeneratedPhrase, topic: &str, fallback: Difficulty) -> Option<Phrase> {
    let text = truncate_chars(item.text.trim(), MAX_TEXT_LEN);
    if text.is_empty() {
        tracing::debug!("丢弃原文为空的生成短语");
        return None;
    }

    let difficulty = Difficulty::parse(&item.difficulty).unwrap_or_else(|| {
        if !item.difficulty.trim().is_empty() {
            tracing::debug!("LLM 返回无效难度 '{}', 使用 '{}'", item.difficulty, fallback);
        }
        fallback
    });

    let category = truncate_chars(&item.category.trim().to_lowercase(), MAX_CATEGORY_LEN);

    let phrase = Phrase {
        text,
        translation: truncate_chars(item.translation.trim(), MAX_TEXT_LEN),
        difficulty,
        category: if category.is_empty() {
            "general".to_string()
        } else {
            category
        },
        phrase_set: Some(topic.to_string()),
    };
    if let Err(e) = phrase.validate() {
        tracing::debug!("丢弃生成短语: {}", e);
        return None;
    }
    Some(phrase)
}

fn truncate_chars(text: &str, max_len: usize) -> String {
    text.chars().take(max_len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let response = r#"[
            {"text": "Bonjour", "translation": "Hello", "difficulty": "beginner", "category": "Greetings"},
            {"text": "Où est la gare ?", "translation": "Where is the station?", "difficulty": "intermediate", "category": "travel"}
        ]"#;

        let phrases = parse_generated_phrases(response, "voyage", Difficulty::Beginner).unwrap();
        assert_eq!(phrases.len(), 2);
        assert_eq!(phrases[0].category, "greetings");
        assert_eq!(phrases[1].difficulty, Difficulty::Intermediate);
        assert!(phrases.iter().all(|p| p.phrase_set.as_deref() == Some("voyage")));
    }

    #[test]
    fn test_parse_wrapped_in_prose() {
        let response = "Voici les phrases :\n```json\n[{\"text\": \"Merci\", \"translation\": \"Thanks\"}]\n```\nBonne pratique [1]";

        let phrases = parse_generated_phrases(response, "basics", Difficulty::Advanced).unwrap();
        assert_eq!(phrases.len(), 1);
        assert_eq!(phrases[0].text, "Merci");
        // 缺失难度时使用请求难度
        assert_eq!(phrases[0].difficulty, Difficulty::Advanced);
        assert_eq!(phrases[0].category, "general");
    }

    #[test]
    fn test_drop_empty_text() {
        let response = r#"[{"text": "  "}, {"text": "Salut", "difficulty": "expert"}]"#;

        let phrases = parse_generated_phrases(response, "basics", Difficulty::Beginner).unwrap();
        assert_eq!(phrases.len(), 1);
        assert_eq!(phrases[0].text, "Salut");
        assert_eq!(phrases[0].difficulty, Difficulty::Beginner);
    }

    #[test]
    fn test_all_invalid_is_error() {
        assert!(parse_generated_phrases(r#"[{"text": ""}]"#, "x", Difficulty::Beginner).is_err());
        assert!(parse_generated_phrases(r#"[{"text": "?!"}]"#, "x", Difficulty::Beginner).is_err());
        assert!(parse_generated_phrases("no json here", "x", Difficulty::Beginner).is_err());
    }

    #[test]
    fn test_truncate_long_fields() {
        let long_text = "a".repeat(MAX_TEXT_LEN + 50);
        let item = GeneratedPhrase {
            text: long_text,
            translation: String::new(),
            difficulty: String::new(),
            category: "c".repeat(100),
        };

        let phrase = sanitize_phrase(item, "topic", Difficulty::Beginner).unwrap();
        assert_eq!(phrase.text.chars().count(), MAX_TEXT_LEN);
        assert_eq!(phrase.category.chars().count(), MAX_CATEGORY_LEN);
    }
}
