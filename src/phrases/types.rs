// 短语类型定义
//
// 短语语料由外部提供，匹配层只读取 text 字段，其余元数据原样透传

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::matcher::normalize;

/// 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    /// 宽松解析（忽略大小写与首尾空白），无法识别时返回 None
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "beginner" | "easy" => Some(Difficulty::Beginner),
            "intermediate" | "medium" => Some(Difficulty::Intermediate),
            "advanced" | "hard" => Some(Difficulty::Advanced),
            _ => None,
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Difficulty::parse(s).ok_or_else(|| anyhow::anyhow!("未知难度: {}", s))
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 练习短语
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phrase {
    /// 目标语言原文（匹配基准）
    pub text: String,
    /// 译文
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub category: String,
    /// 所属短语集（如生成时的主题）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phrase_set: Option<String>,
}

impl Phrase {
    /// 创建短语，原文归一化后为空时报错
    pub fn new(
        text: impl Into<String>,
        translation: impl Into<String>,
        difficulty: Difficulty,
        category: impl Into<String>,
    ) -> Result<Self> {
        let phrase = Self {
            text: text.into().trim().to_string(),
            translation: translation.into().trim().to_string(),
            difficulty,
            category: category.into().trim().to_string(),
            phrase_set: None,
        };
        phrase.validate()?;
        Ok(phrase)
    }

    pub fn with_phrase_set(mut self, phrase_set: impl Into<String>) -> Self {
        self.phrase_set = Some(phrase_set.into());
        self
    }

    /// 校验：原文归一化后不能为空（纯标点也算空）
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            anyhow::bail!("短语原文不能为空");
        }
        if normalize(&self.text).is_empty() {
            anyhow::bail!("短语原文不含可比较的字符: {:?}", self.text);
        }
        Ok(())
    }
}

/// 短语筛选条件
///
/// 所有 Some 字段都需匹配；None 表示不限
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhraseFilter {
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub phrase_set: Option<String>,
}

impl PhraseFilter {
    /// 不限条件
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.difficulty.is_none() && self.phrase_set.is_none()
    }

    /// 判断短语是否满足条件（分类与短语集不区分大小写，含带重音的大写）
    pub fn matches(&self, phrase: &Phrase) -> bool {
        if let Some(ref category) = self.category {
            if !eq_ignore_case(&phrase.category, category) {
                return false;
            }
        }
        if let Some(difficulty) = self.difficulty {
            if phrase.difficulty != difficulty {
                return false;
            }
        }
        if let Some(ref set) = self.phrase_set {
            let matched = phrase
                .phrase_set
                .as_deref()
                .map(|s| eq_ignore_case(s, set))
                .unwrap_or(false);
            if !matched {
                return false;
            }
        }
        true
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrase(text: &str, difficulty: Difficulty, category: &str) -> Phrase {
        Phrase::new(text, "", difficulty, category).unwrap()
    }

    #[test]
    fn test_reject_empty_text() {
        assert!(Phrase::new("", "hello", Difficulty::Beginner, "greetings").is_err());
        assert!(Phrase::new("   ", "hello", Difficulty::Beginner, "greetings").is_err());
    }

    #[test]
    fn test_reject_punctuation_only_text() {
        assert!(Phrase::new("?!", "", Difficulty::Beginner, "misc").is_err());
        assert!(Phrase::new("« ... »", "", Difficulty::Beginner, "misc").is_err());
        assert!(Phrase::new("Ça ?", "", Difficulty::Beginner, "misc").is_ok());

        // 直接构造的短语同样被 validate 拦下
        let raw = Phrase {
            text: "...".to_string(),
            translation: String::new(),
            difficulty: Difficulty::Beginner,
            category: String::new(),
            phrase_set: None,
        };
        assert!(raw.validate().is_err());
    }

    #[test]
    fn test_camel_case_json() {
        let p = phrase("Bonjour", Difficulty::Beginner, "greetings").with_phrase_set("Café");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["phraseSet"], "Café");
        assert_eq!(json["difficulty"], "beginner");

        let parsed: Phrase = serde_json::from_str(r#"{"text":"Merci"}"#).unwrap();
        assert_eq!(parsed.difficulty, Difficulty::Beginner);
        assert!(parsed.phrase_set.is_none());
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(Difficulty::parse(" Advanced "), Some(Difficulty::Advanced));
        assert_eq!(Difficulty::parse("medium"), Some(Difficulty::Intermediate));
        assert_eq!(Difficulty::parse("expert"), None);
        assert!("expert".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_filter_matches() {
        let p = phrase("Où est la gare ?", Difficulty::Intermediate, "Travel").with_phrase_set("voyage");

        assert!(PhraseFilter::all().matches(&p));

        let by_category = PhraseFilter {
            category: Some("travel".to_string()),
            ..Default::default()
        };
        assert!(by_category.matches(&p));

        let wrong_difficulty = PhraseFilter {
            category: Some("travel".to_string()),
            difficulty: Some(Difficulty::Beginner),
            ..Default::default()
        };
        assert!(!wrong_difficulty.matches(&p));

        let by_set = PhraseFilter {
            phrase_set: Some("VOYAGE".to_string()),
            ..Default::default()
        };
        assert!(by_set.matches(&p));

        let unset = phrase("Bonjour", Difficulty::Beginner, "greetings");
        assert!(!by_set.matches(&unset));
    }

    #[test]
    fn test_filter_matches_accented_capitals() {
        let p = phrase("Un café, s'il vous plaît", Difficulty::Beginner, "Café").with_phrase_set("Été");

        let by_category = PhraseFilter {
            category: Some("CAFÉ".to_string()),
            ..Default::default()
        };
        assert!(by_category.matches(&p));

        let by_set = PhraseFilter {
            phrase_set: Some(" été ".to_string()),
            ..Default::default()
        };
        assert!(by_set.matches(&p));

        // 大小写不敏感，但重音仍区分
        let unaccented = PhraseFilter {
            category: Some("cafe".to_string()),
            ..Default::default()
        };
        assert!(!unaccented.matches(&p));
    }
}
