// 短语库存储
//
// JSON 数组文件，按归一化原文去重
// 文件不存在时使用内置的入门短语

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;

use crate::config::write_atomic;
use crate::matcher::normalize;
use crate::phrases::types::{Difficulty, Phrase, PhraseFilter};

/// 内置入门短语：(原文, 译文, 难度, 分类)
const BUILTIN_PHRASES: &[(&str, &str, Difficulty, &str)] = &[
    ("Bonjour", "Hello", Difficulty::Beginner, "greetings"),
    ("Au revoir", "Goodbye", Difficulty::Beginner, "greetings"),
    ("Merci beaucoup", "Thank you very much", Difficulty::Beginner, "greetings"),
    ("Comment allez-vous ?", "How are you?", Difficulty::Beginner, "greetings"),
    ("Je m'appelle Marie", "My name is Marie", Difficulty::Beginner, "introductions"),
    (
        "Je voudrais un café, s'il vous plaît",
        "I would like a coffee, please",
        Difficulty::Intermediate,
        "restaurant",
    ),
    ("L'addition, s'il vous plaît", "The bill, please", Difficulty::Intermediate, "restaurant"),
    ("Où est la gare ?", "Where is the train station?", Difficulty::Intermediate, "travel"),
    (
        "Pourriez-vous parler plus lentement ?",
        "Could you speak more slowly?",
        Difficulty::Advanced,
        "conversation",
    ),
    (
        "Il faut que je parte avant qu'il ne pleuve",
        "I have to leave before it rains",
        Difficulty::Advanced,
        "conversation",
    ),
];

/// 短语库
#[derive(Debug, Clone, Default)]
pub struct PhraseStore {
    phrases: Vec<Phrase>,
}

impl PhraseStore {
    pub fn new(phrases: Vec<Phrase>) -> Self {
        let mut store = Self::default();
        for phrase in phrases {
            store.upsert(phrase);
        }
        store
    }

    /// 内置入门短语库
    pub fn builtin() -> Self {
        let phrases = BUILTIN_PHRASES
            .iter()
            .map(|(text, translation, difficulty, category)| Phrase {
                text: text.to_string(),
                translation: translation.to_string(),
                difficulty: *difficulty,
                category: category.to_string(),
                phrase_set: Some("builtin".to_string()),
            })
            .collect();
        Self { phrases }
    }

    /// 从 JSON 文件加载
    ///
    /// 文件不存在时返回内置短语库；任一短语原文为空则整体报错
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!("短语库文件不存在，使用内置短语: {:?}", path);
            return Ok(Self::builtin());
        }

        tracing::info!("加载短语库: {:?}", path);
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("读取短语库失败: {:?}", path))?;
        let phrases: Vec<Phrase> = serde_json::from_str(&content)
            .with_context(|| format!("短语库格式错误: {:?}", path))?;

        for (idx, phrase) in phrases.iter().enumerate() {
            phrase
                .validate()
                .with_context(|| format!("第 {} 条短语无效", idx + 1))?;
        }

        let total = phrases.len();
        let store = Self::new(phrases);
        if store.len() < total {
            tracing::info!("短语库去重: {} → {}", total, store.len());
        }
        Ok(store)
    }

    /// 原子写入 JSON 文件
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.phrases)?;
        tracing::info!("保存短语库到: {:?} ({} 条)", path, self.phrases.len());
        write_atomic(path, &content)
    }

    /// 插入或更新短语（按归一化原文去重）
    ///
    /// 已存在时用新的元数据覆盖旧条目，返回 true 表示新增；无效短语不入库
    pub fn upsert(&mut self, phrase: Phrase) -> bool {
        if let Err(e) = phrase.validate() {
            tracing::warn!("忽略无效短语: {}", e);
            return false;
        }
        let key = normalize(&phrase.text);

        if let Some(existing) = self.phrases.iter_mut().find(|p| normalize(&p.text) == key) {
            *existing = phrase;
            return false;
        }

        self.phrases.push(phrase);
        true
    }

    /// 批量合并，返回新增条数
    pub fn merge(&mut self, phrases: impl IntoIterator<Item = Phrase>) -> usize {
        let mut added = 0;
        for phrase in phrases {
            if self.upsert(phrase) {
                added += 1;
            }
        }
        added
    }

    pub fn phrases(&self) -> &[Phrase] {
        &self.phrases
    }

    pub fn into_phrases(self) -> Vec<Phrase> {
        self.phrases
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// 按条件筛选（保持原有顺序）
    pub fn filter(&self, filter: &PhraseFilter) -> Vec<&Phrase> {
        self.phrases.iter().filter(|p| filter.matches(p)).collect()
    }

    /// 所有分类（去重、排序）
    pub fn categories(&self) -> Vec<String> {
        self.phrases
            .iter()
            .map(|p| p.category.clone())
            .filter(|c| !c.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 所有短语集（去重、排序）
    pub fn phrase_sets(&self) -> Vec<String> {
        self.phrases
            .iter()
            .filter_map(|p| p.phrase_set.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
