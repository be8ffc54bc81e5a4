// src/config.rs

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::matcher::DEFAULT_ACCEPTANCE_THRESHOLD;

/// 环境变量：Google API Key（配置文件未填写时生效）
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";
/// 环境变量：LLM API Key（配置文件未填写时生效）
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

// ============================================================================
// 练习配置
// ============================================================================

/// 练习配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeConfig {
    /// 掌握一个短语所需的通过次数，默认 5
    #[serde(default = "default_required_reps")]
    pub required_reps: u32,
    /// 通过阈值，默认 0.7
    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: f64,
}

fn default_required_reps() -> u32 {
    5
}

fn default_acceptance_threshold() -> f64 {
    DEFAULT_ACCEPTANCE_THRESHOLD
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            required_reps: default_required_reps(),
            acceptance_threshold: default_acceptance_threshold(),
        }
    }
}

impl PracticeConfig {
    /// 验证配置
    pub fn validate(&self) -> Result<()> {
        if self.required_reps == 0 {
            anyhow::bail!("required_reps 必须 ≥ 1");
        }
        if !(self.acceptance_threshold > 0.0 && self.acceptance_threshold <= 1.0) {
            anyhow::bail!(
                "acceptance_threshold 必须在 (0, 1] 之间，当前值: {}",
                self.acceptance_threshold
            );
        }
        Ok(())
    }
}

// ============================================================================
// 语音服务配置
// ============================================================================

/// 语音服务配置（Google STT / TTS 共用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default)]
    pub api_key: String,
    /// 识别与合成语言
    #[serde(default = "default_language_code")]
    pub language_code: String,
    /// 合成音色
    #[serde(default = "default_voice_name")]
    pub voice_name: String,
    /// 合成语速（1.0 为正常）
    #[serde(default = "default_speaking_rate")]
    pub speaking_rate: f64,
}

fn default_language_code() -> String {
    "fr-FR".to_string()
}

fn default_voice_name() -> String {
    "fr-FR-Standard-A".to_string()
}

fn default_speaking_rate() -> f64 {
    0.9
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language_code: default_language_code(),
            voice_name: default_voice_name(),
            speaking_rate: default_speaking_rate(),
        }
    }
}

// ============================================================================
// LLM 配置
// ============================================================================

/// 短语生成使用的 LLM 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            api_key: String::new(),
            model: default_llm_model(),
        }
    }
}

impl LlmConfig {
    pub fn is_valid(&self) -> bool {
        !self.endpoint.trim().is_empty()
            && !self.api_key.trim().is_empty()
            && !self.model.trim().is_empty()
    }
}

/// Normalize OpenAI-compatible chat completions endpoint.
///
/// Users/providers may provide either:
/// - Base URL (e.g. https://api.openai.com/v1)
/// - Full endpoint (e.g. https://api.openai.com/v1/chat/completions)
pub fn normalize_chat_completions_endpoint(endpoint: &str) -> String {
    let mut e = endpoint.trim().to_string();
    if e.is_empty() {
        return e;
    }

    while e.ends_with('/') {
        e.pop();
    }

    if e.ends_with("/chat/completions") {
        return e;
    }

    // Tolerate the common typo: /chat.completions
    if e.ends_with("/chat.completions") {
        return e.replace("/chat.completions", "/chat/completions");
    }

    format!("{}/chat/completions", e)
}

// ============================================================================
// 应用配置
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub practice: PracticeConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    /// 短语库文件（None 时使用配置目录下的 phrases.json）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phrases_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn app_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法获取配置目录"))?;
        let app_dir = config_dir.join("Parler");
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("config.json"))
    }

    /// 短语库路径
    pub fn resolve_phrases_path(&self) -> Result<PathBuf> {
        match &self.phrases_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::app_dir()?.join("phrases.json")),
        }
    }

    /// 从默认位置加载（含环境变量覆盖）
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// 从指定文件加载，文件不存在时返回默认配置
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::info!("尝试从以下路径加载配置: {:?}", path);

        if !path.exists() {
            tracing::warn!("配置文件不存在，使用默认配置");
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("配置文件解析失败 {:?}: {}", path, e))?;
        config.practice.validate()?;

        Ok(config)
    }

    /// 配置文件中未填写的 Key 使用环境变量补齐
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.speech.api_key.trim().is_empty() {
            if let Some(key) = lookup(GOOGLE_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
                tracing::debug!("使用环境变量 {} 作为语音服务 Key", GOOGLE_API_KEY_ENV);
                self.speech.api_key = key;
            }
        }
        if self.llm.api_key.trim().is_empty() {
            if let Some(key) = lookup(OPENAI_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
                tracing::debug!("使用环境变量 {} 作为 LLM Key", OPENAI_API_KEY_ENV);
                self.llm.api_key = key;
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.practice.validate()?;
        let content = serde_json::to_string_pretty(self)?;
        tracing::info!("保存配置到: {:?}", path);
        write_atomic(path, &content)?;
        tracing::info!("配置保存成功");
        Ok(())
    }
}

/// 原子写入文件
///
/// 先写临时文件；目标存在时先备份为 .bak，再把临时文件改名为目标，成功后删除备份。
/// 改名失败时尝试从备份恢复。
pub(crate) fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("json.tmp");
    let backup_path = path.with_extension("json.bak");

    std::fs::write(&temp_path, content).map_err(|e| {
        tracing::error!("写入临时文件失败: {}", e);
        e
    })?;

    if path.exists() {
        if backup_path.exists() {
            let _ = std::fs::remove_file(&backup_path);
        }
        std::fs::rename(path, &backup_path).map_err(|e| {
            tracing::error!("备份旧文件失败: {}", e);
            e
        })?;
    }

    match std::fs::rename(&temp_path, path) {
        Ok(_) => {
            let _ = std::fs::remove_file(&backup_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("重命名临时文件失败: {}", e);
            if backup_path.exists() {
                if let Err(restore_err) = std::fs::rename(&backup_path, path) {
                    tracing::error!("恢复备份失败: {}", restore_err);
                } else {
                    tracing::info!("已从备份恢复");
                }
            }
            Err(e.into())
        }
    }
}
