//! 语音协作方类型定义
//!
//! 录音、转写、合成都在匹配层之外；这里只约定数据形状与接口

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// STT 支持的音频编码
///
/// 由 MIME 类型决定，无法识别时使用默认值 `WebmOpus`（浏览器 MediaRecorder 的常见输出）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AudioEncoding {
    #[default]
    WebmOpus,
    OggOpus,
    Linear16,
    Flac,
    Mp3,
}

impl AudioEncoding {
    /// 从 MIME 类型推断编码（忽略 `;codecs=...` 等参数与大小写）
    pub fn from_mime(mime_type: &str) -> Self {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match essence.as_str() {
            "audio/webm" | "video/webm" => AudioEncoding::WebmOpus,
            "audio/ogg" | "audio/opus" => AudioEncoding::OggOpus,
            "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => AudioEncoding::Linear16,
            "audio/flac" | "audio/x-flac" => AudioEncoding::Flac,
            "audio/mpeg" | "audio/mp3" => AudioEncoding::Mp3,
            _ => {
                tracing::debug!("未知 MIME 类型 {:?}，使用默认编码", mime_type);
                AudioEncoding::default()
            }
        }
    }

    /// Google Speech API 中的编码名
    pub fn api_name(&self) -> &'static str {
        match self {
            AudioEncoding::WebmOpus => "WEBM_OPUS",
            AudioEncoding::OggOpus => "OGG_OPUS",
            AudioEncoding::Linear16 => "LINEAR16",
            AudioEncoding::Flac => "FLAC",
            AudioEncoding::Mp3 => "MP3",
        }
    }

    /// 需要显式声明的采样率；WAV/FLAC 的采样率由文件头给出
    pub fn sample_rate_hertz(&self) -> Option<u32> {
        match self {
            AudioEncoding::WebmOpus | AudioEncoding::OggOpus => Some(48_000),
            AudioEncoding::Mp3 => Some(44_100),
            AudioEncoding::Linear16 | AudioEncoding::Flac => None,
        }
    }
}

/// 录音结果（由录音端提供）
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AudioPayload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// 根据文件扩展名猜测 MIME 类型
    pub fn mime_from_extension(path: &std::path::Path) -> &'static str {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("wav") => "audio/wav",
            Some("ogg") | Some("opus") => "audio/ogg",
            Some("flac") => "audio/flac",
            Some("mp3") => "audio/mpeg",
            _ => "audio/webm",
        }
    }

    pub fn encoding(&self) -> AudioEncoding {
        AudioEncoding::from_mime(&self.mime_type)
    }
}

/// 转写结果
///
/// 未检测到语音时 text 为空、confidence 为 0，不视为错误
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    /// 置信度 (0.0 - 1.0)
    pub confidence: f32,
}

impl Transcription {
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// 合成音频
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// 语音转文字
#[allow(async_fn_in_trait)]
pub trait SpeechToText {
    async fn transcribe(&self, audio: &AudioPayload) -> Result<Transcription>;
}

/// 文字转语音
#[allow(async_fn_in_trait)]
pub trait TextToSpeech {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_encoding_from_mime() {
        assert_eq!(AudioEncoding::from_mime("audio/webm;codecs=opus"), AudioEncoding::WebmOpus);
        assert_eq!(AudioEncoding::from_mime("audio/ogg; codecs=opus"), AudioEncoding::OggOpus);
        assert_eq!(AudioEncoding::from_mime("Audio/WAV"), AudioEncoding::Linear16);
        assert_eq!(AudioEncoding::from_mime("audio/x-wav"), AudioEncoding::Linear16);
        assert_eq!(AudioEncoding::from_mime("audio/flac"), AudioEncoding::Flac);
        assert_eq!(AudioEncoding::from_mime("audio/mpeg"), AudioEncoding::Mp3);
    }

    #[test]
    fn test_encoding_default_case() {
        assert_eq!(AudioEncoding::from_mime("audio/mp4"), AudioEncoding::WebmOpus);
        assert_eq!(AudioEncoding::from_mime(""), AudioEncoding::WebmOpus);
    }

    #[test]
    fn test_sample_rate() {
        assert_eq!(AudioEncoding::WebmOpus.sample_rate_hertz(), Some(48_000));
        assert_eq!(AudioEncoding::Linear16.sample_rate_hertz(), None);
        assert_eq!(AudioEncoding::OggOpus.api_name(), "OGG_OPUS");
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(AudioPayload::mime_from_extension(Path::new("a.WAV")), "audio/wav");
        assert_eq!(AudioPayload::mime_from_extension(Path::new("a.mp3")), "audio/mpeg");
        assert_eq!(AudioPayload::mime_from_extension(Path::new("a")), "audio/webm");
    }

    #[test]
    fn test_empty_transcription() {
        assert!(Transcription::empty().is_empty());
        let t = Transcription {
            text: " bonjour ".to_string(),
            confidence: 0.9,
        };
        assert!(!t.is_empty());
    }
}
