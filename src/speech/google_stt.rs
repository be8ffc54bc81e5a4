use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;
use std::time::Duration;

use crate::config::SpeechConfig;
use crate::speech::types::{AudioPayload, SpeechToText, Transcription};
use crate::speech::utils;

const GOOGLE_STT_URL: &str = "https://speech.googleapis.com/v1p1beta1/speech:recognize";
const MAX_RETRIES: u32 = 2;

/// Google Cloud Speech-to-Text（REST，同步识别）
#[derive(Clone)]
pub struct GoogleSpeechClient {
    api_key: String,
    language_code: String,
    client: reqwest::Client,
    max_retries: u32,
}

impl GoogleSpeechClient {
    pub fn new(api_key: impl Into<String>, language_code: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            language_code: language_code.into(),
            client: utils::create_http_client(),
            max_retries: MAX_RETRIES,
        }
    }

    pub fn from_config(config: &SpeechConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            anyhow::bail!("未配置 Google API Key（speech.api_key 或环境变量 GOOGLE_API_KEY）");
        }
        Ok(Self::new(config.api_key.trim(), config.language_code.clone()))
    }

    fn build_request_body(&self, audio: &AudioPayload) -> Value {
        let encoding = audio.encoding();
        let mut recognition_config = serde_json::json!({
            "encoding": encoding.api_name(),
            "languageCode": self.language_code,
            "enableAutomaticPunctuation": true,
            "maxAlternatives": 1
        });
        if let Some(rate) = encoding.sample_rate_hertz() {
            recognition_config["sampleRateHertz"] = serde_json::json!(rate);
        }

        serde_json::json!({
            "config": recognition_config,
            "audio": {
                "content": general_purpose::STANDARD.encode(&audio.bytes)
            }
        })
    }

    async fn transcribe_once(&self, audio: &AudioPayload) -> Result<Transcription> {
        let request_body = self.build_request_body(audio);
        tracing::info!(
            "STT 请求: {} bytes, mime={}, encoding={}",
            audio.bytes.len(),
            audio.mime_type,
            audio.encoding().api_name()
        );

        let response = self
            .client
            .post(GOOGLE_STT_URL)
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        tracing::info!("STT 响应状态: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            tracing::error!("STT 错误响应: {}", error_text);
            anyhow::bail!("STT 请求失败 ({}): {}", status, error_text);
        }

        let result: Value = response.json().await?;
        Ok(parse_recognize_response(&result))
    }
}

impl SpeechToText for GoogleSpeechClient {
    async fn transcribe(&self, audio: &AudioPayload) -> Result<Transcription> {
        if audio.bytes.is_empty() {
            anyhow::bail!("音频数据为空");
        }

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tracing::warn!("第 {} 次重试转录...", attempt);
            }

            match self.transcribe_once(audio).await {
                Ok(transcription) => return Ok(transcription),
                Err(e) => {
                    tracing::error!(
                        "转录失败 (尝试 {}/{}): {}",
                        attempt + 1,
                        self.max_retries + 1,
                        e
                    );
                    last_error = Some(e);

                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(500)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("转录失败，未知错误")))
    }
}

/// 解析识别结果
///
/// 每段 result 取第一个候选，文本拼接，置信度取平均；无结果时返回空转写
fn parse_recognize_response(result: &Value) -> Transcription {
    let alternatives: Vec<&Value> = result["results"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .filter_map(|r| r["alternatives"].as_array().and_then(|alts| alts.first()))
                .collect()
        })
        .unwrap_or_default();

    if alternatives.is_empty() {
        tracing::info!("STT 未检测到语音");
        return Transcription::empty();
    }

    let text = alternatives
        .iter()
        .filter_map(|alt| alt["transcript"].as_str())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let confidences: Vec<f64> = alternatives
        .iter()
        .filter_map(|alt| alt["confidence"].as_f64())
        .collect();
    let confidence = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f64>() / confidences.len() as f64
    };

    Transcription {
        text,
        confidence: confidence as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_opus() {
        let client = GoogleSpeechClient::new("key", "fr-FR");
        let audio = AudioPayload::new(vec![1, 2, 3], "audio/webm;codecs=opus");

        let body = client.build_request_body(&audio);
        assert_eq!(body["config"]["encoding"], "WEBM_OPUS");
        assert_eq!(body["config"]["sampleRateHertz"], 48000);
        assert_eq!(body["config"]["languageCode"], "fr-FR");
        assert_eq!(body["audio"]["content"], "AQID");
    }

    #[test]
    fn test_request_body_wav_omits_sample_rate() {
        let client = GoogleSpeechClient::new("key", "fr-FR");
        let audio = AudioPayload::new(vec![0; 4], "audio/wav");

        let body = client.build_request_body(&audio);
        assert_eq!(body["config"]["encoding"], "LINEAR16");
        assert!(body["config"].get("sampleRateHertz").is_none());
    }

    #[test]
    fn test_parse_multiple_results() {
        let response = serde_json::json!({
            "results": [
                {"alternatives": [{"transcript": "Je voudrais un café", "confidence": 0.9}]},
                {"alternatives": [{"transcript": " s'il vous plaît", "confidence": 0.7}]}
            ]
        });

        let t = parse_recognize_response(&response);
        assert_eq!(t.text, "Je voudrais un café s'il vous plaît");
        assert!((t.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_parse_no_speech() {
        let t = parse_recognize_response(&serde_json::json!({}));
        assert_eq!(t, Transcription::empty());
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = SpeechConfig::default();
        assert!(GoogleSpeechClient::from_config(&config).is_err());
    }
}
