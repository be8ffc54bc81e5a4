use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;

use crate::config::SpeechConfig;
use crate::speech::types::{SynthesizedAudio, TextToSpeech};
use crate::speech::utils;

const GOOGLE_TTS_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Google Cloud Text-to-Speech（REST），输出 MP3
#[derive(Clone)]
pub struct GoogleTtsClient {
    api_key: String,
    language_code: String,
    voice_name: String,
    speaking_rate: f64,
    client: reqwest::Client,
}

impl GoogleTtsClient {
    pub fn from_config(config: &SpeechConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            anyhow::bail!("未配置 Google API Key（speech.api_key 或环境变量 GOOGLE_API_KEY）");
        }
        Ok(Self {
            api_key: config.api_key.trim().to_string(),
            language_code: config.language_code.clone(),
            voice_name: config.voice_name.clone(),
            speaking_rate: config.speaking_rate,
            client: utils::create_http_client(),
        })
    }

    fn build_request_body(&self, text: &str) -> Value {
        serde_json::json!({
            "input": { "text": text },
            "voice": {
                "languageCode": self.language_code,
                "name": self.voice_name
            },
            "audioConfig": {
                "audioEncoding": "MP3",
                "speakingRate": self.speaking_rate
            }
        })
    }
}

impl TextToSpeech for GoogleTtsClient {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio> {
        let text = text.trim();
        if text.is_empty() {
            anyhow::bail!("合成文本不能为空");
        }

        tracing::info!(
            "TTS 请求: voice={}, rate={}, text=\"{}\"",
            self.voice_name,
            self.speaking_rate,
            utils::truncate_text(text, 40)
        );

        let response = self
            .client
            .post(GOOGLE_TTS_URL)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.build_request_body(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("TTS 错误响应: {}", error_text);
            anyhow::bail!("TTS 请求失败 ({}): {}", status, error_text);
        }

        let result: Value = response.json().await?;
        let bytes = decode_audio_content(&result)?;
        tracing::info!("TTS 完成: {} bytes", bytes.len());

        Ok(SynthesizedAudio {
            bytes,
            mime_type: "audio/mpeg".to_string(),
        })
    }
}

fn decode_audio_content(result: &Value) -> Result<Vec<u8>> {
    let content = result["audioContent"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("无法解析合成结果，响应格式: {:?}", result))?;
    Ok(general_purpose::STANDARD.decode(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SpeechConfig {
        SpeechConfig {
            api_key: "key".to_string(),
            ..SpeechConfig::default()
        }
    }

    #[test]
    fn test_request_body() {
        let client = GoogleTtsClient::from_config(&test_config()).unwrap();
        let body = client.build_request_body("Bonjour");

        assert_eq!(body["input"]["text"], "Bonjour");
        assert_eq!(body["voice"]["languageCode"], "fr-FR");
        assert_eq!(body["voice"]["name"], "fr-FR-Standard-A");
        assert_eq!(body["audioConfig"]["audioEncoding"], "MP3");
    }

    #[test]
    fn test_decode_audio_content() {
        let ok = serde_json::json!({"audioContent": "AQID"});
        assert_eq!(decode_audio_content(&ok).unwrap(), vec![1, 2, 3]);

        let missing = serde_json::json!({});
        assert!(decode_audio_content(&missing).is_err());
    }

    #[tokio::test]
    async fn test_reject_empty_text() {
        let client = GoogleTtsClient::from_config(&test_config()).unwrap();
        assert!(client.synthesize("   ").await.is_err());
    }
}
