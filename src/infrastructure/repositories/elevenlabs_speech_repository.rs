use super::speech_repository::{SpeechError, SpeechRepository};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io/v1/text-to-speech";

/// ElevenLabs implementation of the speech repository
pub struct ElevenLabsSpeechRepository {
    client: reqwest::Client,
    api_key: String,
    model_id: String,
}

impl ElevenLabsSpeechRepository {
    pub fn new(api_key: String, model_id: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key,
            model_id,
        }
    }
}

#[async_trait]
impl SpeechRepository for ElevenLabsSpeechRepository {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, SpeechError> {
        let start_time = std::time::Instant::now();
        let url = format!("{}/{}", ELEVENLABS_BASE_URL, voice_id);

        let payload = json!({
            "text": text,
            "model_id": self.model_id,
            "voice_settings": {
                "stability": 0.5,
                "similarity_boost": 0.7
            }
        });

        tracing::info!(
            voice_id = voice_id,
            model_id = %self.model_id,
            text_length = text.len(),
            "Calling ElevenLabs TTS API"
        );

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, voice_id = voice_id, "ElevenLabs request failed");
                SpeechError::Synthesis(format!("ElevenLabs request failed: {}", e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SpeechError::VoiceNotFound(voice_id.to_string()));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status.as_u16(),
                voice_id = voice_id,
                detail = %detail,
                "ElevenLabs TTS API returned an error"
            );
            return Err(SpeechError::Synthesis(format!(
                "ElevenLabs API error {}: {}",
                status.as_u16(),
                detail
            )));
        }

        let audio_bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::Synthesis(format!("failed to read audio body: {}", e)))?
            .to_vec();

        tracing::info!(
            voice_id = voice_id,
            audio_size_bytes = audio_bytes.len(),
            latency_ms = start_time.elapsed().as_millis(),
            "TTS synthesis completed"
        );

        Ok(audio_bytes)
    }
}
