pub mod error;
pub mod model;
pub mod service;

pub use error::TranslationServiceError;
pub use model::{
    Script, Translation, TranslationAudio, TranslationPayload, TranslationWithUsages, Usage,
    UsageAudio, UsagePair, UsageWithAudio,
};
pub use service::{AudioSettings, TranslationService, TranslationServiceApi};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to resolve an English word into a translation with audio
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveWordRequest {
    pub word: String,
    #[serde(default)]
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
}

/// Request to resolve audio for a translation's usage phrases
#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveUsageAudioRequest {
    pub translation_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
}

/// Why the audio field of a word resolution is absent. The translation
/// itself succeeded and was persisted; only audio generation degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFailure {
    VoiceNotFound,
    SynthesisFailed,
    UploadFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageResponse {
    pub id: Uuid,
    pub en: String,
    pub ja: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<UsageAudioLinkResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub id: Uuid,
    pub word: String,
    pub translation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading: Option<String>,
    pub script: String,
    pub usages: Vec<UsageResponse>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationAudioResponse {
    pub id: Uuid,
    pub storage_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    pub format: String,
    pub created_at: DateTime<Utc>,
}

/// Response for word resolution and translation lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationWithAudioResponse {
    pub translation: TranslationResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<TranslationAudioResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_error: Option<AudioFailure>,
}

/// One audio link per resolved usage phrase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageAudioLinkResponse {
    pub id: Uuid,
    pub usage_id: Uuid,
    pub storage_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<UsageAudio> for UsageAudioLinkResponse {
    fn from(link: UsageAudio) -> Self {
        Self {
            id: link.id,
            usage_id: link.usage_id,
            storage_url: link.storage_url,
            created_at: link.created_at,
        }
    }
}

impl From<TranslationAudio> for TranslationAudioResponse {
    fn from(audio: TranslationAudio) -> Self {
        Self {
            id: audio.id,
            storage_url: audio.storage_url,
            voice_id: audio.voice_id,
            format: audio.format,
            created_at: audio.created_at,
        }
    }
}

impl TranslationWithAudioResponse {
    /// The one mapping from persisted entities to the external response
    /// shape. Handles the partial-audio case: `audio` and `audio_error`
    /// are mutually exclusive, and both absent means audio was neither
    /// requested nor attempted.
    pub fn assemble(
        translation: TranslationWithUsages,
        audio: Option<TranslationAudio>,
        audio_error: Option<AudioFailure>,
    ) -> Self {
        let usages = translation
            .usages
            .into_iter()
            .map(|u| UsageResponse {
                id: u.usage.id,
                en: u.usage.en,
                ja: u.usage.ja,
                audio: u.audio.map(UsageAudioLinkResponse::from),
            })
            .collect();

        Self {
            translation: TranslationResponse {
                id: translation.translation.id,
                word: translation.translation.word,
                translation: translation.translation.translation,
                reading: translation.translation.reading,
                script: translation.translation.script,
                usages,
                created_at: translation.translation.created_at,
            },
            audio: audio.map(TranslationAudioResponse::from),
            audio_error,
        }
    }
}
