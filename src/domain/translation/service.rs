use super::error::TranslationServiceError;
use super::model::{TranslationAudio, TranslationWithUsages};
use super::{
    AudioFailure, ResolveUsageAudioRequest, ResolveWordRequest, TranslationWithAudioResponse,
    UsageAudioLinkResponse,
};
use crate::infrastructure::config::{Config, WordAudioSource};
use crate::infrastructure::repositories::{
    SpeechError, SpeechRepository, StorageRepository, TranslationRepository, TranslatorRepository,
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

const AUDIO_FORMAT: &str = "mp3";

/// Audio-related knobs, lifted out of Config so the service does not
/// depend on the full configuration surface.
#[derive(Debug, Clone)]
pub struct AudioSettings {
    pub default_voice_id: String,
    pub word_audio_source: WordAudioSource,
    /// How many usage phrases a single resolve_usage_audio call processes.
    pub usage_audio_limit: usize,
}

impl AudioSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_voice_id: config.default_voice_id.clone(),
            word_audio_source: config.word_audio_source,
            usage_audio_limit: config.usage_audio_limit,
        }
    }
}

/// The resolution engine: cache-check, external calls on a miss, idempotent
/// persistence, response assembly.
pub struct TranslationService {
    repo: Arc<dyn TranslationRepository>,
    translator: Arc<dyn TranslatorRepository>,
    synthesizer: Arc<dyn SpeechRepository>,
    storage: Arc<dyn StorageRepository>,
    settings: AudioSettings,
}

impl TranslationService {
    pub fn new(
        repo: Arc<dyn TranslationRepository>,
        translator: Arc<dyn TranslatorRepository>,
        synthesizer: Arc<dyn SpeechRepository>,
        storage: Arc<dyn StorageRepository>,
        settings: AudioSettings,
    ) -> Self {
        Self {
            repo,
            translator,
            synthesizer,
            storage,
            settings,
        }
    }
}

#[async_trait]
pub trait TranslationServiceApi: Send + Sync {
    /// Resolve an English word to a cached or freshly generated translation
    /// with headword audio.
    ///
    /// Cache hit (translation + audio present) returns with zero external
    /// calls. On a miss the translator runs first and is fatal on failure;
    /// synthesis and upload failures degrade the response instead of
    /// failing it, because translation data outlives audio.
    async fn resolve_word(
        &self,
        request: ResolveWordRequest,
    ) -> Result<TranslationWithAudioResponse, TranslationServiceError>;

    /// Resolve audio links for a translation's usage phrases, generating and
    /// persisting audio for usages that have none yet.
    async fn resolve_usage_audio(
        &self,
        request: ResolveUsageAudioRequest,
    ) -> Result<Vec<UsageAudioLinkResponse>, TranslationServiceError>;

    /// Pure cache read by id and/or word. No external calls ever.
    async fn lookup(
        &self,
        translation_id: Option<Uuid>,
        word: Option<String>,
    ) -> Result<TranslationWithAudioResponse, TranslationServiceError>;
}

#[async_trait]
impl TranslationServiceApi for TranslationService {
    async fn resolve_word(
        &self,
        request: ResolveWordRequest,
    ) -> Result<TranslationWithAudioResponse, TranslationServiceError> {
        let word = normalize_word(&request.word)?;

        // Step 1: cache check. A full hit makes no external calls at all.
        let (cached_translation, cached_audio) = self
            .repo
            .get_translation_with_audio_by_word(&word)
            .await?;

        if let (Some(translation), Some(audio)) = (cached_translation.clone(), cached_audio) {
            tracing::info!(word = %word, "translation cache hit");
            return Ok(TranslationWithAudioResponse::assemble(
                translation,
                Some(audio),
                None,
            ));
        }

        // Step 2: translate on a full miss; a partial hit (translation
        // without audio) reuses the cached row and skips the translator.
        let translation = match cached_translation {
            Some(existing) => {
                tracing::info!(word = %word, "cached translation found, regenerating audio only");
                existing
            }
            None => {
                let payload = self
                    .translator
                    .translate(&word, &request.context)
                    .await
                    .map_err(TranslationServiceError::TranslationFailed)?;
                payload
                    .validate()
                    .map_err(TranslationServiceError::TranslationFailed)?;

                self.repo.insert_translation(&payload).await?
            }
        };

        let voice_id = request
            .voice_id
            .unwrap_or_else(|| self.settings.default_voice_id.clone());

        let (audio, audio_error) = self.generate_word_audio(&translation, &voice_id).await?;

        Ok(TranslationWithAudioResponse::assemble(
            translation,
            audio,
            audio_error,
        ))
    }

    async fn resolve_usage_audio(
        &self,
        request: ResolveUsageAudioRequest,
    ) -> Result<Vec<UsageAudioLinkResponse>, TranslationServiceError> {
        let usages = self
            .repo
            .get_usages_by_translation(request.translation_id)
            .await?;

        if usages.is_empty() {
            return Err(TranslationServiceError::NoUsagesFound);
        }

        let voice_id = request
            .voice_id
            .unwrap_or_else(|| self.settings.default_voice_id.clone());
        let limit = self.settings.usage_audio_limit.max(1);

        let mut links = Vec::new();
        for usage in usages.into_iter().take(limit) {
            // Cache check per usage: an existing row means zero external
            // calls and no token spend.
            if let Some(existing) = self.repo.get_existing_audio_for_usage(usage.id).await? {
                tracing::info!(usage_id = %usage.id, "usage audio cache hit");
                links.push(UsageAudioLinkResponse::from(existing));
                continue;
            }

            let audio_bytes = self
                .synthesizer
                .synthesize(&usage.ja, &voice_id)
                .await
                .map_err(|e| match e {
                    SpeechError::VoiceNotFound(_) => {
                        TranslationServiceError::VoiceNotFound(voice_id.clone())
                    }
                    SpeechError::Synthesis(msg) => TranslationServiceError::AudioGeneration(msg),
                })?;

            let key = format!("{}.{}", Uuid::new_v4(), AUDIO_FORMAT);
            let storage_url = self
                .storage
                .upload(audio_bytes, &key)
                .await
                .map_err(TranslationServiceError::AudioGeneration)?;

            // Race-safe get-or-create: a concurrent request that won the
            // insert supplies the row we return.
            let link = self
                .repo
                .add_usage_audio(usage.id, &storage_url, Some(&voice_id), AUDIO_FORMAT)
                .await?;

            links.push(UsageAudioLinkResponse::from(link));
        }

        Ok(links)
    }

    async fn lookup(
        &self,
        translation_id: Option<Uuid>,
        word: Option<String>,
    ) -> Result<TranslationWithAudioResponse, TranslationServiceError> {
        if translation_id.is_none() && word.is_none() {
            return Err(TranslationServiceError::Invalid(
                "translation_id or word must be included in the query parameters".to_string(),
            ));
        }

        let mut found = (None, None);
        if let Some(id) = translation_id {
            found = self.repo.get_translation_with_audio_by_id(id).await?;
        }
        if found.0.is_none() {
            if let Some(word) = word {
                found = self.repo.get_translation_with_audio_by_word(&word).await?;
            }
        }

        match found.0 {
            Some(translation) => Ok(TranslationWithAudioResponse::assemble(
                translation,
                found.1,
                None,
            )),
            None => Err(TranslationServiceError::NotFound),
        }
    }
}

impl TranslationService {
    /// Synthesize, upload and persist headword audio. Synthesis and upload
    /// failures come back as an AudioFailure flag rather than an error;
    /// repository failures still propagate.
    async fn generate_word_audio(
        &self,
        translation: &TranslationWithUsages,
        voice_id: &str,
    ) -> Result<(Option<TranslationAudio>, Option<AudioFailure>), TranslationServiceError> {
        let text = self.word_audio_text(translation);

        let audio_bytes = match self.synthesizer.synthesize(text, voice_id).await {
            Ok(bytes) => bytes,
            Err(SpeechError::VoiceNotFound(voice)) => {
                tracing::warn!(voice_id = %voice, "voice not found, returning translation without audio");
                return Ok((None, Some(AudioFailure::VoiceNotFound)));
            }
            Err(SpeechError::Synthesis(msg)) => {
                tracing::warn!(error = %msg, "synthesis failed, returning translation without audio");
                return Ok((None, Some(AudioFailure::SynthesisFailed)));
            }
        };

        let key = format!("{}.{}", Uuid::new_v4(), AUDIO_FORMAT);
        let storage_url = match self.storage.upload(audio_bytes, &key).await {
            Ok(url) => url,
            Err(msg) => {
                tracing::warn!(error = %msg, "upload failed, returning translation without audio");
                return Ok((None, Some(AudioFailure::UploadFailed)));
            }
        };

        let audio = self
            .repo
            .insert_translation_audio(
                translation.translation.id,
                &storage_url,
                Some(voice_id),
                AUDIO_FORMAT,
            )
            .await?;

        Ok((Some(audio), None))
    }

    /// Which text the synthesizer reads for the headword. Falls back to the
    /// translation text when the configured reading is absent.
    fn word_audio_text<'a>(&self, translation: &'a TranslationWithUsages) -> &'a str {
        match self.settings.word_audio_source {
            WordAudioSource::Reading => translation
                .translation
                .reading
                .as_deref()
                .unwrap_or(&translation.translation.translation),
            WordAudioSource::Translation => &translation.translation.translation,
        }
    }
}

/// Normalize and defensively validate the input word. Validation also runs
/// at the gateway; the engine rejects malformed input it receives anyway.
fn normalize_word(raw: &str) -> Result<String, TranslationServiceError> {
    let word = raw.trim().to_lowercase();
    let single_word = regex::Regex::new(r"^[a-z]+$").unwrap();
    if !single_word.is_match(&word) {
        return Err(TranslationServiceError::Invalid(
            "The input needs to be a single word".to_string(),
        ));
    }
    Ok(word)
}
