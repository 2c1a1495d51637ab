use async_trait::async_trait;

/// Failure modes of speech synthesis. An unknown voice id is surfaced
/// distinctly so callers can correct it.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("voice not found: {0}")]
    VoiceNotFound(String),
    #[error("synthesis failed: {0}")]
    Synthesis(String),
}

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (ElevenLabs, AWS Polly, etc.)
#[async_trait]
pub trait SpeechRepository: Send + Sync {
    /// Synthesize text to speech with the given voice.
    ///
    /// Returns raw audio bytes ready for upload (MP3 format).
    ///
    /// # Errors
    /// `SpeechError::VoiceNotFound` when the provider rejects the voice id,
    /// `SpeechError::Synthesis` for every other failure including timeouts.
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, SpeechError>;
}
