use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum TranslationServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("translation generation failed: {0}")]
    TranslationFailed(String),
    #[error("voice not found: {0}")]
    VoiceNotFound(String),
    #[error("audio generation failed: {0}")]
    AudioGeneration(String),
    #[error("no usages found")]
    NoUsagesFound,
    #[error("translation not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for TranslationServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => TranslationServiceError::Invalid(msg),
            AppError::NotFound(_) => TranslationServiceError::NotFound,
            _ => TranslationServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<TranslationServiceError> for AppError {
    fn from(err: TranslationServiceError) -> Self {
        match err {
            TranslationServiceError::Invalid(msg) => AppError::BadRequest(msg),
            TranslationServiceError::TranslationFailed(msg) => {
                AppError::BadRequest(format!("An error occurred generating the translation: {}", msg))
            }
            TranslationServiceError::VoiceNotFound(voice_id) => {
                AppError::NotFound(format!("A voice with the voice id {} was not found", voice_id))
            }
            TranslationServiceError::AudioGeneration(_) => {
                AppError::BadRequest("An error occurred generating the audio".to_string())
            }
            TranslationServiceError::NoUsagesFound => {
                AppError::NotFound("No usages found".to_string())
            }
            TranslationServiceError::NotFound => {
                AppError::NotFound("Translation not found".to_string())
            }
            TranslationServiceError::Dependency(msg) => AppError::Internal(msg),
            TranslationServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
