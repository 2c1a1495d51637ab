pub mod elevenlabs_speech_repository;
pub mod openai_translator_repository;
pub mod s3_storage_repository;
pub mod speech_repository;
pub mod storage_repository;
pub mod translation_repository;
pub mod translator_repository;

pub use elevenlabs_speech_repository::ElevenLabsSpeechRepository;
pub use openai_translator_repository::OpenAiTranslatorRepository;
pub use s3_storage_repository::S3StorageRepository;
pub use speech_repository::{SpeechError, SpeechRepository};
pub use storage_repository::StorageRepository;
pub use translation_repository::{PgTranslationRepository, TranslationRepository};
pub use translator_repository::TranslatorRepository;
