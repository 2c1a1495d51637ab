use crate::domain::translation::TranslationPayload;
use async_trait::async_trait;

/// Repository for LLM translation.
/// Abstracts the underlying provider (OpenAI, OpenRouter, etc.)
///
/// Implementations are responsible for:
/// - Prompt construction for the structured-JSON contract
/// - Parsing the completion into a TranslationPayload
/// - Bounding the call with a timeout
#[async_trait]
pub trait TranslatorRepository: Send + Sync {
    /// Translate a single English word into Japanese.
    ///
    /// Returns the structured translation record with 1-3 usage examples.
    ///
    /// # Errors
    /// Returns an error if the provider is unavailable, times out, or
    /// returns output that cannot be parsed into the contract shape.
    async fn translate(&self, word: &str, context: &str) -> Result<TranslationPayload, String>;
}
