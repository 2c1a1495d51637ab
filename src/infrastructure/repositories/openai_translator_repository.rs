use super::translator_repository::TranslatorRepository;
use crate::domain::translation::TranslationPayload;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

const MAX_COMPLETION_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.2;

/// OpenAI chat-completion implementation of the translator repository
pub struct OpenAiTranslatorRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    timeout: Duration,
}

impl OpenAiTranslatorRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String, timeout: Duration) -> Self {
        Self {
            client,
            model,
            timeout,
        }
    }

    fn build_prompt(word: &str, context: &str) -> String {
        format!(
            r#"You are a professional English to Japanese translator for a language-learning app.

Translate the English word "{word}" into Japanese.
Context: "{context}" (If empty, translate the most common meaning.)

Return ONLY valid JSON in the exact format below.

JSON format:
{{
  "word": "{word}",
  "translation": "",
  "reading": "",
  "script": "kanji|katakana|hiragana",
  "usage": [
    {{
      "en": "",
      "ja": ""
    }}
  ]
}}

Rules:
- Provide 1-3 usage examples
- Usage examples must be short and natural
- Do NOT include romaji
- Do NOT include any text outside JSON"#
        )
    }

    /// Parse the completion text into the payload contract. Models sometimes
    /// wrap JSON in markdown fences despite the prompt, so strip those first.
    fn parse_payload(content: &str) -> Result<TranslationPayload, String> {
        let trimmed = content.trim();
        let stripped = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .and_then(|s| s.strip_suffix("```"))
            .unwrap_or(trimmed)
            .trim();

        serde_json::from_str::<TranslationPayload>(stripped)
            .map_err(|e| format!("unparseable translator output: {}", e))
    }
}

#[async_trait]
impl TranslatorRepository for OpenAiTranslatorRepository {
    async fn translate(&self, word: &str, context: &str) -> Result<TranslationPayload, String> {
        let start_time = std::time::Instant::now();

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(TEMPERATURE)
            .max_tokens(MAX_COMPLETION_TOKENS)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content("You are a language translator of English to Japanese.")
                    .build()
                    .map_err(|e| format!("failed to build translator request: {}", e))?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(Self::build_prompt(word, context))
                    .build()
                    .map_err(|e| format!("failed to build translator request: {}", e))?
                    .into(),
            ])
            .build()
            .map_err(|e| format!("failed to build translator request: {}", e))?;

        tracing::info!(
            model = %self.model,
            word = word,
            context = context,
            "Calling OpenAI translation API"
        );

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| format!("translator timed out after {:?}", self.timeout))?
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    model = %self.model,
                    word = word,
                    "OpenAI translation API call failed"
                );
                format!("OpenAI translation error: {}", e)
            })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| "translator returned an empty completion".to_string())?;

        let payload = Self::parse_payload(&content)?;

        tracing::info!(
            model = %self.model,
            word = word,
            translation = %payload.translation,
            script = %payload.script,
            usage_count = payload.usage.len(),
            latency_ms = start_time.elapsed().as_millis(),
            "Translation completed"
        );

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::translation::model::Script;

    const VALID_JSON: &str = r#"{
        "word": "cat",
        "translation": "猫",
        "reading": "ねこ",
        "script": "kanji",
        "usage": [{"en": "The cat sleeps.", "ja": "猫は寝る。"}]
    }"#;

    #[test]
    fn parses_bare_json() {
        let payload = OpenAiTranslatorRepository::parse_payload(VALID_JSON).unwrap();
        assert_eq!(payload.translation, "猫");
        assert_eq!(payload.script, Script::Kanji);
        assert_eq!(payload.usage.len(), 1);
    }

    #[test]
    fn parses_fenced_json() {
        let fenced = format!("```json\n{}\n```", VALID_JSON);
        let payload = OpenAiTranslatorRepository::parse_payload(&fenced).unwrap();
        assert_eq!(payload.word, "cat");
    }

    #[test]
    fn parses_unlabeled_fence() {
        let fenced = format!("```\n{}\n```", VALID_JSON);
        assert!(OpenAiTranslatorRepository::parse_payload(&fenced).is_ok());
    }

    #[test]
    fn rejects_prose() {
        let result = OpenAiTranslatorRepository::parse_payload("Sure! The translation is 猫.");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_script() {
        let json = VALID_JSON.replace("kanji", "romaji");
        assert!(OpenAiTranslatorRepository::parse_payload(&json).is_err());
    }

    #[test]
    fn missing_reading_defaults_to_none() {
        let json = r#"{
            "word": "cat",
            "translation": "猫",
            "script": "kanji",
            "usage": [{"en": "a", "ja": "b"}]
        }"#;
        let payload = OpenAiTranslatorRepository::parse_payload(json).unwrap();
        assert!(payload.reading.is_none());
    }
}
