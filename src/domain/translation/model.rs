use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Script classification of a Japanese rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Kanji,
    Katakana,
    Hiragana,
}

impl Script {
    pub fn as_str(&self) -> &'static str {
        match self {
            Script::Kanji => "kanji",
            Script::Katakana => "katakana",
            Script::Hiragana => "hiragana",
        }
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Script {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kanji" => Ok(Script::Kanji),
            "katakana" => Ok(Script::Katakana),
            "hiragana" => Ok(Script::Hiragana),
            other => Err(format!("unknown script classification: {}", other)),
        }
    }
}

/// Cached English word -> Japanese rendering.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Translation {
    pub id: Uuid,
    pub word: String,
    pub translation: String,
    pub reading: Option<String>,
    pub script: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Example sentence pair owned by a translation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Usage {
    pub id: Uuid,
    pub translation_id: Uuid,
    pub en: String,
    pub ja: String,
    pub created_at: DateTime<Utc>,
}

/// Synthesized speech for the headword itself. Zero-or-more per translation;
/// the most recently created row is the current one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TranslationAudio {
    pub id: Uuid,
    pub translation_id: Uuid,
    pub storage_url: String,
    pub voice_id: Option<String>,
    pub format: String,
    pub created_at: DateTime<Utc>,
}

/// Synthesized speech for one usage's Japanese sentence. At most one per
/// usage, enforced by a uniqueness constraint on usage_id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UsageAudio {
    pub id: Uuid,
    pub usage_id: Uuid,
    pub storage_url: String,
    pub voice_id: Option<String>,
    pub format: String,
    pub created_at: DateTime<Utc>,
}

/// A usage together with its optional audio row.
#[derive(Debug, Clone)]
pub struct UsageWithAudio {
    pub usage: Usage,
    pub audio: Option<UsageAudio>,
}

/// A translation with its usages eagerly loaded. Repository reads never
/// return a translation with unpopulated children.
#[derive(Debug, Clone)]
pub struct TranslationWithUsages {
    pub translation: Translation,
    pub usages: Vec<UsageWithAudio>,
}

/// Structured output of the translator collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationPayload {
    pub word: String,
    pub translation: String,
    #[serde(default)]
    pub reading: Option<String>,
    pub script: Script,
    #[serde(default)]
    pub usage: Vec<UsagePair>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsagePair {
    pub en: String,
    pub ja: String,
}

impl TranslationPayload {
    /// Reject structurally valid JSON that still breaks the translator
    /// contract: empty translation text or a usage count outside 1..=3.
    pub fn validate(&self) -> Result<(), String> {
        if self.translation.trim().is_empty() {
            return Err("translator returned an empty translation".to_string());
        }
        if self.usage.is_empty() || self.usage.len() > 3 {
            return Err(format!(
                "translator returned {} usage examples, expected 1 to 3",
                self.usage.len()
            ));
        }
        if self.usage.iter().any(|u| u.en.trim().is_empty() || u.ja.trim().is_empty()) {
            return Err("translator returned an empty usage example".to_string());
        }
        Ok(())
    }
}
