use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    // Translation (OpenAI)
    pub openai_api_key: String,
    pub openai_model: String,
    // Speech synthesis (ElevenLabs)
    pub elevenlabs_api_key: String,
    pub elevenlabs_model: String,
    pub default_voice_id: String,
    pub word_audio_source: WordAudioSource,
    pub usage_audio_limit: usize,
    // Object storage (S3-compatible)
    pub storage_bucket: String,
    pub storage_endpoint_url: String,
    pub aws_region: String,
    // Outbound call timeout
    pub external_timeout_secs: u64,
    pub environment: Environment,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Default tracing directives when RUST_LOG is not set. Development logs
    /// every step of the resolution pipeline; production keeps info and up.
    pub fn default_log_directives(&self) -> &'static str {
        match self {
            Environment::Development => "kotoba_backend=debug,tower_http=debug",
            Environment::Production => "kotoba_backend=info,tower_http=info",
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Which field of a translation is sent to the synthesizer for headword audio.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum WordAudioSource {
    Reading,
    Translation,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            database_url: env::var("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            openai_api_key: env::var("OPENAI_API_KEY")?,
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            elevenlabs_api_key: env::var("ELEVENLABS_API_KEY")?,
            elevenlabs_model: env::var("ELEVENLABS_MODEL")
                .unwrap_or_else(|_| "eleven_multilingual_v2".to_string()),
            default_voice_id: env::var("DEFAULT_VOICE_ID")
                .unwrap_or_else(|_| "EXAVITQu4vr4xnSDxMaL".to_string()),
            word_audio_source: env::var("WORD_AUDIO_SOURCE")
                .unwrap_or_else(|_| "reading".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "translation" => WordAudioSource::Translation,
                    _ => WordAudioSource::Reading,
                })?,
            usage_audio_limit: env::var("USAGE_AUDIO_LIMIT")
                .unwrap_or_else(|_| "1".to_string())
                .parse()?,
            storage_bucket: env::var("STORAGE_BUCKET")?,
            storage_endpoint_url: env::var("STORAGE_ENDPOINT_URL")?,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            external_timeout_secs: env::var("EXTERNAL_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
        };

        Ok(config)
    }
}
