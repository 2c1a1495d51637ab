use std::sync::Arc;
use std::time::Duration;

use async_openai::config::OpenAIConfig;
use kotoba_backend::controllers::translation::TranslationController;
use kotoba_backend::domain::translation::{AudioSettings, TranslationService};
use kotoba_backend::infrastructure::config::{Config, LogFormat};
use kotoba_backend::infrastructure::db::{check_connection, create_pool};
use kotoba_backend::infrastructure::http::start_http_server;
use kotoba_backend::infrastructure::repositories::{
    ElevenLabsSpeechRepository, OpenAiTranslatorRepository, PgTranslationRepository,
    S3StorageRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting kotoba backend on {}:{}",
        config.host,
        config.port
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    // Verify database connection
    check_connection(&pool).await?;
    tracing::info!("Database connection verified");

    let external_timeout = Duration::from_secs(config.external_timeout_secs);

    // Create S3 client for the configured object-storage endpoint
    tracing::info!(
        region = %config.aws_region,
        endpoint = %config.storage_endpoint_url,
        "Initializing object storage client"
    );
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .endpoint_url(config.storage_endpoint_url.clone())
        .load()
        .await;
    let s3_client = Arc::new(aws_sdk_s3::Client::new(&aws_config));

    // Create OpenAI client for translation
    let openai_config = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());
    let openai_client = Arc::new(async_openai::Client::with_config(openai_config));

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories (inject db pool and provider clients)
    tracing::info!("Instantiating repositories...");
    let translation_repo = Arc::new(PgTranslationRepository::new(pool.clone()));
    let translator_repo = Arc::new(OpenAiTranslatorRepository::new(
        openai_client,
        config.openai_model.clone(),
        external_timeout,
    ));
    let speech_repo = Arc::new(ElevenLabsSpeechRepository::new(
        config.elevenlabs_api_key.clone(),
        config.elevenlabs_model.clone(),
        external_timeout,
    ));
    let storage_repo = Arc::new(S3StorageRepository::new(
        s3_client,
        config.storage_bucket.clone(),
        config.storage_endpoint_url.clone(),
        external_timeout,
    ));

    // 2. Instantiate services (inject repositories)
    tracing::info!("Instantiating services...");
    let translation_service = Arc::new(TranslationService::new(
        translation_repo,
        translator_repo,
        speech_repo,
        storage_repo,
        AudioSettings::from_config(&config),
    ));

    // 3. Instantiate controllers (inject services)
    tracing::info!("Instantiating controllers...");
    let translation_controller = Arc::new(TranslationController::new(translation_service));

    // Start HTTP server with all routes
    start_http_server(pool, config, translation_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let directives = config.environment.default_log_directives();
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| directives.into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| directives.into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
