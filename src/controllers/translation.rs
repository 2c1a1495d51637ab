use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::translation::{
        ResolveUsageAudioRequest, ResolveWordRequest, TranslationService, TranslationServiceApi,
        TranslationWithAudioResponse, UsageAudioLinkResponse,
    },
    error::AppResult,
};

/// Query parameters for GET /gettranslation
#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub translation_id: Option<Uuid>,
    pub word: Option<String>,
}

pub struct TranslationController {
    translation_service: Arc<TranslationService>,
}

impl TranslationController {
    pub fn new(translation_service: Arc<TranslationService>) -> Self {
        Self {
            translation_service,
        }
    }

    /// POST /translatewordengtojap - Resolve a word to translation + audio
    pub async fn resolve_word(
        State(controller): State<Arc<TranslationController>>,
        Json(request): Json<ResolveWordRequest>,
    ) -> AppResult<Json<TranslationWithAudioResponse>> {
        let response = controller.translation_service.resolve_word(request).await?;
        Ok(Json(response))
    }

    /// POST /getaudioforusagephrases - Resolve audio for usage phrases
    pub async fn resolve_usage_audio(
        State(controller): State<Arc<TranslationController>>,
        Json(request): Json<ResolveUsageAudioRequest>,
    ) -> AppResult<Json<Vec<UsageAudioLinkResponse>>> {
        let links = controller
            .translation_service
            .resolve_usage_audio(request)
            .await?;
        Ok(Json(links))
    }

    /// GET /gettranslation - Look up a cached translation by id or word
    pub async fn lookup(
        State(controller): State<Arc<TranslationController>>,
        Query(params): Query<LookupParams>,
    ) -> AppResult<Json<TranslationWithAudioResponse>> {
        let response = controller
            .translation_service
            .lookup(params.translation_id, params.word)
            .await?;
        Ok(Json(response))
    }
}
