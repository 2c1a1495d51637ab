use crate::domain::translation::{
    Translation, TranslationAudio, TranslationPayload, TranslationWithUsages, Usage, UsageAudio,
    UsageWithAudio,
};
use crate::error::{AppError, AppResult};
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Typed read/write operations over the relational cache. This is the sole
/// enforcement point for the uniqueness invariants: integrity violations are
/// converted into get-existing reads here and never reach callers.
#[async_trait]
pub trait TranslationRepository: Send + Sync {
    /// Exact-match lookup on (word, translation, reading), case-insensitive
    /// on word. Null readings compare equal.
    async fn find_translation(
        &self,
        word: &str,
        translation: &str,
        reading: Option<&str>,
    ) -> AppResult<Option<Translation>>;

    /// Idempotent create: re-checks existence immediately before insert and
    /// absorbs a concurrent duplicate insert by re-reading the winning row.
    /// The returned translation always has its usages loaded.
    async fn insert_translation(
        &self,
        payload: &TranslationPayload,
    ) -> AppResult<TranslationWithUsages>;

    /// Unconditional insert. Multiple audio rows per translation are
    /// allowed; the most recent wins on read.
    async fn insert_translation_audio(
        &self,
        translation_id: Uuid,
        storage_url: &str,
        voice_id: Option<&str>,
        format: &str,
    ) -> AppResult<TranslationAudio>;

    /// Translation + usages + per-usage audio + most-recent headword audio,
    /// keyed by word (case-insensitive). `(None, None)` when the word is
    /// not cached.
    async fn get_translation_with_audio_by_word(
        &self,
        word: &str,
    ) -> AppResult<(Option<TranslationWithUsages>, Option<TranslationAudio>)>;

    /// Same designed query set as the by-word read, keyed by id.
    async fn get_translation_with_audio_by_id(
        &self,
        id: Uuid,
    ) -> AppResult<(Option<TranslationWithUsages>, Option<TranslationAudio>)>;

    async fn get_usages_by_translation(&self, translation_id: Uuid) -> AppResult<Vec<Usage>>;

    async fn get_existing_audio_for_usage(&self, usage_id: Uuid) -> AppResult<Option<UsageAudio>>;

    /// Get-or-create keyed on the usage_id uniqueness constraint: a lost
    /// race resolves to the row the concurrent request inserted.
    async fn add_usage_audio(
        &self,
        usage_id: Uuid,
        storage_url: &str,
        voice_id: Option<&str>,
        format: &str,
    ) -> AppResult<UsageAudio>;
}

pub struct PgTranslationRepository {
    pool: Arc<DbPool>,
}

impl PgTranslationRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
    }

    /// Load a translation's usages together with their optional audio rows.
    async fn load_usages(&self, translation_id: Uuid) -> AppResult<Vec<UsageWithAudio>> {
        let pool = self.pool.as_ref();
        let usages = sqlx::query_as::<_, Usage>(
            r#"
            SELECT id, translation_id, en, ja, created_at
            FROM translation_usages
            WHERE translation_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(translation_id)
        .fetch_all(pool)
        .await?;

        if usages.is_empty() {
            return Ok(Vec::new());
        }

        let usage_ids: Vec<Uuid> = usages.iter().map(|u| u.id).collect();
        let audio_rows = sqlx::query_as::<_, UsageAudio>(
            r#"
            SELECT id, usage_id, storage_url, voice_id, format, created_at
            FROM translation_usage_audio
            WHERE usage_id = ANY($1)
            "#,
        )
        .bind(&usage_ids)
        .fetch_all(pool)
        .await?;

        Ok(usages
            .into_iter()
            .map(|usage| {
                let audio = audio_rows.iter().find(|a| a.usage_id == usage.id).cloned();
                UsageWithAudio { usage, audio }
            })
            .collect())
    }

    /// Most recently created audio row for a translation, if any.
    async fn latest_translation_audio(
        &self,
        translation_id: Uuid,
    ) -> AppResult<Option<TranslationAudio>> {
        let pool = self.pool.as_ref();
        let audio = sqlx::query_as::<_, TranslationAudio>(
            r#"
            SELECT id, translation_id, storage_url, voice_id, format, created_at
            FROM translation_audio
            WHERE translation_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(translation_id)
        .fetch_optional(pool)
        .await?;

        Ok(audio)
    }

    async fn hydrate(
        &self,
        translation: Translation,
    ) -> AppResult<(TranslationWithUsages, Option<TranslationAudio>)> {
        let usages = self.load_usages(translation.id).await?;
        let audio = self.latest_translation_audio(translation.id).await?;
        Ok((TranslationWithUsages { translation, usages }, audio))
    }
}

#[async_trait]
impl TranslationRepository for PgTranslationRepository {
    async fn find_translation(
        &self,
        word: &str,
        translation: &str,
        reading: Option<&str>,
    ) -> AppResult<Option<Translation>> {
        let pool = self.pool.as_ref();
        let row = sqlx::query_as::<_, Translation>(
            r#"
            SELECT id, word, translation, reading, script, created_at, updated_at
            FROM translations
            WHERE LOWER(word) = LOWER($1)
              AND translation = $2
              AND reading IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(word)
        .bind(translation)
        .bind(reading)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    async fn insert_translation(
        &self,
        payload: &TranslationPayload,
    ) -> AppResult<TranslationWithUsages> {
        // Re-check immediately before insert so concurrent identical
        // requests usually short-circuit without touching the constraint.
        if let Some(existing) = self
            .find_translation(
                &payload.word,
                &payload.translation,
                payload.reading.as_deref(),
            )
            .await?
        {
            let usages = self.load_usages(existing.id).await?;
            return Ok(TranslationWithUsages {
                translation: existing,
                usages,
            });
        }

        let mut tx = self.pool.begin().await?;
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();

        let inserted = sqlx::query(
            r#"
            INSERT INTO translations (id, word, translation, reading, script, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            "#,
        )
        .bind(id)
        .bind(&payload.word)
        .bind(&payload.translation)
        .bind(payload.reading.as_deref())
        .bind(payload.script.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if Self::is_unique_violation(&e) => {
                // Lost the race. Return the row the other request inserted.
                tx.rollback().await?;
                let existing = self
                    .find_translation(
                        &payload.word,
                        &payload.translation,
                        payload.reading.as_deref(),
                    )
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal(
                            "translation conflict detected but winning row not found".to_string(),
                        )
                    })?;
                let usages = self.load_usages(existing.id).await?;
                return Ok(TranslationWithUsages {
                    translation: existing,
                    usages,
                });
            }
            Err(e) => return Err(AppError::Database(e)),
        }

        for pair in &payload.usage {
            sqlx::query(
                r#"
                INSERT INTO translation_usages (id, translation_id, en, ja, created_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(id)
            .bind(&pair.en)
            .bind(&pair.ja)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let translation = Translation {
            id,
            word: payload.word.clone(),
            translation: payload.translation.clone(),
            reading: payload.reading.clone(),
            script: payload.script.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };
        let usages = self.load_usages(id).await?;

        Ok(TranslationWithUsages { translation, usages })
    }

    async fn insert_translation_audio(
        &self,
        translation_id: Uuid,
        storage_url: &str,
        voice_id: Option<&str>,
        format: &str,
    ) -> AppResult<TranslationAudio> {
        let pool = self.pool.as_ref();
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();

        sqlx::query(
            r#"
            INSERT INTO translation_audio (id, translation_id, storage_url, voice_id, format, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(translation_id)
        .bind(storage_url)
        .bind(voice_id)
        .bind(format)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(TranslationAudio {
            id,
            translation_id,
            storage_url: storage_url.to_string(),
            voice_id: voice_id.map(str::to_string),
            format: format.to_string(),
            created_at: now,
        })
    }

    async fn get_translation_with_audio_by_word(
        &self,
        word: &str,
    ) -> AppResult<(Option<TranslationWithUsages>, Option<TranslationAudio>)> {
        let pool = self.pool.as_ref();
        let translation = sqlx::query_as::<_, Translation>(
            r#"
            SELECT id, word, translation, reading, script, created_at, updated_at
            FROM translations
            WHERE LOWER(word) = LOWER($1)
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(word)
        .fetch_optional(pool)
        .await?;

        match translation {
            Some(t) => {
                let (hydrated, audio) = self.hydrate(t).await?;
                Ok((Some(hydrated), audio))
            }
            None => Ok((None, None)),
        }
    }

    async fn get_translation_with_audio_by_id(
        &self,
        id: Uuid,
    ) -> AppResult<(Option<TranslationWithUsages>, Option<TranslationAudio>)> {
        let pool = self.pool.as_ref();
        let translation = sqlx::query_as::<_, Translation>(
            r#"
            SELECT id, word, translation, reading, script, created_at, updated_at
            FROM translations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        match translation {
            Some(t) => {
                let (hydrated, audio) = self.hydrate(t).await?;
                Ok((Some(hydrated), audio))
            }
            None => Ok((None, None)),
        }
    }

    async fn get_usages_by_translation(&self, translation_id: Uuid) -> AppResult<Vec<Usage>> {
        let pool = self.pool.as_ref();
        let usages = sqlx::query_as::<_, Usage>(
            r#"
            SELECT id, translation_id, en, ja, created_at
            FROM translation_usages
            WHERE translation_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(translation_id)
        .fetch_all(pool)
        .await?;

        Ok(usages)
    }

    async fn get_existing_audio_for_usage(&self, usage_id: Uuid) -> AppResult<Option<UsageAudio>> {
        let pool = self.pool.as_ref();
        let audio = sqlx::query_as::<_, UsageAudio>(
            r#"
            SELECT id, usage_id, storage_url, voice_id, format, created_at
            FROM translation_usage_audio
            WHERE usage_id = $1
            "#,
        )
        .bind(usage_id)
        .fetch_optional(pool)
        .await?;

        Ok(audio)
    }

    async fn add_usage_audio(
        &self,
        usage_id: Uuid,
        storage_url: &str,
        voice_id: Option<&str>,
        format: &str,
    ) -> AppResult<UsageAudio> {
        let pool = self.pool.as_ref();
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();

        let inserted = sqlx::query(
            r#"
            INSERT INTO translation_usage_audio (id, usage_id, storage_url, voice_id, format, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(usage_id)
        .bind(storage_url)
        .bind(voice_id)
        .bind(format)
        .bind(now)
        .execute(pool)
        .await;

        match inserted {
            Ok(_) => Ok(UsageAudio {
                id,
                usage_id,
                storage_url: storage_url.to_string(),
                voice_id: voice_id.map(str::to_string),
                format: format.to_string(),
                created_at: now,
            }),
            Err(e) if Self::is_unique_violation(&e) => {
                // A concurrent request already created audio for this usage.
                tracing::debug!(
                    usage_id = %usage_id,
                    "usage audio insert lost a race, returning existing row"
                );
                self.get_existing_audio_for_usage(usage_id).await?.ok_or_else(|| {
                    AppError::Internal(
                        "usage audio conflict detected but winning row not found".to_string(),
                    )
                })
            }
            Err(e) => Err(AppError::Database(e)),
        }
    }
}
