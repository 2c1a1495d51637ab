use crate::helpers::test_pool;

use kotoba_backend::domain::translation::{Script, TranslationPayload, UsagePair};
use kotoba_backend::infrastructure::repositories::{
    PgTranslationRepository, TranslationRepository,
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

fn cat_payload() -> TranslationPayload {
    TranslationPayload {
        word: "cat".to_string(),
        translation: "猫".to_string(),
        reading: Some("ねこ".to_string()),
        script: Script::Kanji,
        usage: vec![
            UsagePair {
                en: "The cat is sleeping.".to_string(),
                ja: "猫が寝ています。".to_string(),
            },
            UsagePair {
                en: "I have a cat.".to_string(),
                ja: "猫を飼っています。".to_string(),
            },
        ],
    }
}

#[tokio::test]
async fn it_should_return_the_existing_row_when_the_same_translation_is_inserted_twice() {
    let pool = test_pool().await;
    let repo = PgTranslationRepository::new(Arc::new(pool.clone()));

    let first = repo.insert_translation(&cat_payload()).await.unwrap();
    let second = repo.insert_translation(&cat_payload()).await.unwrap();

    assert_eq!(
        first.translation.id, second.translation.id,
        "Duplicate insert should converge on the first row"
    );
    assert_eq!(second.usages.len(), 2, "Usages should come back loaded");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM translations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1, "Only one translation row should exist");
}

#[tokio::test]
async fn it_should_resolve_a_lost_translation_insert_race_to_the_committed_row() {
    let pool = test_pool().await;
    let repo = Arc::new(PgTranslationRepository::new(Arc::new(pool.clone())));

    // An uncommitted competing insert is invisible to the repository's
    // existence pre-check, so the racing insert proceeds and blocks on the
    // uniqueness constraint until the competitor commits.
    let winner_id = Uuid::new_v4();
    let mut tx = pool.begin().await.unwrap();
    sqlx::query(
        r#"
        INSERT INTO translations (id, word, translation, reading, script)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(winner_id)
    .bind("cat")
    .bind("猫")
    .bind("ねこ")
    .bind("kanji")
    .execute(&mut *tx)
    .await
    .unwrap();

    let racing = {
        let repo = repo.clone();
        tokio::spawn(async move { repo.insert_translation(&cat_payload()).await })
    };

    // Let the racing insert reach the constraint before the winner commits
    tokio::time::sleep(Duration::from_millis(200)).await;
    tx.commit().await.unwrap();

    let lost = racing.await.unwrap().unwrap();
    assert_eq!(
        lost.translation.id, winner_id,
        "The losing insert should re-read the committed row"
    );

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM translations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1, "Only the winning translation row should exist");
}

#[tokio::test]
async fn it_should_keep_the_first_usage_audio_when_a_duplicate_insert_arrives() {
    let pool = test_pool().await;
    let repo = PgTranslationRepository::new(Arc::new(pool.clone()));

    let seeded = repo.insert_translation(&cat_payload()).await.unwrap();
    let usage_id = seeded.usages[0].usage.id;

    let first = repo
        .add_usage_audio(
            usage_id,
            "https://cdn.example.com/first.mp3",
            Some("voice-a"),
            "mp3",
        )
        .await
        .unwrap();

    // The duplicate hits the usage_id uniqueness constraint and comes back
    // as the row already in place
    let second = repo
        .add_usage_audio(
            usage_id,
            "https://cdn.example.com/second.mp3",
            Some("voice-b"),
            "mp3",
        )
        .await
        .unwrap();

    assert_eq!(second.id, first.id, "Duplicate insert should return the existing row");
    assert_eq!(
        second.storage_url, "https://cdn.example.com/first.mp3",
        "The first upload should win"
    );

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM translation_usage_audio WHERE usage_id = $1",
    )
    .bind(usage_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1, "Only one audio row per usage should exist");
}

#[tokio::test]
async fn it_should_resolve_a_lost_usage_audio_race_to_the_committed_row() {
    let pool = test_pool().await;
    let repo = Arc::new(PgTranslationRepository::new(Arc::new(pool.clone())));

    let seeded = repo.insert_translation(&cat_payload()).await.unwrap();
    let usage_id = seeded.usages[0].usage.id;

    let mut tx = pool.begin().await.unwrap();
    sqlx::query(
        r#"
        INSERT INTO translation_usage_audio (id, usage_id, storage_url, voice_id, format)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(usage_id)
    .bind("https://cdn.example.com/first.mp3")
    .bind("voice-a")
    .bind("mp3")
    .execute(&mut *tx)
    .await
    .unwrap();

    let racing = {
        let repo = repo.clone();
        tokio::spawn(async move {
            repo.add_usage_audio(
                usage_id,
                "https://cdn.example.com/second.mp3",
                Some("voice-b"),
                "mp3",
            )
            .await
        })
    };

    tokio::time::sleep(Duration::from_millis(200)).await;
    tx.commit().await.unwrap();

    let lost = racing.await.unwrap().unwrap();
    assert_eq!(
        lost.storage_url, "https://cdn.example.com/first.mp3",
        "The losing insert should return the committed competitor's row"
    );

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM translation_usage_audio WHERE usage_id = $1",
    )
    .bind(usage_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1, "Only one audio row per usage should exist");
}

#[tokio::test]
async fn it_should_return_the_most_recent_translation_audio() {
    let pool = test_pool().await;
    let repo = PgTranslationRepository::new(Arc::new(pool.clone()));

    let seeded = repo.insert_translation(&cat_payload()).await.unwrap();
    let translation_id = seeded.translation.id;

    let now = chrono::Utc::now();
    for (url, created_at) in [
        ("https://cdn.example.com/older.mp3", now - chrono::Duration::hours(1)),
        ("https://cdn.example.com/newer.mp3", now),
    ] {
        sqlx::query(
            r#"
            INSERT INTO translation_audio (id, translation_id, storage_url, voice_id, format, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(translation_id)
        .bind(url)
        .bind("voice-a")
        .bind("mp3")
        .bind(created_at)
        .execute(&pool)
        .await
        .unwrap();
    }

    let (found, audio) = repo.get_translation_with_audio_by_word("cat").await.unwrap();

    assert!(found.is_some(), "The cached translation should be found");
    assert_eq!(
        audio.unwrap().storage_url,
        "https://cdn.example.com/newer.mp3",
        "The most recently created audio row should win"
    );
}

#[tokio::test]
async fn it_should_find_cached_translations_case_insensitively() {
    let pool = test_pool().await;
    let repo = PgTranslationRepository::new(Arc::new(pool.clone()));

    repo.insert_translation(&cat_payload()).await.unwrap();

    let (found, _) = repo.get_translation_with_audio_by_word("CAT").await.unwrap();

    assert_eq!(
        found.map(|t| t.translation.word),
        Some("cat".to_string()),
        "Word lookup should ignore case"
    );
}
