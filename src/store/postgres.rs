use super::{LocalizationStore, StoreError};
use crate::models::{Translation, TranslationKey};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::debug;

// Columns are cast so integer or text ids decode into the same row types.
// `updated_at` is read as text and passed through unchanged.
const SELECT_KEYS: &str =
    "SELECT id::bigint AS id, key, category, project_id::text AS project_id FROM translation_keys";

const SELECT_TRANSLATIONS: &str = "SELECT key_id::bigint AS key_id, value, \
     updated_at::text AS updated_at, locale \
     FROM translations WHERE key_id = ANY($1) AND locale = $2";

/// Direct Postgres access for deployments that reach the database itself
/// rather than going through the remote query API.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect and verify the pool with one connection.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to Postgres")?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl LocalizationStore for PostgresStore {
    async fn select_all_keys(&self) -> Result<Vec<TranslationKey>, StoreError> {
        let keys = sqlx::query_as::<_, TranslationKey>(SELECT_KEYS)
            .fetch_all(&self.pool)
            .await?;
        debug!("Read {} rows from translation_keys", keys.len());
        Ok(keys)
    }

    async fn select_project_keys(
        &self,
        project_id: &str,
    ) -> Result<Vec<TranslationKey>, StoreError> {
        let sql = format!("{} WHERE project_id::text = $1", SELECT_KEYS);
        let keys = sqlx::query_as::<_, TranslationKey>(&sql)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;
        debug!(
            "Read {} rows from translation_keys for project {}",
            keys.len(),
            project_id
        );
        Ok(keys)
    }

    async fn select_project_key_ids(&self, project_id: &str) -> Result<Vec<i64>, StoreError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT id::bigint FROM translation_keys WHERE project_id::text = $1",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn select_translations(
        &self,
        key_ids: &[i64],
        locale: &str,
    ) -> Result<Vec<Translation>, StoreError> {
        let translations = sqlx::query_as::<_, Translation>(SELECT_TRANSLATIONS)
            .bind(key_ids)
            .bind(locale)
            .fetch_all(&self.pool)
            .await?;
        debug!(
            "Read {} rows from translations for locale {}",
            translations.len(),
            locale
        );
        Ok(translations)
    }

    async fn select_translated_key_ids(
        &self,
        key_ids: &[i64],
        locale: &str,
    ) -> Result<Vec<i64>, StoreError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT key_id::bigint FROM translations WHERE key_id = ANY($1) AND locale = $2",
        )
        .bind(key_ids)
        .bind(locale)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    //! These tests need a reachable Postgres and run with
    //! `DATABASE_URL=postgres://... cargo test -- --ignored`.
    //!
    //! Fixtures live in temporary tables on a single-connection pool, so they
    //! shadow any real tables and vanish when the pool closes.

    use super::*;

    async fn create_test_store() -> PostgresStore {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await
            .expect("Failed to connect to Postgres");

        for statement in [
            "SET TIME ZONE 'UTC'",
            "CREATE TEMP TABLE translation_keys (
                id INTEGER PRIMARY KEY,
                key TEXT NOT NULL,
                category TEXT,
                project_id INTEGER
            )",
            "CREATE TEMP TABLE translations (
                id SERIAL PRIMARY KEY,
                key_id INTEGER NOT NULL,
                value TEXT,
                updated_at TIMESTAMPTZ,
                locale TEXT NOT NULL
            )",
            "INSERT INTO translation_keys (id, key, category, project_id) VALUES
                (1, 'greeting', 'welcome', 1),
                (2, 'farewell', 'other', 1),
                (3, 'title', NULL, 1),
                (4, 'footer', 'layout', 2)",
            "INSERT INTO translations (key_id, value, updated_at, locale) VALUES
                (1, 'Hello', '2025-05-05 10:30:00+00', 'en'),
                (2, 'Goodbye', NULL, 'en'),
                (1, 'Hola', '2025-05-05 10:30:00+00', 'es'),
                (1, 'Hola de nuevo', '2025-05-06 10:30:00+00', 'es'),
                (3, NULL, NULL, 'es'),
                (4, 'Footer', NULL, 'en')",
        ] {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .expect("Failed to set up fixtures");
        }

        PostgresStore { pool }
    }

    fn sorted(mut ids: Vec<i64>) -> Vec<i64> {
        ids.sort_unstable();
        ids
    }

    // ==================== Key Reads ====================

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_select_all_keys_reads_every_project() {
        let store = create_test_store().await;

        let keys = store.select_all_keys().await.expect("Should read keys");

        assert_eq!(sorted(keys.iter().map(|k| k.id).collect()), vec![1, 2, 3, 4]);
        let footer = keys.iter().find(|k| k.id == 4).expect("footer key");
        assert_eq!(footer.project_id.as_deref(), Some("2"));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_select_project_keys_filters_by_project() {
        let store = create_test_store().await;

        let keys = store.select_project_keys("1").await.expect("Should read keys");

        assert_eq!(sorted(keys.iter().map(|k| k.id).collect()), vec![1, 2, 3]);
        let title = keys.iter().find(|k| k.id == 3).expect("title key");
        assert_eq!(title.category, None);
        assert!(store
            .select_project_keys("missing")
            .await
            .expect("Should read keys")
            .is_empty());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_select_project_key_ids_projection() {
        let store = create_test_store().await;

        let ids = store.select_project_key_ids("2").await.expect("Should read ids");

        assert_eq!(ids, vec![4]);
    }

    // ==================== Translation Reads ====================

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_select_translations_filters_membership_and_locale() {
        let store = create_test_store().await;

        let rows = store
            .select_translations(&[1, 2, 3], "en")
            .await
            .expect("Should read translations");

        assert_eq!(sorted(rows.iter().map(|t| t.key_id).collect()), vec![1, 2]);
        let hello = rows.iter().find(|t| t.key_id == 1).expect("key 1");
        assert_eq!(hello.value.as_deref(), Some("Hello"));
        assert_eq!(hello.updated_at.as_deref(), Some("2025-05-05 10:30:00+00"));
        let goodbye = rows.iter().find(|t| t.key_id == 2).expect("key 2");
        assert_eq!(goodbye.updated_at, None);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_select_translations_decodes_null_value() {
        let store = create_test_store().await;

        let rows = store
            .select_translations(&[3], "es")
            .await
            .expect("Should read translations");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, None);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_select_translated_key_ids_keeps_duplicates() {
        let store = create_test_store().await;

        let ids = store
            .select_translated_key_ids(&[1, 2, 3, 4], "es")
            .await
            .expect("Should read ids");

        assert_eq!(sorted(ids), vec![1, 1, 3]);
    }
}
