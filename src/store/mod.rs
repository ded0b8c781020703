//! Data access for translation keys and translations.
//!
//! The query service only depends on [`LocalizationStore`]. Implementations:
//!
//! - `rest`: PostgREST-style remote query API (Supabase)
//! - `postgres`: direct Postgres access through a sqlx pool
//! - `memory`: in-memory rows for tests and local runs

mod memory;
mod postgres;
mod rest;

pub use memory::{MemoryStore, StoreCalls};
pub use postgres::PostgresStore;
pub use rest::RestStore;

use crate::models::{Translation, TranslationKey};
use async_trait::async_trait;

/// Table holding translation keys.
pub const KEYS_TABLE: &str = "translation_keys";

/// Table holding translations.
pub const TRANSLATIONS_TABLE: &str = "translations";

/// A store read failed. Empty results are never reported through this type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode {table} rows: {source}")]
    Decode {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("database query failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// Read-only access to keys and translations.
///
/// Every operation is a single round-trip to the backing store.
#[async_trait]
pub trait LocalizationStore: Send + Sync {
    /// All keys across all projects, in store order.
    async fn select_all_keys(&self) -> Result<Vec<TranslationKey>, StoreError>;

    /// Keys whose `project_id` equals `project_id`, in store order.
    async fn select_project_keys(
        &self,
        project_id: &str,
    ) -> Result<Vec<TranslationKey>, StoreError>;

    /// Only the ids of a project's keys.
    async fn select_project_key_ids(&self, project_id: &str) -> Result<Vec<i64>, StoreError>;

    /// Translations in `locale` for any of `key_ids`.
    async fn select_translations(
        &self,
        key_ids: &[i64],
        locale: &str,
    ) -> Result<Vec<Translation>, StoreError>;

    /// Only the `key_id` column of translations in `locale` for any of
    /// `key_ids`. May contain duplicates.
    async fn select_translated_key_ids(
        &self,
        key_ids: &[i64],
        locale: &str,
    ) -> Result<Vec<i64>, StoreError>;
}
