use super::{LocalizationStore, StoreError};
use crate::models::{Translation, TranslationKey};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Snapshot of how many reads a [`MemoryStore`] has served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub key_reads: usize,
    pub translation_reads: usize,
}

impl StoreCalls {
    pub fn total(&self) -> usize {
        self.key_reads + self.translation_reads
    }
}

/// In-memory rows that answer the same filters as the real stores.
///
/// Rows are returned in insertion order. Reads are counted so callers can
/// assert how many round-trips an operation made.
#[derive(Debug, Default)]
pub struct MemoryStore {
    keys: Vec<TranslationKey>,
    translations: Vec<Translation>,
    failing_locale: Option<String>,
    fail_all: bool,
    key_reads: AtomicUsize,
    translation_reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new(keys: Vec<TranslationKey>, translations: Vec<Translation>) -> Self {
        Self {
            keys,
            translations,
            ..Self::default()
        }
    }

    /// Fail every translation read for `locale`.
    pub fn with_failing_locale(mut self, locale: &str) -> Self {
        self.failing_locale = Some(locale.to_string());
        self
    }

    /// Fail every read.
    pub fn with_failure(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn calls(&self) -> StoreCalls {
        StoreCalls {
            key_reads: self.key_reads.load(Ordering::Relaxed),
            translation_reads: self.translation_reads.load(Ordering::Relaxed),
        }
    }

    fn read_keys(&self) -> Result<(), StoreError> {
        self.key_reads.fetch_add(1, Ordering::Relaxed);
        if self.fail_all {
            return Err(unavailable());
        }
        Ok(())
    }

    fn read_translations(&self, locale: &str) -> Result<(), StoreError> {
        self.translation_reads.fetch_add(1, Ordering::Relaxed);
        if self.fail_all || self.failing_locale.as_deref() == Some(locale) {
            return Err(unavailable());
        }
        Ok(())
    }

    fn project_keys<'a>(&'a self, project_id: &'a str) -> impl Iterator<Item = &'a TranslationKey> {
        self.keys
            .iter()
            .filter(move |k| k.project_id.as_deref() == Some(project_id))
    }

    fn matching_translations<'a>(
        &'a self,
        key_ids: &'a [i64],
        locale: &'a str,
    ) -> impl Iterator<Item = &'a Translation> {
        self.translations
            .iter()
            .filter(move |t| t.locale == locale && key_ids.contains(&t.key_id))
    }
}

fn unavailable() -> StoreError {
    StoreError::Status {
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        body: "memory store configured to fail".to_string(),
    }
}

#[async_trait]
impl LocalizationStore for MemoryStore {
    async fn select_all_keys(&self) -> Result<Vec<TranslationKey>, StoreError> {
        self.read_keys()?;
        Ok(self.keys.clone())
    }

    async fn select_project_keys(
        &self,
        project_id: &str,
    ) -> Result<Vec<TranslationKey>, StoreError> {
        self.read_keys()?;
        Ok(self.project_keys(project_id).cloned().collect())
    }

    async fn select_project_key_ids(&self, project_id: &str) -> Result<Vec<i64>, StoreError> {
        self.read_keys()?;
        Ok(self.project_keys(project_id).map(|k| k.id).collect())
    }

    async fn select_translations(
        &self,
        key_ids: &[i64],
        locale: &str,
    ) -> Result<Vec<Translation>, StoreError> {
        self.read_translations(locale)?;
        Ok(self.matching_translations(key_ids, locale).cloned().collect())
    }

    async fn select_translated_key_ids(
        &self,
        key_ids: &[i64],
        locale: &str,
    ) -> Result<Vec<i64>, StoreError> {
        self.read_translations(locale)?;
        Ok(self
            .matching_translations(key_ids, locale)
            .map(|t| t.key_id)
            .collect())
    }
}
