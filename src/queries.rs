//! Aggregation over translation keys and translations.
//!
//! Keys are merged with their translations into [`LocalizationRecord`]s and
//! counted into per-locale completion percentages. All reads go through an
//! injected [`LocalizationStore`]; nothing is kept between calls.

use crate::models::{
    completion_percent, CompletionReport, LocalizationRecord, Translation, TranslationKey,
    COMPLETION_LOCALES,
};
use crate::store::{LocalizationStore, StoreError};
use futures::future::try_join_all;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn LocalizationStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn LocalizationStore>) -> Self {
        Self { store }
    }

    /// Localizations for every key of one project.
    ///
    /// An unknown project has no keys and yields an empty list.
    pub async fn fetch_localizations(
        &self,
        project_id: &str,
        locale: &str,
    ) -> Result<Vec<LocalizationRecord>, StoreError> {
        let keys = self.store.select_project_keys(project_id).await?;
        debug!("Project {} has {} keys", project_id, keys.len());
        self.localize_keys(&keys, locale).await
    }

    /// Localizations for every key across all projects.
    pub async fn fetch_all_localizations(
        &self,
        locale: &str,
    ) -> Result<Vec<LocalizationRecord>, StoreError> {
        let keys = self.store.select_all_keys().await?;
        debug!("Fetched {} keys across all projects", keys.len());
        self.localize_keys(&keys, locale).await
    }

    /// Merge `keys` with their translations in `locale`, one record per key in
    /// input order. Makes no store read when `keys` is empty.
    pub async fn localize_keys(
        &self,
        keys: &[TranslationKey],
        locale: &str,
    ) -> Result<Vec<LocalizationRecord>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let key_ids: Vec<i64> = keys.iter().map(|k| k.id).collect();
        let translations = self.store.select_translations(&key_ids, locale).await?;

        Ok(merge_translations(keys, &translations))
    }

    /// Per-locale completion for a project, or `None` when it has no keys.
    ///
    /// Performs one key read plus one translation read per completion locale.
    /// The translation reads run concurrently and any failure fails the whole
    /// report.
    pub async fn get_translation_completion(
        &self,
        project_id: i64,
    ) -> Result<Option<CompletionReport>, StoreError> {
        let key_ids = self
            .store
            .select_project_key_ids(&project_id.to_string())
            .await?;
        let total_keys = key_ids.len();

        if total_keys == 0 {
            debug!("Project {} has no keys, empty completion report", project_id);
            return Ok(None);
        }

        let reads = COMPLETION_LOCALES.iter().map(|&locale| {
            let key_ids = &key_ids;
            async move {
                let translated = self.store.select_translated_key_ids(key_ids, locale).await?;
                let distinct: HashSet<i64> = translated.into_iter().collect();
                let percent = completion_percent(distinct.len(), total_keys);
                Ok::<_, StoreError>((locale.to_string(), percent))
            }
        });

        let completion: BTreeMap<String, f64> = try_join_all(reads).await?.into_iter().collect();

        info!(
            "Completion for project {} over {} keys: {:?}",
            project_id, total_keys, completion
        );

        Ok(Some(CompletionReport {
            project_id,
            completion,
        }))
    }
}

/// Join keys with translations by key id. When several translations share a
/// key id the last one wins.
pub fn merge_translations(
    keys: &[TranslationKey],
    translations: &[Translation],
) -> Vec<LocalizationRecord> {
    let by_key: HashMap<i64, &Translation> =
        translations.iter().map(|t| (t.key_id, t)).collect();

    keys.iter()
        .map(|key| LocalizationRecord::from_key(key, by_key.get(&key.id).copied()))
        .collect()
}
