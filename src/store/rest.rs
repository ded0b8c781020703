use super::{LocalizationStore, StoreError, KEYS_TABLE, TRANSLATIONS_TABLE};
use crate::models::{Translation, TranslationKey};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct IdRow {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct KeyIdRow {
    key_id: i64,
}

/// Client for a PostgREST-style remote query API (e.g. Supabase).
///
/// Filters are sent as query parameters: `col=eq.value` for equality,
/// `col=in.(a,b)` for membership and `select=a,b` for projection.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    /// `project_url` is the project root; `/rest/v1` is appended.
    pub fn new(project_url: &str, api_key: &str) -> Self {
        Self::with_client(reqwest::Client::new(), project_url, api_key)
    }

    pub fn with_client(client: reqwest::Client, project_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }

    /// Execute a filtered read against `table` and decode the rows.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &'static str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let url = format!("{}/{}", self.base_url, table);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(StoreError::Status { status, body });
        }

        let body = response.text().await?;
        let rows: Vec<T> =
            serde_json::from_str(&body).map_err(|source| StoreError::Decode { table, source })?;

        debug!("Read {} rows from {}", rows.len(), table);
        Ok(rows)
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

fn in_list(ids: &[i64]) -> String {
    let joined = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({})", joined)
}

#[async_trait]
impl LocalizationStore for RestStore {
    async fn select_all_keys(&self) -> Result<Vec<TranslationKey>, StoreError> {
        self.select(KEYS_TABLE, &[("select", "*".to_string())]).await
    }

    async fn select_project_keys(
        &self,
        project_id: &str,
    ) -> Result<Vec<TranslationKey>, StoreError> {
        self.select(
            KEYS_TABLE,
            &[("select", "*".to_string()), ("project_id", eq(project_id))],
        )
        .await
    }

    async fn select_project_key_ids(&self, project_id: &str) -> Result<Vec<i64>, StoreError> {
        let rows: Vec<IdRow> = self
            .select(
                KEYS_TABLE,
                &[("select", "id".to_string()), ("project_id", eq(project_id))],
            )
            .await?;
        Ok(rows.into_iter().map(|r| r.id).collect())
    }

    async fn select_translations(
        &self,
        key_ids: &[i64],
        locale: &str,
    ) -> Result<Vec<Translation>, StoreError> {
        self.select(
            TRANSLATIONS_TABLE,
            &[
                ("select", "*".to_string()),
                ("key_id", in_list(key_ids)),
                ("locale", eq(locale)),
            ],
        )
        .await
    }

    async fn select_translated_key_ids(
        &self,
        key_ids: &[i64],
        locale: &str,
    ) -> Result<Vec<i64>, StoreError> {
        let rows: Vec<KeyIdRow> = self
            .select(
                TRANSLATIONS_TABLE,
                &[
                    ("select", "key_id".to_string()),
                    ("key_id", in_list(key_ids)),
                    ("locale", eq(locale)),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(|r| r.key_id).collect())
    }
}
