//! Typed entities for translation keys, translations and the records derived
//! from them.
//!
//! Store rows are mapped into these types at the store boundary. Nothing past
//! the `store` module handles untyped rows.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Locales reported by the completion aggregator, in query order.
pub const COMPLETION_LOCALES: [&str; 3] = ["en", "es", "pt"];

/// A named slot within a project that requires localized text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, sqlx::FromRow)]
pub struct TranslationKey {
    pub id: i64,
    pub key: String,
    pub category: Option<String>,
    /// Absent when keys are read across all projects without that column
    #[serde(default, deserialize_with = "deserialize_opaque_id")]
    pub project_id: Option<String>,
}

/// A translated value of one key in one locale.
///
/// `updated_at` is kept as the store's own text and echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, sqlx::FromRow)]
pub struct Translation {
    pub key_id: i64,
    pub value: Option<String>,
    pub updated_at: Option<String>,
    pub locale: String,
}

/// One key merged with its translation (if any) for a requested locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizationRecord {
    pub id: i64,
    pub key: String,
    pub category: Option<String>,
    /// Empty when the key has no translation in the locale
    pub value: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<String>,
}

impl LocalizationRecord {
    /// Merge a key with its matching translation.
    pub fn from_key(key: &TranslationKey, translation: Option<&Translation>) -> Self {
        Self {
            id: key.id,
            key: key.key.clone(),
            category: key.category.clone(),
            value: translation
                .and_then(|t| t.value.clone())
                .unwrap_or_default(),
            updated_at: translation.and_then(|t| t.updated_at.clone()),
        }
    }
}

/// Per-locale completion percentages for one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionReport {
    pub project_id: i64,
    pub completion: BTreeMap<String, f64>,
}

/// Share of `translated` over `total` as a percentage with two decimals.
pub fn completion_percent(translated: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_percent(translated as f64 / total as f64 * 100.0)
}

fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Accept an identifier stored either as text or as a number.
fn deserialize_opaque_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OpaqueId {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(
        Option::<OpaqueId>::deserialize(deserializer)?.map(|id| match id {
            OpaqueId::Text(s) => s,
            OpaqueId::Integer(n) => n.to_string(),
            OpaqueId::Float(n) => n.to_string(),
        }),
    )
}
