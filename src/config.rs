use anyhow::{bail, Context, Result};

/// Which backing store the service reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgREST-style remote query API (Supabase)
    Rest { url: String, api_key: String },
    /// Direct Postgres connection
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Rest { .. } => "rest",
            StoreBackend::Postgres { .. } => "postgres",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    pub store: StoreBackend,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let backend = std::env::var("STORE_BACKEND").unwrap_or_else(|_| "rest".to_string());

        let store = match backend.trim().to_lowercase().as_str() {
            "rest" => StoreBackend::Rest {
                url: std::env::var("SUPABASE_URL").context("SUPABASE_URL not set")?,
                api_key: std::env::var("SUPABASE_KEY").context("SUPABASE_KEY not set")?,
            },
            "postgres" => StoreBackend::Postgres {
                database_url: std::env::var("DATABASE_URL").context("DATABASE_URL not set")?,
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            },
            other => bail!(
                "Invalid STORE_BACKEND: '{}'. Expected 'rest' or 'postgres'",
                other
            ),
        };

        Ok(Self {
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            store,
        })
    }
}
