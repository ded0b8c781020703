//! HTTP routes over the query service.

use crate::models::LocalizationRecord;
use crate::queries::QueryService;
use crate::store::StoreError;
use anyhow::Result;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub queries: QueryService,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct AllLocalizationsResponse {
    pub locale: String,
    pub localizations: Vec<LocalizationRecord>,
}

#[derive(Debug, Serialize)]
pub struct ProjectLocalizationsResponse {
    pub project_id: String,
    pub locale: String,
    pub localizations: Vec<LocalizationRecord>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors surfaced by handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid path parameter: {0}")]
    InvalidPath(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Store(e) => {
                error!("Store read failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::InvalidPath(msg) => {
                warn!("Rejected request: {}", msg);
                StatusCode::UNPROCESSABLE_ENTITY
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub fn router(queries: QueryService) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/localizations/:locale", get(get_all_localizations))
        .route("/localizations/:project_id/:locale", get(get_localizations))
        .route("/analytics/completion/:project_id", get(get_completion))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { queries })
}

/// Serve until Ctrl+C or SIGTERM.
pub async fn serve(listener: TcpListener, queries: QueryService) -> Result<()> {
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(queries))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn get_all_localizations(
    State(state): State<AppState>,
    Path(locale): Path<String>,
) -> Result<Json<AllLocalizationsResponse>, ApiError> {
    let localizations = state.queries.fetch_all_localizations(&locale).await?;
    Ok(Json(AllLocalizationsResponse {
        locale,
        localizations,
    }))
}

async fn get_localizations(
    State(state): State<AppState>,
    Path((project_id, locale)): Path<(String, String)>,
) -> Result<Json<ProjectLocalizationsResponse>, ApiError> {
    let localizations = state
        .queries
        .fetch_localizations(&project_id, &locale)
        .await?;
    Ok(Json(ProjectLocalizationsResponse {
        project_id,
        locale,
        localizations,
    }))
}

/// Completion report, or `{}` when the project has no keys.
async fn get_completion(
    State(state): State<AppState>,
    project_id: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(project_id) = project_id.map_err(|e| ApiError::InvalidPath(e.body_text()))?;

    let response = match state.queries.get_translation_completion(project_id).await? {
        Some(report) => Json(report).into_response(),
        None => Json(json!({})).into_response(),
    };
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_maps_to_500() {
        let err = ApiError::Store(StoreError::Status {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "upstream down".to_string(),
        });
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_path_maps_to_422() {
        let err = ApiError::InvalidPath("abc".to_string());
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_store_error_message_is_transparent() {
        let err = ApiError::Store(StoreError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: "bad key".to_string(),
        });
        assert_eq!(err.to_string(), "store returned 401 Unauthorized: bad key");
    }

    #[test]
    fn test_project_response_field_order() {
        let response = ProjectLocalizationsResponse {
            project_id: "p1".to_string(),
            locale: "en".to_string(),
            localizations: vec![],
        };
        let json = serde_json::to_string(&response).expect("serialize");
        assert_eq!(json, r#"{"project_id":"p1","locale":"en","localizations":[]}"#);
    }
}
