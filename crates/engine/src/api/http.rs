//! HTTP routes.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use starbridge_shared::CampaignSummary;

use crate::app::App;
use crate::use_cases::CampaignError;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/campaigns", get(list_campaigns))
}

async fn health() -> &'static str {
    "OK"
}

async fn list_campaigns(
    State(app): State<Arc<App>>,
) -> Result<Json<Vec<CampaignSummary>>, ApiError> {
    let campaigns = app.use_cases.campaign.list().await?;
    Ok(Json(campaigns.iter().map(CampaignSummary::from).collect()))
}

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Internal(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::NotFound => {
                (axum::http::StatusCode::NOT_FOUND, "Not found").into_response()
            }
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "HTTP request failed");
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error",
                )
                    .into_response()
            }
        }
    }
}

impl From<crate::infrastructure::ports::RepoError> for ApiError {
    fn from(e: crate::infrastructure::ports::RepoError) -> Self {
        if e.is_not_found() {
            ApiError::NotFound
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

impl From<CampaignError> for ApiError {
    fn from(e: CampaignError) -> Self {
        match e {
            CampaignError::Repo(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
