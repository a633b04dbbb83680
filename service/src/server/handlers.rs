//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::{IntoResponse, Redirect},
    Json,
};
use openapi_server::models::{
    DeployRequest, DeployResponse, HealthResponse, OAuthCallbackQuery, VersionResponse,
};
use tracing::info;

use crate::app::state::AppState;
use crate::deploy::trigger::trigger;
use crate::errors::ServiceError;
use crate::installer::install::complete_install;
use crate::utils::version_info;

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    let version = version_info();
    Json(VersionResponse {
        version: version.version,
        git_hash: version.git_hash,
        build_time: version.build_time,
    })
}

/// OAuth callback handler
pub async fn oauth_callback_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Redirect, ServiceError> {
    let location = complete_install(&state, query).await?;
    Ok(Redirect::to(&location))
}

/// Deploy handler
pub async fn deploy_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DeployRequest>, JsonRejection>,
) -> Result<Json<DeployResponse>, ServiceError> {
    let Json(request) = payload.map_err(|e| ServiceError::validation(e.body_text()))?;

    let request = request
        .validate()
        .map_err(|details| ServiceError::ValidationError {
            message: "Invalid deploy request.".to_string(),
            details,
        })?;

    info!("Deploy requested for configuration {}", request.configuration_id);
    let response = trigger(&state, request).await?;
    Ok(Json(response))
}
