//! HTTP request handlers for the configuration API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::{RunPlan, check_consistency};
use crate::config::{ConfigLoader, LoadOptions};
use crate::error::ConfigError;

use super::request::ValidateParams;
use super::response::{
    ApiError, ApiErrorResponse, ConfigSummary, HealthResponse, ValidationResponse,
};
use super::state::AppState;

/// Source label used in errors for documents posted to `/validate`.
const REQUEST_SOURCE: &str = "<request>";

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/configs", get(list_configs_handler))
        .route("/configs/:name", get(get_config_handler))
        .route("/configs/:name/report", get(report_handler))
        .route("/configs/:name/plan", get(plan_handler))
        .route("/validate", post(validate_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(err: ConfigError) -> Response {
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

/// Handler for GET /health.
async fn health_handler(State(state): State<AppState>) -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok".to_string(),
            configs: state.catalog().len(),
        },
    )
}

/// Handler for GET /configs.
async fn list_configs_handler(State(state): State<AppState>) -> Response {
    let summaries: Vec<ConfigSummary> = state.catalog().configs().map(Into::into).collect();
    json_response(StatusCode::OK, summaries)
}

/// Handler for GET /configs/:name.
async fn get_config_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    match state.catalog().get(&name) {
        Ok(loaded) => json_response(StatusCode::OK, loaded),
        Err(err) => {
            warn!(name = %name, "Configuration not found");
            error_response(err)
        }
    }
}

/// Handler for GET /configs/:name/report.
async fn report_handler(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.catalog().get(&name) {
        Ok(loaded) => json_response(StatusCode::OK, check_consistency(loaded)),
        Err(err) => error_response(err),
    }
}

/// Handler for GET /configs/:name/plan.
async fn plan_handler(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let plan = state
        .catalog()
        .get(&name)
        .and_then(RunPlan::build);
    match plan {
        Ok(plan) => json_response(StatusCode::OK, plan),
        Err(err) => {
            warn!(name = %name, error = %err, "Failed to build run plan");
            error_response(err)
        }
    }
}

/// Handler for POST /validate.
///
/// The body is a YAML document. On success the response carries the
/// validated configuration and its consistency report.
async fn validate_handler(
    params: Result<Query<ValidateParams>, QueryRejection>,
    body: String,
) -> Response {
    // Generate correlation ID for request tracking
    let validation_id = Uuid::new_v4();
    info!(validation_id = %validation_id, "Processing validation request");

    let options: LoadOptions = match params {
        Ok(Query(params)) => params.into(),
        Err(rejection) => {
            warn!(
                validation_id = %validation_id,
                error = %rejection,
                "Invalid query string"
            );
            return json_response(
                StatusCode::BAD_REQUEST,
                ApiError::invalid_query(rejection.body_text()),
            );
        }
    };

    let start_time = Instant::now();
    match ConfigLoader::parse_str(REQUEST_SOURCE, REQUEST_SOURCE, &body, options) {
        Ok(loaded) => {
            let report = check_consistency(&loaded);
            let duration = start_time.elapsed();
            info!(
                validation_id = %validation_id,
                theme = %loaded.theme(),
                findings = report.findings.len(),
                duration_us = duration.as_micros(),
                "Validation completed successfully"
            );
            json_response(
                StatusCode::OK,
                ValidationResponse {
                    validation_id,
                    timestamp: Utc::now(),
                    engine_version: env!("CARGO_PKG_VERSION").to_string(),
                    theme: loaded.theme(),
                    config: loaded.config().clone(),
                    report,
                    duration_us: duration.as_micros() as u64,
                },
            )
        }
        Err(err) => {
            warn!(
                validation_id = %validation_id,
                error = %err,
                "Validation failed"
            );
            error_response(err)
        }
    }
}
