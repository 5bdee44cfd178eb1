//! PSGC proxy endpoints.
//!
//! Responses carry an `X-Cache` header (`hit`, `miss` or `stale`).

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::api::request::{ClearCacheQuery, ResolveRegionQuery, path_param, query_params};
use crate::api::response::{ApiErrorResponse, Traced, json_response};
use crate::api::state::AppState;
use crate::psgc::CachedResponse;

const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

fn cached_response(correlation_id: Uuid, resource: &str, response: CachedResponse) -> Response {
    info!(
        correlation_id = %correlation_id,
        resource = %resource,
        cache = response.status.as_str(),
        "PSGC resource served"
    );
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json"),
            (X_CACHE, response.status.as_str()),
        ],
        Json(response.data),
    )
        .into_response()
}

/// GET /psgc/regions
pub(super) async fn regions(State(state): State<AppState>) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let response = state
        .psgc()
        .regions(state.db())
        .await
        .traced(correlation_id)?;
    Ok(cached_response(correlation_id, "regions", response))
}

/// GET /psgc/regions/resolve?name=...
pub(super) async fn resolve_region(
    State(state): State<AppState>,
    query: Result<Query<ResolveRegionQuery>, QueryRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;

    let region = state
        .psgc()
        .resolve_region(state.db(), &query.name)
        .await
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        query = %query.name,
        region_code = %region.code,
        "Region name resolved"
    );
    Ok(json_response(StatusCode::OK, region))
}

/// GET /psgc/regions/{code}/provinces
pub(super) async fn provinces_of_region(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let code = path_param(path, correlation_id)?;
    let response = state
        .psgc()
        .provinces_of_region(state.db(), &code)
        .await
        .traced(correlation_id)?;
    Ok(cached_response(correlation_id, "provinces", response))
}

/// GET /psgc/regions/{code}/cities-municipalities
pub(super) async fn cities_of_region(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let code = path_param(path, correlation_id)?;
    let response = state
        .psgc()
        .cities_of_region(state.db(), &code)
        .await
        .traced(correlation_id)?;
    Ok(cached_response(correlation_id, "cities-municipalities", response))
}

/// GET /psgc/provinces/{code}/cities-municipalities
pub(super) async fn cities_of_province(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let code = path_param(path, correlation_id)?;
    let response = state
        .psgc()
        .cities_of_province(state.db(), &code)
        .await
        .traced(correlation_id)?;
    Ok(cached_response(correlation_id, "cities-municipalities", response))
}

/// GET /psgc/cities-municipalities/{code}/barangays
pub(super) async fn barangays_of_city(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let code = path_param(path, correlation_id)?;
    let response = state
        .psgc()
        .barangays_of_city(state.db(), &code)
        .await
        .traced(correlation_id)?;
    Ok(cached_response(correlation_id, "barangays", response))
}

/// DELETE /psgc/cache?prefix=...
pub(super) async fn clear_cache(
    State(state): State<AppState>,
    query: Result<Query<ClearCacheQuery>, QueryRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;
    let prefix = query.prefix.as_deref().map(str::trim).filter(|p| !p.is_empty());

    let removed = state
        .psgc()
        .clear(state.db(), prefix)
        .traced(correlation_id)?;

    Ok(json_response(StatusCode::OK, json!({ "removed": removed })))
}
