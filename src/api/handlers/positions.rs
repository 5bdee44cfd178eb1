//! Position endpoints.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tracing::info;
use uuid::Uuid;

use crate::api::request::{json_body, path_param, query_params};
use crate::api::response::{ApiErrorResponse, Traced, json_response};
use crate::api::state::AppState;
use crate::models::PositionInput;
use crate::repo::{PositionQuery, PositionRepository};

/// GET /positions
pub(super) async fn list_positions(
    State(state): State<AppState>,
    query: Result<Query<PositionQuery>, QueryRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;

    let positions = state
        .with_db(|conn| PositionRepository::new(conn).list(&query))
        .traced(correlation_id)?;

    Ok(json_response(StatusCode::OK, positions))
}

/// POST /positions
pub(super) async fn create_position(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PositionInput>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let input = json_body(payload, correlation_id)?;
    let actor = state.actor(&headers);

    let position = state
        .with_db(|conn| PositionRepository::new(conn).create(&input, &actor))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        position_id = position.id,
        code = %position.code,
        actor = %actor.user,
        "Position created"
    );
    Ok(json_response(StatusCode::CREATED, position))
}

/// GET /positions/{id}
pub(super) async fn get_position(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;

    let position = state
        .with_db(|conn| PositionRepository::new(conn).require(id))
        .traced(correlation_id)?;

    Ok(json_response(StatusCode::OK, position))
}

/// PUT /positions/{id}
pub(super) async fn update_position(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PositionInput>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;
    let input = json_body(payload, correlation_id)?;
    let actor = state.actor(&headers);

    let position = state
        .with_db(|conn| PositionRepository::new(conn).update(id, &input, &actor))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        position_id = id,
        actor = %actor.user,
        "Position updated"
    );
    Ok(json_response(StatusCode::OK, position))
}

/// DELETE /positions/{id}
pub(super) async fn delete_position(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;
    let actor = state.actor(&headers);

    state
        .with_db(|conn| PositionRepository::new(conn).soft_delete(id, &actor))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        position_id = id,
        actor = %actor.user,
        "Position deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// POST /positions/{id}/restore
pub(super) async fn restore_position(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;
    let actor = state.actor(&headers);

    let position = state
        .with_db(|conn| PositionRepository::new(conn).restore(id, &actor))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        position_id = id,
        actor = %actor.user,
        "Position restored"
    );
    Ok(json_response(StatusCode::OK, position))
}
