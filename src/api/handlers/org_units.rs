//! Organizational unit endpoints.

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

use crate::api::request::{IncludeDeletedQuery, json_body, path_param, query_params};
use crate::api::response::{ApiErrorResponse, Traced, json_response};
use crate::api::state::AppState;
use crate::models::OrgUnitInput;
use crate::repo::OrgUnitRepository;

/// GET /org-units
pub(super) async fn list_org_units(
    State(state): State<AppState>,
    query: Result<Query<IncludeDeletedQuery>, QueryRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;

    let units = state
        .with_db(|conn| OrgUnitRepository::new(conn).list(query.include_deleted))
        .traced(correlation_id)?;

    Ok(json_response(StatusCode::OK, units))
}

/// GET /org-units/tree
pub(super) async fn org_unit_tree(
    State(state): State<AppState>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();

    let tree = state
        .with_db(|conn| OrgUnitRepository::new(conn).tree())
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        roots = tree.len(),
        "Organization tree built"
    );
    Ok(json_response(StatusCode::OK, tree))
}

/// POST /org-units
pub(super) async fn create_org_unit(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<OrgUnitInput>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let input = json_body(payload, correlation_id)?;
    let actor = state.actor(&headers);

    let unit = state
        .with_db(|conn| OrgUnitRepository::new(conn).create(&input, &actor))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        org_unit_id = unit.id,
        code = %unit.code,
        actor = %actor.user,
        "Organizational unit created"
    );
    Ok(json_response(StatusCode::CREATED, unit))
}

/// GET /org-units/{id}
pub(super) async fn get_org_unit(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;

    let unit = state
        .with_db(|conn| OrgUnitRepository::new(conn).require(id))
        .traced(correlation_id)?;

    Ok(json_response(StatusCode::OK, unit))
}

/// PUT /org-units/{id}
pub(super) async fn update_org_unit(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<OrgUnitInput>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;
    let input = json_body(payload, correlation_id)?;
    let actor = state.actor(&headers);

    let unit = state
        .with_db(|conn| OrgUnitRepository::new(conn).update(id, &input, &actor))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        org_unit_id = id,
        actor = %actor.user,
        "Organizational unit updated"
    );
    Ok(json_response(StatusCode::OK, unit))
}

/// DELETE /org-units/{id}
pub(super) async fn delete_org_unit(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;
    let actor = state.actor(&headers);

    state
        .with_db(|conn| OrgUnitRepository::new(conn).soft_delete(id, &actor))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        org_unit_id = id,
        actor = %actor.user,
        "Organizational unit deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// POST /org-units/{id}/restore
pub(super) async fn restore_org_unit(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;
    let actor = state.actor(&headers);

    let unit = state
        .with_db(|conn| OrgUnitRepository::new(conn).restore(id, &actor))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        org_unit_id = id,
        actor = %actor.user,
        "Organizational unit restored"
    );
    Ok(json_response(StatusCode::OK, unit))
}
