//! Minimum-wage rate endpoints.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
    response::Response,
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::api::request::{WageLookupQuery, json_body, path_param, query_params};
use crate::api::response::{ApiErrorResponse, Traced, json_response};
use crate::api::state::AppState;
use crate::models::{WageRateInput, WageRateView};
use crate::repo::{WageRateQuery, WageRateRepository};
use crate::wage::{self, ActivatedRate};

/// Body returned by `POST /wage-rates/activate`.
#[derive(Debug, Serialize)]
struct ActivationReport {
    date: NaiveDate,
    activated: Vec<ActivatedRate>,
}

/// GET /wage-rates
pub(super) async fn list_wage_rates(
    State(state): State<AppState>,
    query: Result<Query<WageRateQuery>, QueryRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;
    let today = state.today();

    let rates = state
        .with_db(|conn| WageRateRepository::new(conn).list(&query, today))
        .traced(correlation_id)?;

    let views: Vec<WageRateView> = rates
        .into_iter()
        .map(|rate| WageRateView::new(rate, today))
        .collect();
    Ok(json_response(StatusCode::OK, views))
}

/// GET /wage-rates/current
pub(super) async fn current_wage_rates(
    State(state): State<AppState>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let today = state.today();

    let rates = state
        .with_db(|conn| wage::current_rates(conn, today))
        .traced(correlation_id)?;

    let views: Vec<WageRateView> = rates
        .into_iter()
        .map(|rate| WageRateView::new(rate, today))
        .collect();
    Ok(json_response(StatusCode::OK, views))
}

/// GET /wage-rates/lookup?region_code=...&date=...
pub(super) async fn lookup_wage_rate(
    State(state): State<AppState>,
    query: Result<Query<WageLookupQuery>, QueryRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let query = query_params(query, correlation_id)?;
    let today = state.today();
    let date = query.date.unwrap_or(today);

    let rate = state
        .with_db(|conn| wage::rate_for_region_on(conn, &query.region_code, date))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        region_code = %rate.region_code,
        date = %date,
        daily_rate = %rate.daily_rate,
        "Wage rate looked up"
    );
    Ok(json_response(StatusCode::OK, WageRateView::new(rate, today)))
}

/// POST /wage-rates/activate
///
/// Runs activation for every region now, regardless of the daily flag.
pub(super) async fn activate_wage_rates(
    State(state): State<AppState>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let today = state.today();

    let activated = state
        .with_db(|conn| wage::activate_all(conn, today))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        date = %today,
        activated = activated.len(),
        "Wage rates activated on request"
    );
    Ok(json_response(
        StatusCode::OK,
        ActivationReport {
            date: today,
            activated,
        },
    ))
}

/// POST /wage-rates
pub(super) async fn create_wage_rate(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<WageRateInput>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let input = json_body(payload, correlation_id)?;
    let actor = state.actor(&headers);
    let today = state.today();

    let rate = state
        .with_db(|conn| wage::create_rate(conn, &input, &actor, today))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        wage_rate_id = rate.id,
        region_code = %rate.region_code,
        effective_date = %rate.effective_date,
        is_current = rate.is_current,
        actor = %actor.user,
        "Wage rate created"
    );
    Ok(json_response(StatusCode::CREATED, WageRateView::new(rate, today)))
}

/// GET /wage-rates/{id}
pub(super) async fn get_wage_rate(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;
    let today = state.today();

    let rate = state
        .with_db(|conn| WageRateRepository::new(conn).require(id))
        .traced(correlation_id)?;

    Ok(json_response(StatusCode::OK, WageRateView::new(rate, today)))
}

/// PUT /wage-rates/{id}
pub(super) async fn update_wage_rate(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<WageRateInput>, JsonRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;
    let input = json_body(payload, correlation_id)?;
    let actor = state.actor(&headers);
    let today = state.today();

    let rate = state
        .with_db(|conn| wage::update_rate(conn, id, &input, &actor, today))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        wage_rate_id = id,
        region_code = %rate.region_code,
        is_current = rate.is_current,
        actor = %actor.user,
        "Wage rate updated"
    );
    Ok(json_response(StatusCode::OK, WageRateView::new(rate, today)))
}

/// DELETE /wage-rates/{id}
pub(super) async fn delete_wage_rate(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;
    let actor = state.actor(&headers);
    let today = state.today();

    state
        .with_db(|conn| wage::delete_rate(conn, id, &actor, today))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        wage_rate_id = id,
        actor = %actor.user,
        "Wage rate deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// POST /wage-rates/{id}/restore
pub(super) async fn restore_wage_rate(
    State(state): State<AppState>,
    headers: HeaderMap,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    let id = path_param(path, correlation_id)?;
    let actor = state.actor(&headers);
    let today = state.today();

    let rate = state
        .with_db(|conn| wage::restore_rate(conn, id, &actor, today))
        .traced(correlation_id)?;

    info!(
        correlation_id = %correlation_id,
        wage_rate_id = id,
        is_current = rate.is_current,
        actor = %actor.user,
        "Wage rate restored"
    );
    Ok(json_response(StatusCode::OK, WageRateView::new(rate, today)))
}
