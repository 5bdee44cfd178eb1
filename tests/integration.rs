//! End-to-end tests for the HRIS HTTP API.
//!
//! Every test drives the router with `oneshot` over a fresh in-memory
//! database. PSGC lookups go to a stub source so no network is needed.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

use hris::api::{ACTOR_HEADER, AppState, create_router};
use hris::config::AppConfig;
use hris::db::{open_db_in_memory, shared};
use hris::error::{HrisError, HrisResult};
use hris::psgc::{PsgcCache, PsgcSource};

// =============================================================================
// Test Helpers
// =============================================================================

struct StubSource {
    responses: HashMap<String, Value>,
    calls: AtomicUsize,
}

#[async_trait]
impl PsgcSource for StubSource {
    async fn fetch(&self, path: &str) -> HrisResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(path)
            .cloned()
            .ok_or_else(|| HrisError::not_found("PSGC resource", path))
    }
}

fn stub_source() -> Arc<StubSource> {
    let mut responses = HashMap::new();
    responses.insert(
        "regions.json".to_string(),
        json!([
            {"code": "130000000", "name": "National Capital Region", "regionName": "NCR"},
            {"code": "040000000", "name": "Calabarzon", "regionName": "Region IV-A"},
            {"code": "070000000", "name": "Central Visayas", "regionName": "Region VII"}
        ]),
    );
    responses.insert(
        "regions/040000000/provinces.json".to_string(),
        json!([
            {"code": "042100000", "name": "Cavite"},
            {"code": "043400000", "name": "Laguna"}
        ]),
    );
    responses.insert(
        "cities-municipalities/137404000/barangays.json".to_string(),
        json!([{"code": "137404001", "name": "Santo NiÃ±o"}]),
    );
    Arc::new(StubSource::from_map(responses))
}

impl StubSource {
    fn from_map(responses: HashMap<String, Value>) -> Self {
        Self {
            responses,
            calls: AtomicUsize::new(0),
        }
    }
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.attendance.descriptor_length = 4;
    config.attendance.face_match_threshold = 0.6;
    config.attendance.min_clock_interval_minutes = 1;
    config
}

fn create_router_for_test() -> (Router, Arc<StubSource>) {
    let config = test_config();
    let source = stub_source();
    let psgc = PsgcCache::new(source.clone(), &config.psgc);
    let db = shared(open_db_in_memory().unwrap());
    (create_router(AppState::new(db, config, psgc)), source)
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, _, body) = send_with_headers(router, method, uri, body).await;
    (status, body)
}

async fn send_with_headers(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(ACTOR_HEADER, "hr.admin");
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}

fn employee_body(number: &str) -> Value {
    json!({
        "employee_number": number,
        "first_name": "Maria",
        "middle_name": "Santos",
        "last_name": "Dela Cruz",
        "email": "maria@example.ph",
        "hire_date": "2023-06-01",
        "employment_status": "regular",
        "region_code": "130000000",
        "city_code": "137404000",
        "daily_rate": "600.00"
    })
}

async fn create_employee(router: &Router, number: &str) -> i64 {
    let (status, body) = send(router, "POST", "/employees", Some(employee_body(number))).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
    body["id"].as_i64().unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_ok() {
    let (router, _) = create_router_for_test();
    let (status, body) = send(&router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

// =============================================================================
// Employees
// =============================================================================

#[tokio::test]
async fn test_employee_lifecycle() {
    let (router, _) = create_router_for_test();
    let id = create_employee(&router, "EMP-001").await;

    let (status, body) = send(&router, "GET", &format!("/employees/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["employee_number"], "EMP-001");
    assert_eq!(body["created_by"], "hr.admin");

    let mut update = employee_body("EMP-001");
    update["last_name"] = json!("Reyes");
    let (status, body) = send(&router, "PUT", &format!("/employees/{id}"), Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["last_name"], "Reyes");

    let (status, _) = send(&router, "DELETE", &format!("/employees/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&router, "GET", &format!("/employees/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = send(&router, "POST", &format!("/employees/{id}/restore"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_deleted"], false);
}

#[tokio::test]
async fn test_duplicate_employee_number_conflicts() {
    let (router, _) = create_router_for_test();
    create_employee(&router, "EMP-001").await;

    let (status, body) = send(&router, "POST", "/employees", Some(employee_body("EMP-001"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_invalid_psgc_code_rejected() {
    let (router, _) = create_router_for_test();
    let mut body = employee_body("EMP-002");
    body["region_code"] = json!("NCR");

    let (status, body) = send(&router, "POST", "/employees", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"], "region_code");
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let (router, _) = create_router_for_test();
    let request = Request::builder()
        .method("POST")
        .uri("/employees")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_id_rejected() {
    let (router, _) = create_router_for_test();
    let (status, _) = send(&router, "GET", "/employees/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Organizational units and positions
// =============================================================================

#[tokio::test]
async fn test_org_unit_tree_nests_children() {
    let (router, _) = create_router_for_test();
    let (status, division) = send(
        &router,
        "POST",
        "/org-units",
        Some(json!({"code": "OPS", "name": "Operations", "unit_type": "division"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {division}");
    let division_id = division["id"].as_i64().unwrap();

    let (status, _) = send(
        &router,
        "POST",
        "/org-units",
        Some(json!({
            "code": "OPS-LOG",
            "name": "Logistics",
            "unit_type": "department",
            "parent_id": division_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, tree) = send(&router, "GET", "/org-units/tree", None).await;
    assert_eq!(status, StatusCode::OK);
    let roots = tree.as_array().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["children"][0]["code"], "OPS-LOG");

    // A unit with live children cannot be removed.
    let (status, _) = send(&router, "DELETE", &format!("/org-units/{division_id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_position_crud() {
    let (router, _) = create_router_for_test();
    let (status, position) = send(
        &router,
        "POST",
        "/positions",
        Some(json!({"code": "CASH", "title": "Cashier"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = position["id"].as_i64().unwrap();

    let (status, body) = send(
        &router,
        "PUT",
        &format!("/positions/{id}"),
        Some(json!({"code": "CASH", "title": "Senior Cashier"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Senior Cashier");

    let (status, _) = send(&router, "DELETE", &format!("/positions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&router, "GET", &format!("/positions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn create_org_unit(router: &Router, code: &str) -> i64 {
    let (status, body) = send(
        router,
        "POST",
        "/org-units",
        Some(json!({"code": code, "name": format!("{code} Department"), "unit_type": "department"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_org_unit_with_position_cannot_be_deleted() {
    let (router, _) = create_router_for_test();
    let unit_id = create_org_unit(&router, "HR").await;
    let (status, _) = send(
        &router,
        "POST",
        "/positions",
        Some(json!({"code": "HR-AST", "title": "HR Assistant", "org_unit_id": unit_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&router, "DELETE", &format!("/org-units/{unit_id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_org_unit_with_employee_cannot_be_deleted() {
    let (router, _) = create_router_for_test();
    let unit_id = create_org_unit(&router, "HR").await;
    let mut employee = employee_body("EMP-040");
    employee["org_unit_id"] = json!(unit_id);
    let (status, _) = send(&router, "POST", "/employees", Some(employee)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&router, "DELETE", &format!("/org-units/{unit_id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_org_unit_and_position_restore() {
    let (router, _) = create_router_for_test();
    let unit_id = create_org_unit(&router, "HR").await;
    let (_, position) = send(
        &router,
        "POST",
        "/positions",
        Some(json!({"code": "HR-AST", "title": "HR Assistant", "org_unit_id": unit_id})),
    )
    .await;
    let position_id = position["id"].as_i64().unwrap();

    send(&router, "DELETE", &format!("/positions/{position_id}"), None).await;
    send(&router, "DELETE", &format!("/org-units/{unit_id}"), None).await;

    // The position's unit is still deleted.
    let (status, _) = send(
        &router,
        "POST",
        &format!("/positions/{position_id}/restore"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&router, "POST", &format!("/org-units/{unit_id}/restore"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_deleted"], false);

    let (status, body) = send(
        &router,
        "POST",
        &format!("/positions/{position_id}/restore"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["org_unit_id"], unit_id);

    let (status, _) = send(&router, "POST", &format!("/org-units/{unit_id}/restore"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_employee_restore_into_deleted_org_unit_conflicts() {
    let (router, _) = create_router_for_test();
    let unit_id = create_org_unit(&router, "FIN").await;
    let mut employee = employee_body("EMP-041");
    employee["org_unit_id"] = json!(unit_id);
    let (_, created) = send(&router, "POST", "/employees", Some(employee)).await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(&router, "POST", &format!("/employees/{id}/restore"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    send(&router, "DELETE", &format!("/employees/{id}"), None).await;
    let (status, _) = send(&router, "DELETE", &format!("/org-units/{unit_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&router, "POST", &format!("/employees/{id}/restore"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&router, "GET", &format!("/employees/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Wage rates
// =============================================================================

fn wage_body(rate: &str, effective_date: chrono::NaiveDate) -> Value {
    json!({
        "region_code": "130000000",
        "region_name": "National Capital Region",
        "daily_rate": rate,
        "wage_order": "NCR-25",
        "effective_date": effective_date
    })
}

#[tokio::test]
async fn test_wage_rate_statuses() {
    let (router, _) = create_router_for_test();
    let today = Utc::now().date_naive();

    let (status, old) = send(
        &router,
        "POST",
        "/wage-rates",
        Some(wage_body("610.00", today - Duration::days(400))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {old}");

    let (_, current) = send(
        &router,
        "POST",
        "/wage-rates",
        Some(wage_body("645.00", today - Duration::days(30))),
    )
    .await;
    let (_, upcoming) = send(
        &router,
        "POST",
        "/wage-rates",
        Some(wage_body("695.00", today + Duration::days(60))),
    )
    .await;

    assert_eq!(current["status"], "current");
    assert_eq!(current["is_current"], true);
    assert_eq!(upcoming["status"], "upcoming");

    let (_, old) = send(&router, "GET", &format!("/wage-rates/{}", old["id"]), None).await;
    assert_eq!(old["status"], "historical");
    assert_eq!(old["is_current"], false);

    let (status, rates) = send(&router, "GET", "/wage-rates/current", None).await;
    assert_eq!(status, StatusCode::OK);
    let rates = rates.as_array().unwrap();
    assert_eq!(rates.len(), 1);
    assert_eq!(decimal(&rates[0]["daily_rate"]), Decimal::new(645, 0));
}

#[tokio::test]
async fn test_wage_rate_lookup_by_date() {
    let (router, _) = create_router_for_test();
    let today = Utc::now().date_naive();
    let older = today - Duration::days(400);
    send(&router, "POST", "/wage-rates", Some(wage_body("610.00", older))).await;
    send(
        &router,
        "POST",
        "/wage-rates",
        Some(wage_body("645.00", today - Duration::days(30))),
    )
    .await;

    let uri = format!(
        "/wage-rates/lookup?region_code=130000000&date={}",
        older + Duration::days(1)
    );
    let (status, body) = send(&router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body["daily_rate"]), Decimal::new(610, 0));

    let uri = format!(
        "/wage-rates/lookup?region_code=130000000&date={}",
        older - Duration::days(1)
    );
    let (status, _) = send(&router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_current_rate_promotes_previous() {
    let (router, _) = create_router_for_test();
    let today = Utc::now().date_naive();
    let (_, older) = send(
        &router,
        "POST",
        "/wage-rates",
        Some(wage_body("610.00", today - Duration::days(400))),
    )
    .await;
    let (_, newer) = send(
        &router,
        "POST",
        "/wage-rates",
        Some(wage_body("645.00", today - Duration::days(30))),
    )
    .await;

    let (status, _) = send(&router, "DELETE", &format!("/wage-rates/{}", newer["id"]), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, older) = send(&router, "GET", &format!("/wage-rates/{}", older["id"]), None).await;
    assert_eq!(older["is_current"], true);

    let (status, restored) = send(
        &router,
        "POST",
        &format!("/wage-rates/{}/restore", newer["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restored["is_current"], true);
}

#[tokio::test]
async fn test_activate_endpoint_reports_date() {
    let (router, _) = create_router_for_test();
    let (status, body) = send(&router, "POST", "/wage-rates/activate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["date"].is_string());
    assert!(body["activated"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_wage_compliance_reports_shortfall() {
    let (router, _) = create_router_for_test();
    let today = Utc::now().date_naive();
    send(
        &router,
        "POST",
        "/wage-rates",
        Some(wage_body("645.00", today - Duration::days(30))),
    )
    .await;
    let id = create_employee(&router, "EMP-010").await;

    let (status, body) = send(
        &router,
        "GET",
        &format!("/employees/{id}/wage-compliance"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    assert_eq!(body["compliant"], false);
    assert_eq!(decimal(&body["shortfall"]), Decimal::new(45, 0));
}

// =============================================================================
// Attendance
// =============================================================================

#[tokio::test]
async fn test_face_clock_flow() {
    let (router, _) = create_router_for_test();
    let id = create_employee(&router, "EMP-020").await;

    // Clocking before enrollment.
    let clock = json!({"employee_id": id, "descriptor": [0.1, 0.2, 0.3, 0.4]});
    let (status, body) = send(&router, "POST", "/attendance/clock", Some(clock.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "FACE_NOT_ENROLLED");

    let (status, _) = send(
        &router,
        "POST",
        &format!("/employees/{id}/face"),
        Some(json!({"descriptor": [0.1, 0.2, 0.3, 0.4]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&router, "POST", "/attendance/clock", Some(clock.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
    assert_eq!(body["action"], "time_in");
    assert_eq!(body["attendance"]["method"], "face");

    // Second clock straight away is inside the minimum interval.
    let (status, body) = send(&router, "POST", "/attendance/clock", Some(clock)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CLOCK_TOO_SOON");

    let stranger = json!({"employee_id": id, "descriptor": [0.9, -0.8, 0.7, -0.6]});
    let (status, body) = send(&router, "POST", "/attendance/clock", Some(stranger)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "FACE_MISMATCH");
}

#[tokio::test]
async fn test_wrong_descriptor_length_rejected() {
    let (router, _) = create_router_for_test();
    let id = create_employee(&router, "EMP-021").await;

    let (status, body) = send(
        &router,
        "POST",
        &format!("/employees/{id}/face"),
        Some(json!({"descriptor": [0.1, 0.2]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_manual_attendance_and_listing() {
    let (router, _) = create_router_for_test();
    let id = create_employee(&router, "EMP-030").await;

    let (status, body) = send(
        &router,
        "POST",
        "/attendance",
        Some(json!({
            "employee_id": id,
            "time_in": "2024-03-04T08:00:00",
            "time_out": "2024-03-04T17:30:00",
            "remarks": "Forgot to clock"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
    assert_eq!(body["method"], "manual");
    assert_eq!(decimal(&body["worked_hours"]), Decimal::new(950, 2));
    let attendance_id = body["id"].as_i64().unwrap();

    let (status, rows) = send(&router, "GET", &format!("/attendance?employee_id={id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 1);

    let (status, _) = send(&router, "DELETE", &format!("/attendance/{attendance_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, rows) = send(&router, "GET", &format!("/attendance?employee_id={id}"), None).await;
    assert!(rows.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_manual_attendance_rejects_reversed_times() {
    let (router, _) = create_router_for_test();
    let id = create_employee(&router, "EMP-031").await;

    let (status, body) = send(
        &router,
        "POST",
        "/attendance",
        Some(json!({
            "employee_id": id,
            "time_in": "2024-03-04T17:00:00",
            "time_out": "2024-03-04T08:00:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "time_out");
}

// =============================================================================
// PSGC
// =============================================================================

#[tokio::test]
async fn test_psgc_regions_miss_then_hit() {
    let (router, source) = create_router_for_test();

    let (status, headers, body) = send_with_headers(&router, "GET", "/psgc/regions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-cache"], "miss");
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, headers, _) = send_with_headers(&router, "GET", "/psgc/regions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-cache"], "hit");
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_psgc_repairs_double_encoded_names() {
    let (router, _) = create_router_for_test();
    let (status, body) = send(
        &router,
        "GET",
        "/psgc/cities-municipalities/137404000/barangays",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Santo Niño");
}

#[tokio::test]
async fn test_psgc_rejects_malformed_code() {
    let (router, source) = create_router_for_test();
    let (status, body) = send(&router, "GET", "/psgc/regions/04/provinces", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_psgc_resolve_region_by_alias() {
    let (router, _) = create_router_for_test();
    let (status, body) = send(&router, "GET", "/psgc/regions/resolve?name=Region%204-A", None).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    assert_eq!(body["code"], "040000000");

    let (status, _) = send(&router, "GET", "/psgc/regions/resolve?name=Atlantis", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_psgc_clear_cache_forces_refetch() {
    let (router, source) = create_router_for_test();
    send(&router, "GET", "/psgc/regions", None).await;
    send(&router, "GET", "/psgc/regions/040000000/provinces", None).await;

    let (status, body) = send(&router, "DELETE", "/psgc/cache?prefix=regions/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);

    let (_, headers, _) = send_with_headers(&router, "GET", "/psgc/regions", None).await;
    assert_eq!(headers["x-cache"], "hit");
    let (_, headers, _) =
        send_with_headers(&router, "GET", "/psgc/regions/040000000/provinces", None).await;
    assert_eq!(headers["x-cache"], "miss");
    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
}
