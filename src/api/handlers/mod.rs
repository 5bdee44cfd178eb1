//! HTTP request handlers for the HRIS API.
//!
//! Each handler generates a correlation id, unwraps its extractors into
//! JSON errors, runs the domain operation with the database locked (never
//! across an `.await`), and logs the outcome with structured fields.

mod attendance;
mod employees;
mod health;
mod org_units;
mod positions;
mod psgc;
mod wage_rates;

use axum::{
    Router,
    routing::{delete, get, post},
};

use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/employees",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route(
            "/employees/:id",
            get(employees::get_employee)
                .put(employees::update_employee)
                .delete(employees::delete_employee),
        )
        .route("/employees/:id/restore", post(employees::restore_employee))
        .route(
            "/employees/:id/wage-compliance",
            get(employees::wage_compliance),
        )
        .route(
            "/employees/:id/face",
            post(employees::enroll_face).delete(employees::remove_face),
        )
        .route(
            "/org-units",
            get(org_units::list_org_units).post(org_units::create_org_unit),
        )
        .route("/org-units/tree", get(org_units::org_unit_tree))
        .route(
            "/org-units/:id",
            get(org_units::get_org_unit)
                .put(org_units::update_org_unit)
                .delete(org_units::delete_org_unit),
        )
        .route("/org-units/:id/restore", post(org_units::restore_org_unit))
        .route(
            "/positions",
            get(positions::list_positions).post(positions::create_position),
        )
        .route(
            "/positions/:id",
            get(positions::get_position)
                .put(positions::update_position)
                .delete(positions::delete_position),
        )
        .route("/positions/:id/restore", post(positions::restore_position))
        .route(
            "/wage-rates",
            get(wage_rates::list_wage_rates).post(wage_rates::create_wage_rate),
        )
        .route("/wage-rates/current", get(wage_rates::current_wage_rates))
        .route("/wage-rates/lookup", get(wage_rates::lookup_wage_rate))
        .route("/wage-rates/activate", post(wage_rates::activate_wage_rates))
        .route(
            "/wage-rates/:id",
            get(wage_rates::get_wage_rate)
                .put(wage_rates::update_wage_rate)
                .delete(wage_rates::delete_wage_rate),
        )
        .route("/wage-rates/:id/restore", post(wage_rates::restore_wage_rate))
        .route(
            "/attendance",
            get(attendance::list_attendance).post(attendance::create_manual_attendance),
        )
        .route("/attendance/clock", post(attendance::clock))
        .route("/attendance/:id", delete(attendance::delete_attendance))
        .route("/psgc/regions", get(psgc::regions))
        .route("/psgc/regions/resolve", get(psgc::resolve_region))
        .route("/psgc/regions/:code/provinces", get(psgc::provinces_of_region))
        .route(
            "/psgc/regions/:code/cities-municipalities",
            get(psgc::cities_of_region),
        )
        .route(
            "/psgc/provinces/:code/cities-municipalities",
            get(psgc::cities_of_province),
        )
        .route(
            "/psgc/cities-municipalities/:code/barangays",
            get(psgc::barangays_of_city),
        )
        .route("/psgc/cache", delete(psgc::clear_cache))
        .with_state(state)
}
