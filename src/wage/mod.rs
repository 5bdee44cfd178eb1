//! Regional minimum wage logic.
//!
//! This module keeps the per-region "current rate" flag consistent with
//! effective dates (on every mutation and once a day), answers "which rate
//! applies on this date" lookups, and checks employees against the minimum
//! of their region.

mod activation;
mod compliance;
mod rates;

pub use activation::{
    ActivatedRate, ActivationOutcome, activate_all, activate_region, run_daily_activation,
};
pub use compliance::{WageCompliance, check_compliance, compare_to_minimum};
pub use rates::{
    create_rate, current_rates, delete_rate, rate_for_region_on, restore_rate, update_rate,
};
