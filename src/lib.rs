//! Human Resources Information System for Philippine employers
//!
//! This crate keeps employee records, the organizational structure and
//! positions, regional minimum-wage orders with their daily activation,
//! face-verified attendance clocking, and a read-through cache over the
//! Philippine Standard Geographic Code (PSGC) API.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod face;
pub mod models;
pub mod psgc;
pub mod repo;
pub mod wage;
