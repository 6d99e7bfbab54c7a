//! RentHub: landlords publish rental properties, clients shortlist and request them,
//! and landlords resolve requests with an atomic accept/deny workflow.

pub mod config;
pub mod domain;
pub mod error;
pub mod geocoding;
pub mod router;
pub mod store;
pub mod telemetry;
pub mod workflows;
