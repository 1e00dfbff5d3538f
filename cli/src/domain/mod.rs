//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod artifact;
pub mod config;
pub mod error;
pub mod health;
pub mod packages;
pub mod stage;
pub mod unit;

pub use artifact::{CopyFailure, CopyReport};
pub use error::ProvisionError;
pub use health::{ActivationOutcome, ActivationPolicy, HealthStatus};
pub use stage::Stage;
