//! Citizen-facing land-registry portal: application workflow engine, provider
//! boundaries, and the HTTP surface that exposes them.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
