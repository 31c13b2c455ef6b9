//! Shared types for vadrec.
//!
//! This crate defines the option/status data model and the control-plane
//! payload types used by both the service and its clients.

pub mod api;
pub mod types;

pub use types::{VadOptions, VadOptionsPatch, VadStatus, REQUIRED_SAMPLE_RATE};
