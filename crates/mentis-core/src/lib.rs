//! mentis-core
//!
//! Pure domain types for the cognitive-report extraction pipeline.
//! No I/O dependency; this is the shared vocabulary of the Mentis system.

pub mod error;
pub mod models;
