//! Core types and calculations for fuel fill-up insights.
//!
//! Everything here is a pure function over immutable values; reading the
//! CSV source and bucketing records lives in `fuel-data`.

pub mod calculations;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
