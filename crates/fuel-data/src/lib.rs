//! Data layer for fuel insights.
//!
//! Responsible for reading the fill-up CSV into a date-ordered
//! [`FillupLog`](fuel_core::models::FillupLog), bucketing it into period
//! insights and running the analysis pipeline consumed by presentation
//! layers.

pub mod aggregator;
pub mod analysis;
pub mod reader;

pub use fuel_core as core;
