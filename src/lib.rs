//! Funnel, intent and cancellation-SLA report over event, message and
//! order CSV exports.

pub mod charts;
pub mod config;
pub mod error;
pub mod funnel;
pub mod intents;
pub mod loader;
pub mod models;
pub mod report;
pub mod sla;
pub mod stats;
