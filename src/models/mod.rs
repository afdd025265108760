//! Database models and configuration shared across the dispatch service.

#[cfg(feature = "server")]
pub mod config;
pub mod dispatch_plan;
pub mod dispatch_roll;
pub mod storage;
