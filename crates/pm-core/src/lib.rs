//! Process Mining Core Library
//!
//! This library provides the core functionality for process mining requests:
//! - Validation and loading of raw event-log records
//! - Complexity reduction by variant frequency
//! - Event relabeling (occurrence counters, state tags)
//! - The metrics engine and directly-follows graph discovery
//! - Callback delivery, logging, and exit codes
//!
//! The binary entry point is in `main.rs`.

pub mod delivery;
pub mod encode;
pub mod exit_codes;
pub mod graph;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod reduce;
pub mod request;
pub mod schema;
pub mod variants;

// Re-export test utilities for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
