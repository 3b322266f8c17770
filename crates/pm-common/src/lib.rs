//! Process mining common types, IDs, and errors.
//!
//! This crate provides foundational types shared across pm-core modules:
//! - Event log data model (events, cases, variants)
//! - Timezone-naive timestamp handling
//! - Request identifiers
//! - Common error types
//! - Output format selection

pub mod error;
pub mod event_log;
pub mod id;
pub mod output;
pub mod schema;
pub mod timestamp;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use event_log::{Case, Event, EventLog};
pub use id::RequestId;
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;
