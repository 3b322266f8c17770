//! Schema version for every JSON document this workspace emits.

/// Version stamped into CLI output envelopes and discovery responses.
///
/// Bump the minor version for additive changes, the major version when a
/// field changes meaning or disappears.
pub const SCHEMA_VERSION: &str = "1.0.0";
