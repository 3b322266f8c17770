//! Per-invocation request identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier stamped on every CLI output envelope:
/// `pm-<UTC yyyymmdd>-<hhmmss>-<4 hex>`, e.g. `pm-20260115-143022-a7f0`.
///
/// Distinct from the caller's request `id`, which is echoed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new() -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        RequestId(format!(
            "pm-{}-{}",
            chrono::Utc::now().format("%Y%m%d-%H%M%S"),
            &suffix[..4]
        ))
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
