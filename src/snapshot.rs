//! Snapshot document.
//!
//! One snapshot is one json object stored as `<name>.json`. The name is the
//! storage key and is not repeated inside the document. Anything that was not
//! available at capture time is `null`, never an empty string.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Environment variables recorded by every capture.
pub const TRACKED_VARS: [&str; 4] = ["PATH", "DEBUG", "API_KEY", "SECRET_KEY"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub created_at: DateTime<Utc>,
    pub python_version: String,
    pub venv_path: Option<String>,
    #[serde(default)]
    pub packages: Vec<String>,
    pub git_branch: Option<String>,
    #[serde(default)]
    pub env_vars: BTreeMap<String, Option<String>>,
    /// Optional data that could not be captured (pip failing, git timing out).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Snapshot {
    /// Variables that were set at capture time, in name order.
    pub fn present_vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.env_vars
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (key.as_str(), v)))
    }

    pub fn present_var_count(&self) -> usize {
        self.present_vars().count()
    }
}
