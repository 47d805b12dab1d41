//! Allocator descriptors
//!
//! How an allocator under test was injected into the benchmark run. Results
//! only carry these around; unknown fields from newer runners are kept.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Injection settings of one allocator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocatorDescriptor {
    /// Shared library placed in `LD_PRELOAD`
    #[serde(default, alias = "LD_PRELOAD")]
    pub preload_path: String,

    /// Command prepended to the benchmark command line
    #[serde(default, alias = "cmd_prefix")]
    pub command_prefix: String,

    /// Suffix appended to the benchmark binary name
    #[serde(default)]
    pub binary_suffix: String,

    /// Plot color, e.g. `C3` or `#1f77b4`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Fields this version does not interpret
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl AllocatorDescriptor {
    /// Descriptor for an allocator injected through `LD_PRELOAD`
    pub fn preload(path: impl Into<String>) -> Self {
        Self {
            preload_path: path.into(),
            ..Self::default()
        }
    }

    /// Set the plot color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}
