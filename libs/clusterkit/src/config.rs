//! Per-method invocation options exposed by the directory.
//!
//! Two loading paths: typed construction through the builder methods, or the
//! lenient raw-JSON-section loader [`cluster_config_or_default`] for hosts
//! that hand modules their config as JSON fragments.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Wait budget applied when neither the method nor the config overrides it,
/// in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 1_000;

/// Options for one service method.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MethodOptions {
    /// Collection wait budget override, in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Named merger; blank or absent means "use the built-in shape rule".
    pub merger: Option<String>,
}

/// Cluster-level configuration: a per-method options table plus defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default)]
    pub default_timeout_ms: Option<u64>,
    #[serde(default)]
    pub methods: HashMap<String, MethodOptions>,
}

impl ClusterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_default_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = Some(timeout_ms);
        self
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, method: impl Into<String>, timeout_ms: u64) -> Self {
        self.methods.entry(method.into()).or_default().timeout_ms = Some(timeout_ms);
        self
    }

    #[must_use]
    pub fn with_merger(mut self, method: impl Into<String>, merger: impl Into<String>) -> Self {
        self.methods.entry(method.into()).or_default().merger = Some(merger.into());
        self
    }

    /// Timeout for `method`: method override, then config default, then
    /// [`DEFAULT_TIMEOUT_MS`].
    #[must_use]
    pub fn timeout_ms(&self, method: &str) -> u64 {
        self.methods
            .get(method)
            .and_then(|m| m.timeout_ms)
            .or(self.default_timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    /// Configured merger name for `method`, with blank names treated as
    /// unset.
    #[must_use]
    pub fn merger(&self, method: &str) -> Option<&str> {
        self.methods
            .get(method)
            .and_then(|m| m.merger.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// All `(method, merger)` pairs with a non-blank merger configured.
    pub fn configured_mergers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.methods.iter().filter_map(|(method, opts)| {
            opts.merger
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| (method.as_str(), name))
        })
    }
}

/// Configuration error for the raw-JSON loading path.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid cluster config: {source}")]
    Invalid {
        #[source]
        source: serde_json::Error,
    },
}

/// Lenient loader: a missing section falls back to defaults, a present but
/// invalid one is an error.
///
/// # Errors
/// Returns [`ConfigError::Invalid`] if the section exists but cannot be
/// deserialized.
pub fn cluster_config_or_default(
    section: Option<&serde_json::Value>,
) -> Result<ClusterConfig, ConfigError> {
    let Some(raw) = section else {
        return Ok(ClusterConfig::default());
    };
    serde_json::from_value(raw.clone()).map_err(|source| ConfigError::Invalid { source })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn timeout_falls_back_method_then_default_then_constant() {
        let cfg = ClusterConfig::new()
            .with_default_timeout_ms(250)
            .with_timeout_ms("slow_scan", 5_000);

        assert_eq!(cfg.timeout_ms("slow_scan"), 5_000);
        assert_eq!(cfg.timeout_ms("other"), 250);

        let bare = ClusterConfig::new();
        assert_eq!(bare.timeout_ms("anything"), DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn blank_merger_names_mean_builtin_rule() {
        let cfg = ClusterConfig::new()
            .with_merger("totals", "sum")
            .with_merger("padded", "  sum  ")
            .with_merger("blank", "   ");

        assert_eq!(cfg.merger("totals"), Some("sum"));
        assert_eq!(cfg.merger("padded"), Some("sum"));
        assert_eq!(cfg.merger("blank"), None);
        assert_eq!(cfg.merger("unconfigured"), None);

        let configured: Vec<_> = cfg.configured_mergers().collect();
        assert_eq!(configured.len(), 2, "blank entries are not configured");
    }

    #[test]
    fn loads_from_raw_json_section() {
        let section = serde_json::json!({
            "default_timeout_ms": 300,
            "methods": {
                "find": { "timeout_ms": 800, "merger": "sum" }
            }
        });

        let cfg = cluster_config_or_default(Some(&section)).expect("valid section");
        assert_eq!(cfg.timeout_ms("find"), 800);
        assert_eq!(cfg.timeout_ms("other"), 300);
        assert_eq!(cfg.merger("find"), Some("sum"));
    }

    #[test]
    fn missing_section_falls_back_to_defaults() {
        let cfg = cluster_config_or_default(None).expect("defaults");
        assert_eq!(cfg.timeout_ms("anything"), DEFAULT_TIMEOUT_MS);
        assert!(cfg.methods.is_empty());
    }

    #[test]
    fn invalid_section_is_an_error() {
        let section = serde_json::json!({ "methods": 42 });
        assert!(cluster_config_or_default(Some(&section)).is_err());
    }
}
