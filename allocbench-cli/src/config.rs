//! Configuration loading from allocbench.toml
//!
//! allocbench configuration can be specified in an `allocbench.toml` file in
//! the results root. The configuration is automatically discovered by walking
//! up from the current directory. Command line flags override it.

use allocbench_core::OutlierMethod;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file
pub const CONFIG_FILE: &str = "allocbench.toml";

/// allocbench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AllocbenchConfig {
    /// Statistics configuration
    #[serde(default)]
    pub statistics: StatisticsConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
    /// Default merge filters
    #[serde(default)]
    pub merge: MergeConfig,
}

/// Statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsConfig {
    /// Whisker distance from the quartiles in multiples of the IQR
    #[serde(default = "default_whisker_multiplier")]
    pub whisker_multiplier: f64,
    /// Number of bootstrap iterations for allocator comparison
    #[serde(default = "default_bootstrap_iterations")]
    pub bootstrap_iterations: usize,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            whisker_multiplier: default_whisker_multiplier(),
            bootstrap_iterations: default_bootstrap_iterations(),
        }
    }
}

impl StatisticsConfig {
    /// Outlier rule for the statistics pass
    pub fn outlier_method(&self) -> OutlierMethod {
        OutlierMethod::Iqr {
            k: self.whisker_multiplier,
        }
    }
}

fn default_whisker_multiplier() -> f64 {
    allocbench_stats::DEFAULT_WHISKER_MULTIPLIER
}
fn default_bootstrap_iterations() -> usize {
    10_000
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human", "json", "csv", "dataref"
    #[serde(default = "default_format")]
    pub format: String,
    /// Directory for exported files
    #[serde(default = "default_output_dir")]
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            directory: default_output_dir(),
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}
fn default_output_dir() -> String {
    "summary".to_string()
}

/// Default benchmark filters of `allocbench merge`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MergeConfig {
    /// Only merge these benchmarks (empty = all)
    #[serde(default)]
    pub benchmarks: Vec<String>,
    /// Never merge these benchmarks
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl AllocbenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let dir = std::env::current_dir().ok()?;
        Self::discover_from(&dir)
    }

    /// Walk up from `start` looking for the configuration file
    pub fn discover_from(start: &Path) -> Option<Self> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# allocbench configuration

[statistics]
# Whiskers lie this many IQRs beyond the quartiles; runs outside are outliers
whisker_multiplier = 1.0
# Bootstrap iterations for allocator comparison
bootstrap_iterations = 10000

[output]
# Default output format: human, json, csv, dataref
format = "human"
# Directory for exported csv/dataref/json files
directory = "summary"

[merge]
# Only merge these benchmarks (empty = all)
benchmarks = []
# Never merge these benchmarks
exclude = []
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AllocbenchConfig::default();
        assert_eq!(config.statistics.whisker_multiplier, 1.0);
        assert_eq!(config.output.format, "human");
        assert!(config.merge.benchmarks.is_empty());
        assert_eq!(
            config.statistics.outlier_method(),
            OutlierMethod::Iqr { k: 1.0 }
        );
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [statistics]
            whisker_multiplier = 1.5

            [merge]
            exclude = ["mysql"]
        "#;

        let config: AllocbenchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.statistics.whisker_multiplier, 1.5);
        assert_eq!(config.merge.exclude, vec!["mysql"]);
        // Defaults should still apply
        assert_eq!(config.statistics.bootstrap_iterations, 10_000);
        assert_eq!(config.output.directory, "summary");
    }

    #[test]
    fn test_default_toml_parses() {
        let config: AllocbenchConfig =
            toml::from_str(&AllocbenchConfig::default_toml()).unwrap();
        assert_eq!(config.statistics.whisker_multiplier, 1.0);
        assert_eq!(config.output.format, "human");
    }

    #[test]
    fn test_discover_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[output]\nformat = \"csv\"\n",
        )
        .unwrap();
        let nested = dir.path().join("results").join("2024-05-01");
        std::fs::create_dir_all(&nested).unwrap();

        let config = AllocbenchConfig::discover_from(&nested).unwrap();
        assert_eq!(config.output.format, "csv");
    }
}
