//! System and benchmark facts
//!
//! Collects host information for result headers and prints the facts block
//! that precedes exported statistics.
//!
//! Linux-specific data (CPU model, memory) degrades gracefully on other
//! platforms to "Unknown" or 0.

use allocbench_core::{BenchmarkResults, Facts};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Information about the host the results are processed on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system
    pub os: String,
    /// CPU architecture
    pub arch: String,
    /// CPU model name
    pub cpu: String,
    /// Number of logical cores
    pub cpu_cores: u32,
    /// Total memory in GB
    pub memory_gb: f64,
    /// Collection time
    pub timestamp: DateTime<Utc>,
}

impl SystemInfo {
    /// Read the current host
    pub fn collect() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cpu: cpu_model().unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: num_cpus(),
            memory_gb: memory_gb().unwrap_or(0.0),
            timestamp: Utc::now(),
        }
    }

    /// The same information as a facts object
    pub fn to_facts(&self) -> Facts {
        let mut facts = Facts::new();
        facts.insert("os".into(), self.os.clone().into());
        facts.insert("arch".into(), self.arch.clone().into());
        facts.insert("cpu".into(), self.cpu.clone().into());
        facts.insert("cpu_cores".into(), self.cpu_cores.into());
        facts.insert(
            "memory_gb".into(),
            serde_json::Number::from_f64(self.memory_gb)
                .map(serde_json::Value::Number)
                .unwrap_or_default(),
        );
        facts.insert("timestamp".into(), self.timestamp.to_rfc3339().into());
        facts
    }
}

/// CPU model name from /proc/cpuinfo (Linux only)
fn cpu_model() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find(|l| l.starts_with("model name"))
                    .and_then(|l| l.split(':').nth(1))
                    .map(|s| s.trim().to_string())
            })
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

fn num_cpus() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}

/// Total memory in GB from /proc/meminfo (Linux only)
fn memory_gb() -> Option<f64> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/meminfo")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find(|l| l.starts_with("MemTotal"))
                    .and_then(|l| {
                        l.split_whitespace()
                            .nth(1)
                            .and_then(|s| s.parse::<u64>().ok())
                    })
                    .map(|kb| kb as f64 / 1024.0 / 1024.0)
            })
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// What to include in a facts block
#[derive(Debug, Clone, Default)]
pub struct FactsOptions<'a> {
    /// Line prefix, e.g. `%` for TeX or `#` for scripts
    pub comment: &'a str,
    /// Host facts printed before the benchmark facts
    pub common: Option<&'a SystemInfo>,
    /// Also list the allocators of the benchmark
    pub list_allocators: bool,
}

/// Write the facts block of a benchmark
pub fn write_facts<W: Write>(
    out: &mut W,
    results: &BenchmarkResults,
    options: &FactsOptions<'_>,
) -> io::Result<()> {
    let prefix = if options.comment.is_empty() {
        String::new()
    } else {
        format!("{} ", options.comment)
    };

    writeln!(out, "{}{}", prefix, results.name())?;
    writeln!(out)?;

    if let Some(system) = options.common {
        writeln!(out, "{}Common facts:", prefix)?;
        for (fact, value) in &system.to_facts() {
            writeln!(out, "{}  {}: {}", prefix, fact, fact_value(value))?;
        }
        writeln!(out)?;
    }

    writeln!(out, "{}Benchmark facts:", prefix)?;
    for (fact, value) in results.facts() {
        writeln!(out, "{}{}: {}", prefix, fact, fact_value(value))?;
    }
    if options.list_allocators {
        let allocators: Vec<_> = results.allocator_names().collect();
        writeln!(out, "{}allocators: {}", prefix, allocators.join(" "))?;
    }
    writeln!(out)
}

fn fact_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
