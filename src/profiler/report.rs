//! Immutable profiler snapshots and their JSON export.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed root sections of one thread at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilerReport {
    pub captured_at: DateTime<Utc>,
    pub roots: Vec<ReportSection>,
}

/// One closed section and its nested children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub name: String,
    pub elapsed_nanos: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ReportSection>,
}

impl ReportSection {
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos)
    }

    pub fn elapsed_millis(&self) -> f64 {
        self.elapsed_nanos as f64 / 1_000_000.0
    }

    /// Direct child named `name`.
    pub fn child(&self, name: &str) -> Option<&ReportSection> {
        self.children.iter().find(|c| c.name == name)
    }
}

impl ProfilerReport {
    pub fn new(roots: Vec<ReportSection>) -> Self {
        ProfilerReport {
            captured_at: Utc::now(),
            roots,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Follow `path` from the roots, e.g. `["boot", "start"]`.
    pub fn find(&self, path: &[&str]) -> Option<&ReportSection> {
        let (first, rest) = path.split_first()?;
        let mut current = self.roots.iter().find(|s| s.name == *first)?;
        for name in rest {
            current = current.child(name)?;
        }
        Some(current)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize profiler report")
    }

    /// Write the report to `path` as JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create report directory: {}", parent.display())
                })?;
            }
        }

        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("failed to write profiler report: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, nanos: u64) -> ReportSection {
        ReportSection {
            name: name.into(),
            elapsed_nanos: nanos,
            children: Vec::new(),
        }
    }

    fn sample() -> ProfilerReport {
        let mut boot = leaf("boot", 3_000_000);
        boot.children = vec![leaf("init", 1_000_000), leaf("start", 1_500_000)];
        ProfilerReport::new(vec![boot])
    }

    #[test]
    fn test_find_by_path() {
        let report = sample();
        assert_eq!(report.find(&["boot"]).unwrap().elapsed_millis(), 3.0);
        assert_eq!(
            report.find(&["boot", "start"]).unwrap().elapsed(),
            Duration::from_micros(1_500)
        );
        assert!(report.find(&["boot", "stop"]).is_none());
        assert!(report.find(&[]).is_none());
    }

    #[test]
    fn test_json_export() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("reports").join("boot.json");
        let report = sample();

        report.write_json(&file).unwrap();
        let contents = std::fs::read_to_string(&file).unwrap();
        assert!(contents.contains("\"captured_at\""));
        assert!(contents.contains("\"elapsed_nanos\": 1500000"));

        let back: ProfilerReport = serde_json::from_str(&contents).unwrap();
        assert_eq!(back, report);
    }
}
