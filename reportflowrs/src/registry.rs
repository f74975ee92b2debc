use std::collections::HashMap;
use std::fs;
use std::path::Path;

use glob::glob;

use crate::error::{Result, ReportflowError};
use crate::models::Report;

/// Report definitions keyed by name.
#[derive(Debug, Default, Clone)]
pub struct ReportRegistry {
    pub reports: HashMap<String, Report>,
}

impl ReportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_reports(reports: Vec<Report>) -> Self {
        let mut registry = ReportRegistry::new();
        for report in reports {
            registry.insert(report);
        }
        registry
    }

    /// Load every `*.yml` / `*.yaml` file in `dir`, one report per file.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Err(ReportflowError::Validation(format!(
                "reports directory not found: {}",
                dir.display()
            )));
        }
        let mut registry = ReportRegistry::new();
        for ext in ["yml", "yaml"] {
            for entry in glob(&format!("{}/*.{ext}", dir.display()))
                .map_err(|e| ReportflowError::Other(e.into()))?
                .flatten()
            {
                registry.load_report_file(&entry)?;
            }
        }
        tracing::info!(
            dir = %dir.display(),
            reports = registry.reports.len(),
            "loaded report definitions"
        );
        Ok(registry)
    }

    fn load_report_file(&mut self, path: &Path) -> Result<()> {
        let contents = fs::read_to_string(path)?;
        let report: Report = serde_yaml::from_str(&contents)?;
        tracing::debug!(report = report.name.as_str(), path = %path.display(), "loaded report");
        self.insert(report);
        Ok(())
    }

    pub fn insert(&mut self, report: Report) {
        self.reports.insert(report.name.clone(), report);
    }

    pub fn get_report(&self, name: &str) -> Option<&Report> {
        self.reports.get(name)
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}
