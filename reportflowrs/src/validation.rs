use std::collections::HashSet;

use crate::config::ValidationConfig;
use crate::error::{Result, ReportflowError};
use crate::models::Report;
use crate::query_builder::strip_terminator;
use crate::registry::ReportRegistry;

/// Static checks on report definitions. Nothing here parses SQL: the
/// single-statement check only looks for a `;` left after the trailing
/// terminator is stripped, so a semicolon inside a string literal is
/// reported too.
pub struct Validator {
    warn_only: bool,
}

impl Validator {
    pub fn new(warn_only: bool) -> Self {
        Self { warn_only }
    }

    pub fn from_config(config: &ValidationConfig) -> Self {
        Self::new(config.warn_only)
    }

    pub fn validate_registry(&self, registry: &ReportRegistry) -> Result<()> {
        let mut names: Vec<_> = registry.reports.keys().collect();
        names.sort();
        for name in names {
            if let Some(report) = registry.get_report(name) {
                self.validate_report(report)?;
            }
        }
        Ok(())
    }

    pub fn validate_report(&self, report: &Report) -> Result<()> {
        let query = strip_terminator(&report.base_query).trim();
        self.check(!query.is_empty(), || {
            format!("report {} has an empty base query", report.name)
        })?;
        self.check(!query.contains(';'), || {
            format!(
                "report {} base query must be a single statement",
                report.name
            )
        })?;

        let mut seen = HashSet::new();
        for column in &report.columns {
            self.check(!column.name.trim().is_empty(), || {
                format!("report {} has a column without a name", report.name)
            })?;
            self.check(seen.insert(column.name.as_str()), || {
                format!(
                    "report {} declares column {} more than once",
                    report.name, column.name
                )
            })?;
        }
        Ok(())
    }

    fn check(&self, ok: bool, message: impl FnOnce() -> String) -> Result<()> {
        if ok {
            return Ok(());
        }
        let message = message();
        if self.warn_only {
            tracing::warn!(%message, "report validation warning");
            Ok(())
        } else {
            Err(ReportflowError::Validation(message))
        }
    }
}
