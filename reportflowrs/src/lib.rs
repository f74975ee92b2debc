pub mod backends;
pub mod config;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod models;
pub mod probe;
pub mod query_builder;
pub mod registry;
pub mod request;
pub mod runtime;
pub mod validation;

use std::path::Path;

use crate::error::Result;
use crate::registry::ReportRegistry;

/// Load report definitions from disk and validate them with the provided validator.
pub fn load_and_validate<P: AsRef<Path>>(
    report_dir: P,
    validator: &crate::validation::Validator,
) -> Result<ReportRegistry> {
    let registry = ReportRegistry::load_from_dir(report_dir)?;
    validator.validate_registry(&registry)?;
    Ok(registry)
}

pub use crate::validation::Validator;
pub use backends::{BackendConnection, ConnectionManager, RowSet};
pub use config::ReportflowConfig;
pub use dialect::{Dialect, DialectKind};
pub use error::ReportflowError;
pub use executor::ReportExecutor;
pub use models::{ColumnDescriptor, PageRequest, QueryResult, Report, SortDirection};
pub use probe::SchemaProber;
pub use query_builder::{ReportQueries, SqlBuilder};
